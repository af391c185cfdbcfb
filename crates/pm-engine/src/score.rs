//! Score, level, lives and the ghost-eat combo multiplier.

/// Lives a new game starts with.
pub const INITIAL_LIVES: u8 = 3;

/// Points for a regular pellet.
pub const PELLET_POINTS: u16 = 10;
/// Points for a super pellet.
pub const SUPER_PELLET_POINTS: u16 = 50;

/// Per-ghost combo multiplier base. The Nth ghost eaten in one fright
/// window (N starting at 0) scores `COMBO_BASE << N`.
pub const COMBO_BASE: u16 = 200;

/// Score, level, lives, and the running ghost-eat combo counter. One
/// `RwLock<ScoreBoard>` in `GameState`.
#[derive(Clone, Copy, Debug)]
pub struct ScoreBoard {
    score: u16,
    level: u8,
    lives: u8,
    ghost_combo: u8,
}

impl ScoreBoard {
    /// A fresh scoreboard: zero score, level 1, full lives, no combo.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lives: INITIAL_LIVES,
            ghost_combo: 0,
        }
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u16 {
        self.score
    }

    /// Current level, 1-based.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u8 {
        self.lives
    }

    /// Ghosts eaten so far in the current fright window.
    #[must_use]
    pub const fn ghost_combo(&self) -> u8 {
        self.ghost_combo
    }

    /// Adds points, saturating at `u16::MAX`.
    pub fn add_score(&mut self, points: u16) {
        self.score = self.score.saturating_add(points);
    }

    /// Points the next eaten ghost is worth, given the current combo
    /// count: `200 << ghost_combo` (200, 400, 800, 1600, ...).
    #[must_use]
    pub fn next_combo_points(&self) -> u16 {
        COMBO_BASE.saturating_shl(u32::from(self.ghost_combo))
    }

    /// Increments the combo counter after scoring one ghost.
    pub fn increment_ghost_combo(&mut self) {
        self.ghost_combo = self.ghost_combo.saturating_add(1);
    }

    /// Resets the combo counter: on every fresh fright window and on
    /// level/death reset.
    pub fn reset_ghost_combo(&mut self) {
        self.ghost_combo = 0;
    }

    /// Increments the level, saturating at 255.
    pub fn increment_level(&mut self) {
        self.level = self.level.saturating_add(1);
    }

    /// Decrements lives by one, no-op already at zero.
    pub fn decrement_lives(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}
