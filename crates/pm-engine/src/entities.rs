//! Agent state: the fruit's visibility window and the four ghosts'
//! per-agent flags. Pacman's own position lives directly under the
//! exclusive lock in `state.rs` since it has no extra fields.

use pm_shared::{Direction, Position};

/// How many update boundaries a fright window lasts.
pub const GHOST_FRIGHT_STEPS: u8 = 40;

/// Update boundaries a fresh fruit stays on the board.
pub const FRUIT_DURATION: u8 = 30;

/// Points a collected fruit is worth.
pub const FRUIT_POINTS: u16 = 100;

/// One of the four ghosts. Order is always red, pink, cyan, orange —
/// matching the wire frame's fixed ghost ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostColor {
    /// Chases Pacman's current cell directly.
    Red,
    /// Ambushes four cells ahead of Pacman's facing.
    Pink,
    /// Reflects red's position through a point ahead of Pacman.
    Cyan,
    /// Chases until within 8 cells, then retreats to its scatter corner.
    Orange,
}

impl GhostColor {
    /// All four colors in wire order.
    pub const ALL: [GhostColor; 4] = [
        GhostColor::Red,
        GhostColor::Pink,
        GhostColor::Cyan,
        GhostColor::Orange,
    ];

    /// The fixed scatter-mode target corner for this color. Pink and
    /// cyan's corners sit one row above the grid on purpose — ghosts
    /// heading there simply pile up against the top wall, as in the
    /// original arcade cabinet.
    #[must_use]
    pub const fn scatter_target(self) -> Position {
        match self {
            GhostColor::Red => Position::new(0, 27, Direction::None),
            GhostColor::Pink => Position::new(0, 0, Direction::None),
            GhostColor::Cyan => Position::new(30, 27, Direction::None),
            GhostColor::Orange => Position::new(30, 0, Direction::None),
        }
    }

    /// Ticks a freshly reset ghost of this color stays trapped (forced
    /// to reverse on its next `plan`), staggering house departure.
    #[must_use]
    pub const fn initial_trapped_steps(self) -> u8 {
        match self {
            GhostColor::Red => 0,
            GhostColor::Pink => 5,
            GhostColor::Cyan => 16,
            GhostColor::Orange => 32,
        }
    }

    /// This color's spawn cell inside the ghost house.
    #[must_use]
    pub const fn spawn(self) -> Position {
        match self {
            GhostColor::Red => Position::new(12, 13, Direction::Left),
            GhostColor::Pink => Position::new(14, 13, Direction::Down),
            GhostColor::Cyan => Position::new(14, 12, Direction::Up),
            GhostColor::Orange => Position::new(14, 15, Direction::Up),
        }
    }
}

/// One ghost's full mutable state.
#[derive(Clone, Copy, Debug)]
pub struct Ghost {
    /// Which ghost this is.
    pub color: GhostColor,
    /// Current cell, applied at the start of an update boundary.
    pub loc: Position,
    /// Cell `plan()` has already committed to for the next update.
    pub next_loc: Position,
    /// Ticks left forcing a direction reversal on the next `plan()`.
    pub trapped_steps: u8,
    /// Ticks left in the current fright window. Zero means not frightened.
    pub fright_steps: u8,
    /// True while still inside (or returning to) the ghost house.
    pub spawning: bool,
    /// True from the tick Pacman eats it until it reaches the house.
    pub eaten: bool,
}

impl Ghost {
    /// A freshly reset ghost of the given color, as placed by
    /// `levelReset`/`deathReset`.
    #[must_use]
    pub fn reset(color: GhostColor) -> Self {
        let spawn = color.spawn();
        Self {
            color,
            loc: spawn,
            next_loc: spawn,
            trapped_steps: color.initial_trapped_steps(),
            fright_steps: 0,
            spawning: true,
            eaten: false,
        }
    }
}

/// The fruit bonus item: visible only while `steps_remaining > 0`.
#[derive(Clone, Copy, Debug)]
pub struct FruitState {
    /// Current cell. Meaningless while not visible.
    pub loc: Position,
    /// Update boundaries left before the fruit disappears.
    pub steps_remaining: u8,
}

impl FruitState {
    /// Spawn cell fruit appears at whenever it's spawned.
    pub const SPAWN: Position = Position::new(17, 13, Direction::None);

    /// A fresh, not-yet-spawned fruit.
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            loc: Self::SPAWN,
            steps_remaining: 0,
        }
    }

    /// True while the fruit is on the board and collectible.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.steps_remaining > 0
    }

    /// Spawns a fresh fruit at its fixed cell with a full visibility window.
    pub fn spawn(&mut self) {
        self.loc = Self::SPAWN;
        self.steps_remaining = FRUIT_DURATION;
    }

    /// Decrements the visibility window, saturating at zero.
    pub fn decrement(&mut self) {
        self.steps_remaining = self.steps_remaining.saturating_sub(1);
    }

    /// Hides the fruit immediately, as collection and level/death reset do.
    pub fn hide(&mut self) {
        self.steps_remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_reset_starts_spawning_and_not_eaten() {
        for color in GhostColor::ALL {
            let g = Ghost::reset(color);
            assert!(g.spawning);
            assert!(!g.eaten);
            assert_eq!(g.fright_steps, 0);
            assert_eq!(g.trapped_steps, color.initial_trapped_steps());
        }
    }

    #[test]
    fn fruit_starts_hidden() {
        let f = FruitState::hidden();
        assert!(!f.is_visible());
    }

    #[test]
    fn fruit_spawn_resets_visibility_window() {
        let mut f = FruitState::hidden();
        f.spawn();
        assert!(f.is_visible());
        assert_eq!(f.steps_remaining, FRUIT_DURATION);
        assert_eq!(f.loc, FruitState::SPAWN);
    }

    #[test]
    fn fruit_decrement_saturates_at_zero() {
        let mut f = FruitState::hidden();
        f.decrement();
        assert_eq!(f.steps_remaining, 0);
    }
}
