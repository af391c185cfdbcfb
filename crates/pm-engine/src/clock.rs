//! The mode/step machine: tick counting, scatter/chase alternation, and
//! the level-penalty timer that gradually speeds the game up.
//!
//! Modeled on `src/worlds/inferno/dragon`'s tick-keyed state machine —
//! state lives in one small struct, transitions are driven from a single
//! `handle_step_events` call per update boundary, and every transition
//! is logged.

use tracing::info;

/// The three states the game clock can be in.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Simulation frozen except for tick counting and command intake.
    Paused = 0,
    /// Ghosts head for their scatter corners.
    Scatter = 1,
    /// Ghosts chase Pacman.
    Chase = 2,
}

impl Mode {
    /// Flips scatter to chase and vice versa. Calling this on `Paused`
    /// is a programming error in this crate — callers always flip
    /// `last_unpaused_mode`, never `Paused` itself.
    #[must_use]
    pub const fn flipped(self) -> Mode {
        match self {
            Mode::Scatter => Mode::Chase,
            Mode::Chase => Mode::Scatter,
            Mode::Paused => Mode::Paused,
        }
    }
}

/// Step-duration (not tick-duration) for each mode.
///
/// `Paused`'s value is a sentinel that's never actually assigned to
/// `mode_steps` in practice (mode flips always resolve to Scatter or
/// Chase); it exists purely so this match stays exhaustive.
#[must_use]
pub const fn mode_duration(mode: Mode) -> u8 {
    match mode {
        Mode::Scatter => SCATTER_DURATION,
        Mode::Chase => CHASE_DURATION,
        Mode::Paused => PAUSED_DURATION_SENTINEL,
    }
}

/// Update boundaries a scatter phase lasts.
pub const SCATTER_DURATION: u8 = 60;
/// Update boundaries a chase phase lasts.
pub const CHASE_DURATION: u8 = 180;
/// Sentinel `mode_duration(Paused)` value; never assigned to `mode_steps`.
pub const PAUSED_DURATION_SENTINEL: u8 = 255;
/// The literal sentinel anger thresholds force `mode_steps` to. Chosen
/// to equal [`PAUSED_DURATION_SENTINEL`] rather than
/// `mode_duration(Chase)` — see DESIGN.md's resolution of the
/// corresponding open question.
pub const ANGER_MODE_STEPS_SENTINEL: u8 = 0xFF;
/// Update boundaries between level-penalty speedups.
pub const LEVEL_PENALTY_DURATION: u16 = 240;
/// `level_steps` a freshly reset level starts with.
pub const INITIAL_LEVEL_STEPS: u16 = 960;
/// `update_period` (ticks per update boundary) a new game starts with.
pub const INITIAL_UPDATE_PERIOD: u8 = 12;
/// Tick count at which the engine force-pauses itself.
pub const MAX_TICKS_PAUSE_THRESHOLD: u16 = 0xFFFE;
/// Tick count beyond which `play()` permanently refuses to resume.
pub const TICKS_HALTED: u16 = 0xFFFF;

/// What happened during a call to [`ClockState::handle_step_events`], so
/// the caller can react (reverse ghosts, log) without this module
/// reaching into ghost state directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepEvents {
    /// The mode flipped (scatter<->chase); every non-trapped ghost must
    /// be forced to reverse.
    pub mode_flipped: bool,
    /// The level-penalty timer elapsed; `update_period` just decreased.
    pub level_penalty: bool,
}

/// Everything the mode/step machine owns: ticks, update period, mode,
/// and the two step counters. Held behind one `RwLock` in `GameState`.
#[derive(Clone, Copy, Debug)]
pub struct ClockState {
    ticks: u16,
    update_period: u8,
    mode: Mode,
    last_unpaused_mode: Mode,
    pause_on_update: bool,
    mode_steps: u8,
    level_steps: u16,
    boundary_counter: u8,
}

impl ClockState {
    /// A freshly constructed game clock: scatter mode, full step budgets.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            update_period: INITIAL_UPDATE_PERIOD,
            mode: Mode::Scatter,
            last_unpaused_mode: Mode::Scatter,
            pause_on_update: false,
            mode_steps: SCATTER_DURATION,
            level_steps: INITIAL_LEVEL_STEPS,
            boundary_counter: 0,
        }
    }

    /// Advances the per-tick phase counter. Returns true exactly once
    /// every `update_period` ticks — the "update boundary" where ghost
    /// AI, collision, and the step counters actually run.
    pub fn tick_toward_boundary(&mut self) -> bool {
        self.boundary_counter += 1;
        if self.boundary_counter >= self.update_period {
            self.boundary_counter = 0;
            true
        } else {
            false
        }
    }

    /// Current tick count.
    #[must_use]
    pub const fn ticks(&self) -> u16 {
        self.ticks
    }

    /// Ticks per update boundary.
    #[must_use]
    pub const fn update_period(&self) -> u8 {
        self.update_period
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The mode play() will restore to.
    #[must_use]
    pub const fn last_unpaused_mode(&self) -> Mode {
        self.last_unpaused_mode
    }

    /// Remaining steps in the current mode.
    #[must_use]
    pub const fn mode_steps(&self) -> u8 {
        self.mode_steps
    }

    /// Remaining steps until the next level-penalty speedup.
    #[must_use]
    pub const fn level_steps(&self) -> u16 {
        self.level_steps
    }

    /// The one-shot flag `movePacman*` consults so a move issued in the
    /// same boundary a death/respawn just happened doesn't sneak through.
    #[must_use]
    pub const fn pause_on_update(&self) -> bool {
        self.pause_on_update
    }

    /// Sets `pause_on_update`. Read once at the top of every update
    /// boundary by the caller, then left for `pause()` to clear.
    pub fn set_pause_on_update(&mut self, value: bool) {
        self.pause_on_update = value;
    }

    /// Advances the tick counter by one, saturating at `TICKS_HALTED`
    /// and force-pausing the instant it reaches `MAX_TICKS_PAUSE_THRESHOLD`.
    pub fn advance_tick(&mut self) {
        if self.ticks == TICKS_HALTED {
            return;
        }
        self.ticks += 1;
        if self.ticks == MAX_TICKS_PAUSE_THRESHOLD {
            info!(ticks = self.ticks, "max tick threshold reached, pausing");
            self.pause();
        }
    }

    /// Unconditionally pauses, remembering the mode to restore later.
    /// A no-op if already paused (two back-to-back calls collapse to one).
    pub fn pause(&mut self) {
        if self.mode != Mode::Paused {
            self.last_unpaused_mode = self.mode;
            self.mode = Mode::Paused;
        }
    }

    /// Restores `last_unpaused_mode`. Refuses (returns `false`, no
    /// state change) if not currently paused, if the clock has halted,
    /// or if `lives_remaining == 0`.
    pub fn play(&mut self, lives_remaining: u8) -> bool {
        if self.mode != Mode::Paused {
            return false;
        }
        if self.ticks == TICKS_HALTED || lives_remaining == 0 {
            return false;
        }
        self.mode = self.last_unpaused_mode;
        true
    }

    /// Forces mode to `Chase` with the maximal step budget, as the
    /// pellet-anger thresholds do. Keeps `last_unpaused_mode` in sync
    /// since this never happens while paused.
    pub fn force_chase_max_steps(&mut self) {
        self.mode = Mode::Chase;
        self.last_unpaused_mode = Mode::Chase;
        self.mode_steps = ANGER_MODE_STEPS_SENTINEL;
    }

    /// Directly sets `update_period`, floored at 1.
    pub fn set_update_period(&mut self, period: u8) {
        self.update_period = period.max(1);
    }

    /// Lowers `update_period` by `delta`, saturating (floored) at 1.
    pub fn decrease_update_period(&mut self, delta: u8) {
        self.update_period = self.update_period.saturating_sub(delta).max(1);
    }

    /// Resets mode/step state the way `levelReset` does: back to the
    /// initial mode with a full step budget.
    pub fn level_reset(&mut self) {
        self.mode = Mode::Scatter;
        self.last_unpaused_mode = Mode::Scatter;
        self.mode_steps = mode_duration(Mode::Scatter);
        self.level_steps = INITIAL_LEVEL_STEPS;
    }

    /// Restores the initial mode and duration without touching
    /// `level_steps`, as `deathReset` does when pellets remain above
    /// the first anger threshold.
    pub fn death_reset_restore_mode(&mut self) {
        self.mode = Mode::Scatter;
        self.last_unpaused_mode = Mode::Scatter;
        self.mode_steps = mode_duration(Mode::Scatter);
    }

    /// Runs the three-step update-boundary algorithm: mode flip, level
    /// penalty, then counter decrements. Returns what happened so the
    /// caller can reverse ghosts / log as needed.
    pub fn handle_step_events(&mut self) -> StepEvents {
        let mut events = StepEvents::default();

        if self.mode_steps == 0 {
            let next = if self.mode == Mode::Paused {
                self.last_unpaused_mode
            } else {
                self.mode.flipped()
            };
            info!(from = ?self.mode, to = ?next, "mode flip");
            if self.mode != Mode::Paused {
                self.mode = next;
            }
            self.last_unpaused_mode = next;
            self.mode_steps = mode_duration(next);
            events.mode_flipped = true;
        }

        if self.level_steps == 0 {
            info!(update_period = self.update_period, "level penalty timeout");
            self.decrease_update_period(2);
            self.level_steps = LEVEL_PENALTY_DURATION;
            events.level_penalty = true;
        }

        self.mode_steps = self.mode_steps.saturating_sub(1);
        self.level_steps = self.level_steps.saturating_sub(1);

        events
    }
}

impl Default for ClockState {
    fn default() -> Self {
        Self::new()
    }
}
