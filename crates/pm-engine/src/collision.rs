//! Collision detection, pellet/fruit collection, scoring thresholds,
//! and the death/level reset paths they trigger.
//!
//! These are free functions over already-locked pieces of the game
//! state rather than methods on one big struct, so `state.rs` controls
//! lock acquisition order and these stay unit-testable in isolation.

use pm_shared::{Direction, Position, EMPTY_COORD};

use crate::clock::{ClockState, INITIAL_UPDATE_PERIOD};
use crate::entities::{FruitState, Ghost, FRUIT_POINTS};
use crate::ghost;
use crate::maze;
use crate::pellets::{self, PelletGrid};
use crate::score::{self, ScoreBoard};

fn coord_present(v: i8) -> bool {
    v < EMPTY_COORD
}

/// Two positions collide iff neither carries an absent (>= 32) coordinate
/// and their row/col match.
fn collides(a: Position, b: Position) -> bool {
    coord_present(a.row)
        && coord_present(a.col)
        && coord_present(b.row)
        && coord_present(b.col)
        && a.row == b.row
        && a.col == b.col
}

/// Runs fruit collection, then pellet collection, at Pacman's current
/// cell. Applies the super-pellet fright trigger and the fruit-spawn,
/// anger, and level-clear thresholds along the way.
#[allow(clippy::too_many_arguments)]
pub fn collect_at(
    pacman: &mut Position,
    pellets: &mut PelletGrid,
    fruit: &mut FruitState,
    scoreboard: &mut ScoreBoard,
    ghosts: &mut [Ghost; 4],
    clock: &mut ClockState,
    active: usize,
) {
    let pos = *pacman;

    if fruit.is_visible() && collides(pos, fruit.loc) {
        fruit.hide();
        scoreboard.add_score(FRUIT_POINTS);
    }

    if !pellets.collect(pos.row, pos.col) {
        return;
    }

    if maze::is_super_pellet(pos.row, pos.col) {
        for g in ghosts.iter_mut() {
            ghost::frighten(g);
        }
        scoreboard.reset_ghost_combo();
        scoreboard.add_score(score::SUPER_PELLET_POINTS);
    } else {
        scoreboard.add_score(score::PELLET_POINTS);
    }

    let remaining = pellets.remaining();

    if remaining == pellets::FRUIT_THRESHOLD_1 || remaining == pellets::FRUIT_THRESHOLD_2 {
        fruit.spawn();
    }

    if remaining == pellets::ANGER_THRESHOLD_1 || remaining == pellets::ANGER_THRESHOLD_2 {
        clock.decrease_update_period(2);
        clock.force_chase_max_steps();
    }

    if remaining == 0 {
        level_reset(pacman, ghosts, pellets, fruit, clock, active);
        scoreboard.increment_level();
        let penalty = u32::from(scoreboard.level()) * 2;
        let period = u32::from(INITIAL_UPDATE_PERIOD).saturating_sub(penalty);
        clock.set_update_period(u8::try_from(period).unwrap_or(0));
    }
}

/// Sweeps the `active` ghosts for collisions with Pacman; ghosts beyond
/// that count are parked and invisible, so they never collide. Eaten
/// ghosts are skipped; frightened ones are flagged for respawn and
/// scored after the sweep; the first non-frightened collision triggers
/// an immediate death reset and short-circuits the rest of the sweep.
/// Returns true if Pacman died.
#[allow(clippy::too_many_arguments)]
pub fn check_ghost_collisions(
    pacman: &mut Position,
    ghosts: &mut [Ghost; 4],
    scoreboard: &mut ScoreBoard,
    pellets: &PelletGrid,
    fruit: &mut FruitState,
    clock: &mut ClockState,
    active: usize,
) -> bool {
    let mut flagged = [false; 4];
    for (i, g) in ghosts.iter().enumerate().take(active) {
        if !collides(*pacman, g.loc) || g.eaten {
            continue;
        }
        if g.fright_steps > 0 {
            flagged[i] = true;
        } else {
            death_reset(pacman, ghosts, scoreboard, pellets, fruit, clock, active);
            return true;
        }
    }

    for (i, flag) in flagged.iter().enumerate().take(active) {
        if *flag {
            let points = scoreboard.next_combo_points();
            ghost::respawn(&mut ghosts[i]);
            scoreboard.add_score(points);
            scoreboard.increment_ghost_combo();
        }
    }
    false
}

/// Pacman's death: lives lost, sent to the empty sentinel, the `active`
/// ghosts reset, fruit hidden, and — only if enough pellets remain —
/// mode restored to its initial value. Freezes ghost facing if that was
/// the last life.
#[allow(clippy::too_many_arguments)]
fn death_reset(
    pacman: &mut Position,
    ghosts: &mut [Ghost; 4],
    scoreboard: &mut ScoreBoard,
    pellets: &PelletGrid,
    fruit: &mut FruitState,
    clock: &mut ClockState,
    active: usize,
) {
    clock.set_pause_on_update(true);
    *pacman = Position::EMPTY;
    scoreboard.decrement_lives();

    if pellets.remaining() > pellets::ANGER_THRESHOLD_1 {
        clock.death_reset_restore_mode();
    }

    fruit.hide();
    for g in ghosts.iter_mut().take(active) {
        *g = Ghost::reset(g.color);
    }

    if scoreboard.lives() == 0 {
        freeze_ghost_directions(&mut ghosts[..active]);
    }
}

/// Freezes ghost facing once the game is over: red/pink/cyan stare
/// forward (`None`), orange looks left, as if making eye contact.
fn freeze_ghost_directions(ghosts: &mut [Ghost]) {
    let dirs = [
        Direction::None,
        Direction::None,
        Direction::None,
        Direction::Left,
    ];
    for (ghost, dir) in ghosts.iter_mut().zip(dirs) {
        ghost.loc.dir = dir;
        ghost.next_loc.dir = dir;
    }
}

/// A full level clear: pellets refilled, Pacman and the `active` ghosts
/// reset to their spawn cells, mode and timers restored to their
/// level-start values, fruit hidden.
fn level_reset(
    pacman: &mut Position,
    ghosts: &mut [Ghost; 4],
    pellets: &mut PelletGrid,
    fruit: &mut FruitState,
    clock: &mut ClockState,
    active: usize,
) {
    clock.set_pause_on_update(true);
    *pacman = Position::EMPTY;
    clock.level_reset();
    fruit.hide();
    for g in ghosts.iter_mut().take(active) {
        *g = Ghost::reset(g.color);
    }
    pellets.reset();
}

/// Respawns Pacman at the fixed spawn cell once it's empty and lives
/// remain, clearing the movement block `death_reset`/`level_reset` set.
pub fn try_respawn_pacman(pacman: &mut Position, scoreboard: &ScoreBoard, clock: &mut ClockState) {
    if pacman.is_empty() && scoreboard.lives() > 0 {
        *pacman = Position::new(23, 13, Direction::Right);
        clock.set_pause_on_update(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GhostColor;

    fn fresh_ghosts() -> [Ghost; 4] {
        [
            Ghost::reset(GhostColor::Red),
            Ghost::reset(GhostColor::Pink),
            Ghost::reset(GhostColor::Cyan),
            Ghost::reset(GhostColor::Orange),
        ]
    }

    #[test]
    fn collecting_a_pellet_adds_ten_points() {
        let mut pacman = Position::new(1, 1, Direction::Right);
        let mut pellets = PelletGrid::new();
        let mut fruit = FruitState::hidden();
        let mut scoreboard = ScoreBoard::new();
        let mut ghosts = fresh_ghosts();
        let mut clock = ClockState::new();

        collect_at(&mut pacman, &mut pellets, &mut fruit, &mut scoreboard, &mut ghosts, &mut clock, 4);
        assert_eq!(scoreboard.score(), score::PELLET_POINTS);
    }

    #[test]
    fn super_pellet_frightens_every_ghost_and_resets_combo() {
        let mut pacman = Position::new(3, 1, Direction::Right);
        let mut pellets = PelletGrid::new();
        let mut fruit = FruitState::hidden();
        let mut scoreboard = ScoreBoard::new();
        scoreboard.increment_ghost_combo();
        let mut ghosts = fresh_ghosts();
        let mut clock = ClockState::new();

        collect_at(&mut pacman, &mut pellets, &mut fruit, &mut scoreboard, &mut ghosts, &mut clock, 4);

        assert_eq!(scoreboard.score(), score::SUPER_PELLET_POINTS);
        assert_eq!(scoreboard.ghost_combo(), 0);
        for g in &ghosts {
            assert_eq!(g.fright_steps, crate::entities::GHOST_FRIGHT_STEPS);
            assert_eq!(g.trapped_steps, 1);
        }
    }

    #[test]
    fn death_reset_preserves_pellets_and_moves_pacman_to_empty() {
        let mut pacman = Position::new(10, 10, Direction::Right);
        let mut ghosts = fresh_ghosts();
        ghosts[0].loc = pacman;
        ghosts[0].fright_steps = 0;
        let mut scoreboard = ScoreBoard::new();
        let pellets = PelletGrid::new();
        let mut fruit = FruitState::hidden();
        let mut clock = ClockState::new();
        let before = pellets.remaining();

        let died = check_ghost_collisions(&mut pacman, &mut ghosts, &mut scoreboard, &pellets, &mut fruit, &mut clock, 4);

        assert!(died);
        assert!(pacman.is_empty());
        assert_eq!(scoreboard.lives(), crate::score::INITIAL_LIVES - 1);
        assert_eq!(pellets.remaining(), before);
    }

    #[test]
    fn eating_two_frightened_ghosts_doubles_the_combo() {
        let mut pacman = Position::new(10, 10, Direction::Right);
        let mut ghosts = fresh_ghosts();
        ghosts[0].loc = pacman;
        ghosts[0].fright_steps = 10;
        ghosts[1].loc = pacman;
        ghosts[1].fright_steps = 10;
        let mut scoreboard = ScoreBoard::new();
        let pellets = PelletGrid::new();
        let mut fruit = FruitState::hidden();
        let mut clock = ClockState::new();

        let died = check_ghost_collisions(&mut pacman, &mut ghosts, &mut scoreboard, &pellets, &mut fruit, &mut clock, 4);

        assert!(!died);
        assert_eq!(scoreboard.score(), 200 + 400);
        assert_eq!(scoreboard.ghost_combo(), 2);
        assert!(ghosts[0].eaten);
        assert!(ghosts[0].spawning);
    }

    #[test]
    fn clearing_the_last_pellet_advances_the_level_and_shortens_the_update_period() {
        let mut pacman = Position::new(1, 1, Direction::Right);
        let mut pellets = PelletGrid::new();
        let mut fruit = FruitState::hidden();
        let mut scoreboard = ScoreBoard::new();
        let mut ghosts = fresh_ghosts();
        let mut clock = ClockState::new();

        for row in 0..crate::maze::ROWS {
            for col in 0..crate::maze::COLS {
                if (row as i8, col as i8) != (pacman.row, pacman.col) {
                    pellets.collect(row as i8, col as i8);
                }
            }
        }
        assert_eq!(pellets.remaining(), 1);

        collect_at(&mut pacman, &mut pellets, &mut fruit, &mut scoreboard, &mut ghosts, &mut clock, 4);

        assert_eq!(scoreboard.level(), 2);
        assert_eq!(pellets.remaining(), crate::maze::INITIAL_PELLET_COUNT);
        let expected = (u32::from(INITIAL_UPDATE_PERIOD).saturating_sub(2 * 2)).max(1);
        assert_eq!(u32::from(clock.update_period()), expected);
    }

    #[test]
    fn respawn_only_happens_with_lives_remaining() {
        let mut pacman = Position::EMPTY;
        let mut scoreboard = ScoreBoard::new();
        let mut clock = ClockState::new();
        try_respawn_pacman(&mut pacman, &scoreboard, &mut clock);
        assert_eq!(pacman, Position::new(23, 13, Direction::Right));

        scoreboard.decrement_lives();
        scoreboard.decrement_lives();
        scoreboard.decrement_lives();
        let mut pacman = Position::EMPTY;
        try_respawn_pacman(&mut pacman, &scoreboard, &mut clock);
        assert!(pacman.is_empty());
    }
}
