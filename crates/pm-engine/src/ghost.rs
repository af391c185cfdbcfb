//! Ghost AI: the `update`/`plan` pair run for all four ghosts at every
//! update boundary, plus the scoring/respawn/fright helpers collision
//! handling needs.
//!
//! `plan` is written as a pure function of a ghost and a small read-only
//! [`PlanContext`] projection of the world, rather than reaching back
//! into a shared game-state object graph — see DESIGN.md's note on
//! `src/worlds/inferno/dragon`'s tick-keyed, side-effect-free transition
//! functions, which this mirrors.

use pm_shared::{Direction, Position};
use tracing::warn;

use crate::clock::Mode;
use crate::entities::{Ghost, GhostColor, GHOST_FRIGHT_STEPS};
use crate::maze;
use crate::rng::GhostRng;

/// Read-only view of the parts of the world `plan` needs. Built fresh
/// by the caller from whichever locks it already holds; never stored.
#[derive(Clone, Copy, Debug)]
pub struct PlanContext {
    /// Pacman's current position.
    pub pacman: Position,
    /// Red's current position, needed for cyan's reflection target.
    pub red_loc: Position,
    /// The mode scatter/chase targeting should use — `last_unpaused_mode`,
    /// not the possibly-`Paused` current mode.
    pub last_unpaused_mode: Mode,
}

/// Runs the per-boundary `update()` step: clears `spawning` on arrival
/// at the house, clears a one-shot `eaten` flag, ticks down fright, and
/// commits the previously planned move.
pub fn update(ghost: &mut Ghost) {
    let red_spawn = GhostColor::Red.spawn();
    let arriving = ghost.next_loc;
    if arriving.row == red_spawn.row
        && arriving.col == red_spawn.col
        && arriving.dir != Direction::Down
    {
        ghost.spawning = false;
    }

    if ghost.eaten {
        ghost.eaten = false;
        ghost.fright_steps = 0;
    } else if ghost.fright_steps > 0 {
        ghost.fright_steps -= 1;
    }

    ghost.loc = ghost.next_loc;
}

/// Runs the per-boundary `plan()` step: advances `next_loc` one cell and
/// picks its direction for the following boundary.
pub fn plan(ghost: &mut Ghost, ctx: &PlanContext, rng: &mut GhostRng) {
    if ghost.loc.is_empty() {
        return;
    }

    ghost.next_loc = ghost.loc.ahead();

    if ghost.trapped_steps > 0 {
        ghost.next_loc.dir = ghost.next_loc.dir.reverse();
        ghost.trapped_steps -= 1;
        return;
    }

    let target = pick_target(ghost, ctx);
    let forbidden = ghost.next_loc.dir.reverse();

    let mut valid = [Direction::Up; 4];
    let mut valid_len = 0usize;
    for &dir in &Direction::CARDINAL {
        if dir == forbidden {
            continue;
        }
        let neighbor = ghost.next_loc.neighbor(dir);
        if is_valid_ghost_cell(neighbor, ghost.spawning) {
            valid[valid_len] = dir;
            valid_len += 1;
        }
    }
    let valid = &valid[..valid_len];

    if valid.is_empty() {
        warn!(color = ?ghost.color, "no valid ghost direction, holding course");
        return;
    }

    let chosen = if ghost.fright_steps > 1 {
        *rng.pick(valid)
    } else {
        *valid
            .iter()
            .min_by_key(|&&dir| {
                let candidate = ghost.next_loc.neighbor(dir);
                candidate.distance_squared(&target)
            })
            .expect("valid is non-empty")
    };

    ghost.next_loc.dir = chosen;
}

fn is_valid_ghost_cell(pos: Position, spawning: bool) -> bool {
    if !maze::is_wall(pos.row, pos.col) {
        return true;
    }
    if spawning && maze::in_ghost_house(pos.row, pos.col) {
        return true;
    }
    maze::is_ghost_house_exit(pos.row, pos.col)
}

fn same_cell(a: Position, b: Position) -> bool {
    a.row == b.row && a.col == b.col
}

fn pick_target(ghost: &Ghost, ctx: &PlanContext) -> Position {
    let red_spawn = GhostColor::Red.spawn();
    if ghost.spawning
        && !same_cell(ghost.loc, red_spawn)
        && !same_cell(ghost.next_loc, red_spawn)
    {
        return red_spawn;
    }

    if ctx.last_unpaused_mode == Mode::Chase {
        chase_target(ghost.color, ghost.loc, ctx.pacman, ctx.red_loc)
    } else {
        ghost.color.scatter_target()
    }
}

/// Orange gives up the chase and heads home once it's within this
/// distance (squared) of Pacman.
const ORANGE_FLEE_DISTANCE_SQUARED: i32 = 64;

fn chase_target(color: GhostColor, self_loc: Position, pacman: Position, red_loc: Position) -> Position {
    match color {
        GhostColor::Red => pacman,
        GhostColor::Pink => ahead_by(pacman, 4),
        GhostColor::Cyan => {
            let pivot = ahead_by(pacman, 2);
            Position::new(
                scale_clamped(2 * i32::from(pivot.row) - i32::from(red_loc.row)),
                scale_clamped(2 * i32::from(pivot.col) - i32::from(red_loc.col)),
                Direction::None,
            )
        }
        GhostColor::Orange => {
            if self_loc.distance_squared(&pacman) >= ORANGE_FLEE_DISTANCE_SQUARED {
                pacman
            } else {
                GhostColor::Orange.scatter_target()
            }
        }
    }
}

fn ahead_by(pos: Position, cells: i8) -> Position {
    let (drow, dcol) = pos.dir.delta();
    Position::new(
        scale_clamped(i32::from(pos.row) + i32::from(drow) * i32::from(cells)),
        scale_clamped(i32::from(pos.col) + i32::from(dcol) * i32::from(cells)),
        Direction::None,
    )
}

fn scale_clamped(value: i32) -> i8 {
    value.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
}

/// Forces every non-trapped ghost to reverse on its next `plan()`, as a
/// scatter/chase mode flip does. Already-trapped ghosts are untouched.
pub fn force_reverse_all_non_trapped(ghosts: &mut [Ghost; 4]) {
    for ghost in ghosts.iter_mut() {
        if ghost.trapped_steps == 0 {
            ghost.trapped_steps = 1;
        }
    }
}

/// Puts one ghost into a fresh fright window and forces an immediate
/// reversal, overwriting any reversal already in progress.
pub fn frighten(ghost: &mut Ghost) {
    ghost.fright_steps = GHOST_FRIGHT_STEPS;
    ghost.trapped_steps = 1;
}

/// Teleports an eaten ghost back to its spawn cell and marks it eaten
/// (a one-tick flag the next `update()` call clears) and spawning.
pub fn respawn(ghost: &mut Ghost) {
    let spawn = ghost.color.spawn();
    ghost.loc = spawn;
    ghost.next_loc = spawn;
    ghost.eaten = true;
    ghost.spawning = true;
    ghost.fright_steps = 0;
    ghost.trapped_steps = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Ghost;

    fn context(mode: Mode) -> PlanContext {
        PlanContext {
            pacman: Position::new(10, 10, Direction::Right),
            red_loc: Position::new(12, 13, Direction::Left),
            last_unpaused_mode: mode,
        }
    }

    #[test]
    fn update_clears_eaten_and_fright_in_one_call() {
        let mut ghost = Ghost::reset(GhostColor::Red);
        ghost.eaten = true;
        ghost.fright_steps = 10;
        ghost.next_loc = ghost.loc;
        update(&mut ghost);
        assert!(!ghost.eaten);
        assert_eq!(ghost.fright_steps, 0);
    }

    #[test]
    fn trapped_ghost_reverses_and_counts_down() {
        let mut ghost = Ghost::reset(GhostColor::Pink);
        ghost.loc = Position::new(14, 13, Direction::Down);
        ghost.trapped_steps = 3;
        let ctx = context(Mode::Scatter);
        let mut rng = GhostRng::from_system_time();
        plan(&mut ghost, &ctx, &mut rng);
        assert_eq!(ghost.next_loc.dir, Direction::Up);
        assert_eq!(ghost.trapped_steps, 2);
    }

    #[test]
    fn plan_never_chooses_the_reverse_direction() {
        let mut ghost = Ghost::reset(GhostColor::Red);
        ghost.spawning = false;
        ghost.loc = Position::new(5, 5, Direction::Right);
        ghost.trapped_steps = 0;
        let ctx = context(Mode::Chase);
        let mut rng = GhostRng::from_system_time();
        plan(&mut ghost, &ctx, &mut rng);
        assert_ne!(ghost.next_loc.dir, Direction::Left);
    }

    #[test]
    fn frighten_sets_fright_steps_and_forces_reversal() {
        let mut ghost = Ghost::reset(GhostColor::Cyan);
        ghost.trapped_steps = 0;
        frighten(&mut ghost);
        assert_eq!(ghost.fright_steps, GHOST_FRIGHT_STEPS);
        assert_eq!(ghost.trapped_steps, 1);
    }

    #[test]
    fn respawn_marks_eaten_and_spawning_at_spawn_cell() {
        let mut ghost = Ghost::reset(GhostColor::Orange);
        ghost.spawning = false;
        respawn(&mut ghost);
        assert!(ghost.eaten);
        assert!(ghost.spawning);
        assert_eq!(ghost.loc.row, GhostColor::Orange.spawn().row);
        assert_eq!(ghost.loc.col, GhostColor::Orange.spawn().col);
    }

    #[test]
    fn orange_flees_to_scatter_target_when_close() {
        let pacman = Position::new(10, 10, Direction::Right);
        let target = chase_target(GhostColor::Orange, Position::new(10, 11, Direction::None), pacman, pacman);
        assert_eq!(target, GhostColor::Orange.scatter_target());

        let target = chase_target(GhostColor::Orange, Position::new(0, 0, Direction::None), pacman, pacman);
        assert_eq!(target.row, pacman.row);
        assert_eq!(target.col, pacman.col);
    }
}
