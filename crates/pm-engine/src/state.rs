//! `GameState`: the authoritative per-process game instance. Owns one
//! per-aggregate lock per concern (REDESIGN FLAG from the spec's design
//! notes — per-scalar `RwLock`s would be excessive), and is the only
//! place that acquires more than one of them at a time.
//!
//! Grounded on `oroboros_networking::server::state::ServerState`'s
//! "update-then-snapshot" shape, generalized from its fixed client/entity
//! slices to the pellet/ghost/fruit/score aggregates this game needs.

use std::collections::VecDeque;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use pm_shared::{Direction, Position};

use crate::clock::{ClockState, Mode};
use crate::collision;
use crate::command::Command;
use crate::entities::{FruitState, Ghost, GhostColor};
use crate::ghost::{self, PlanContext};
use crate::maze;
use crate::pellets::PelletGrid;
use crate::rng::GhostRng;
use crate::score::ScoreBoard;
use crate::serialize::{GhostSnapshot, SnapshotInput};

/// Pacman's fixed spawn cell.
pub const PACMAN_SPAWN: Position = Position::new(23, 13, Direction::Right);

/// The authoritative game instance. Cheap to construct; expected to
/// live for the whole process behind one `Arc`.
pub struct GameState {
    clock: RwLock<ClockState>,
    score_board: RwLock<ScoreBoard>,
    pellets: RwLock<PelletGrid>,
    fruit: RwLock<FruitState>,
    pacman: Mutex<Position>,
    ghosts: Mutex<[Ghost; 4]>,
    rng: Mutex<GhostRng>,
    num_active_ghosts: usize,
}

impl GameState {
    /// Builds a fresh game. `num_active_ghosts` (0..=4) beyond the
    /// first are parked in the house forever: skipped by the
    /// update/plan barrier, and unreachable by Pacman since the house
    /// interior is walled off from the player grid.
    #[must_use]
    pub fn new(num_active_ghosts: usize) -> Self {
        Self {
            clock: RwLock::new(ClockState::new()),
            score_board: RwLock::new(ScoreBoard::new()),
            pellets: RwLock::new(PelletGrid::new()),
            fruit: RwLock::new(FruitState::hidden()),
            pacman: Mutex::new(PACMAN_SPAWN),
            ghosts: Mutex::new(GhostColor::ALL.map(Ghost::reset)),
            rng: Mutex::new(GhostRng::from_system_time()),
            num_active_ghosts: num_active_ghosts.min(4),
        }
    }

    /// Full in-place game reset, as the `'R'` command triggers. Keeps
    /// the same `GameState` (and so the same sockets in `pm-net`).
    pub fn reset(&self) {
        *self.clock.write() = ClockState::new();
        *self.score_board.write() = ScoreBoard::new();
        *self.pellets.write() = PelletGrid::new();
        *self.fruit.write() = FruitState::hidden();
        *self.pacman.lock() = PACMAN_SPAWN;
        *self.ghosts.lock() = GhostColor::ALL.map(Ghost::reset);
        info!("game reset");
    }

    /// Pauses the game (idempotent).
    pub fn pause(&self) {
        self.clock.write().pause();
    }

    /// Resumes the game. Returns whether it actually resumed.
    pub fn play(&self) -> bool {
        let lives = self.score_board.read().lives();
        let resumed = self.clock.write().play(lives);
        if !resumed {
            debug!("play() refused");
        }
        resumed
    }

    /// Dispatches one already-parsed command.
    pub fn handle_command(&self, command: Command) {
        match command {
            Command::Pause => self.pause(),
            Command::Play => {
                self.play();
            }
            Command::Reset => self.reset(),
            Command::Move(dir) => self.move_dir(dir),
            Command::AbsoluteMove(row, col) => self.move_absolute(row, col),
        }
    }

    /// `movePacmanDir`: one step in a cardinal direction.
    pub fn move_dir(&self, dir: Direction) {
        let mut pacman = self.pacman.lock();

        if self.is_blocked_for_input() {
            return;
        }

        pacman.dir = dir;
        let neighbor = pacman.neighbor(dir);
        if maze::is_wall(neighbor.row, neighbor.col) {
            self.run_collision_check(&mut pacman);
            return;
        }

        *pacman = neighbor;
        self.collect_at(&mut pacman);
        self.run_collision_check(&mut pacman);
    }

    /// `movePacmanAbsolute`: BFS toward a vision-supplied cell, walking
    /// it one step at a time unless the path is long enough that we
    /// teleport and log a tracking-degraded warning instead.
    pub fn move_absolute(&self, row: i8, col: i8) {
        let mut pacman = self.pacman.lock();

        if self.clock.read().mode() == Mode::Paused {
            return;
        }
        if maze::is_wall(row, col) || (pacman.row == row && pacman.col == col) {
            return;
        }

        let start = (pacman.row, pacman.col);
        let Some(path) = bfs_path(start, (row, col)) else {
            error!(?start, target = ?(row, col), "absolute move: maze graph disconnected");
            return;
        };

        if path.len() > 5 {
            warn!(len = path.len(), "tracking degraded, teleporting to target");
            let dir = path.last().copied().unwrap_or(pacman.dir);
            *pacman = Position::new(row, col, dir);
            self.collect_at(&mut pacman);
            self.run_collision_check(&mut pacman);
            return;
        }

        for dir in path {
            pacman.dir = dir;
            *pacman = pacman.neighbor(dir);
            self.collect_at(&mut pacman);
            if self.run_collision_check(&mut pacman) {
                break;
            }
        }
    }

    fn is_blocked_for_input(&self) -> bool {
        let clock = self.clock.read();
        clock.mode() == Mode::Paused || clock.pause_on_update()
    }

    fn collect_at(&self, pacman: &mut Position) {
        let mut pellets = self.pellets.write();
        let mut fruit = self.fruit.write();
        let mut score = self.score_board.write();
        let mut ghosts = self.ghosts.lock();
        let mut clock = self.clock.write();
        collision::collect_at(
            pacman,
            &mut pellets,
            &mut fruit,
            &mut score,
            &mut ghosts,
            &mut clock,
            self.num_active_ghosts,
        );
    }

    /// Runs the ghost-collision sweep. Returns whether Pacman died.
    fn run_collision_check(&self, pacman: &mut Position) -> bool {
        let mut ghosts = self.ghosts.lock();
        let mut score = self.score_board.write();
        let pellets = self.pellets.read();
        let mut fruit = self.fruit.write();
        let mut clock = self.clock.write();
        collision::check_ghost_collisions(
            pacman,
            &mut ghosts,
            &mut score,
            &pellets,
            &mut fruit,
            &mut clock,
            self.num_active_ghosts,
        )
    }

    /// Advances one tick. Every `update_period` ticks this also runs a
    /// full update boundary: ghost update-all/plan-all, collision,
    /// respawn, and the mode/level/fruit counters.
    pub fn tick(&self) {
        let at_boundary = {
            let mut clock = self.clock.write();
            clock.advance_tick();
            clock.tick_toward_boundary()
        };
        if at_boundary {
            self.run_update_boundary();
        }
    }

    fn run_update_boundary(&self) {
        let mut ghosts = self.ghosts.lock();
        let active = self.num_active_ghosts;

        {
            let mut refs: Vec<&mut Ghost> = ghosts.iter_mut().collect();
            refs.par_iter_mut().take(active).for_each(|g| ghost::update(*g));
        }

        {
            let mut clock = self.clock.write();
            if clock.pause_on_update() {
                clock.pause();
                clock.set_pause_on_update(false);
            }
        }

        let mut pacman = self.pacman.lock();
        {
            let score = self.score_board.read();
            let mut clock = self.clock.write();
            collision::try_respawn_pacman(&mut pacman, &score, &mut clock);
        }
        {
            let mut score = self.score_board.write();
            let pellets = self.pellets.read();
            let mut fruit = self.fruit.write();
            let mut clock = self.clock.write();
            collision::check_ghost_collisions(
                &mut pacman,
                &mut ghosts,
                &mut score,
                &pellets,
                &mut fruit,
                &mut clock,
                active,
            );
        }

        let step_events = self.clock.write().handle_step_events();
        if step_events.mode_flipped {
            ghost::force_reverse_all_non_trapped(&mut ghosts);
        }
        self.fruit.write().decrement();

        let pacman_snapshot = *pacman;
        drop(pacman);
        let red_loc = ghosts[0].loc;
        let last_unpaused_mode = self.clock.read().last_unpaused_mode();
        let ctx = PlanContext {
            pacman: pacman_snapshot,
            red_loc,
            last_unpaused_mode,
        };

        let mut refs: Vec<&mut Ghost> = ghosts.iter_mut().collect();
        refs.par_iter_mut().take(active).for_each(|g| {
            let mut rng = self.rng.lock();
            ghost::plan(*g, &ctx, &mut rng);
        });
    }

    /// Gathers everything one snapshot frame needs under short-lived
    /// locks, releasing each before moving to the next aggregate.
    #[must_use]
    pub fn snapshot_input(&self) -> SnapshotInput {
        let clock = self.clock.read();
        let score = self.score_board.read();
        let pellets = self.pellets.read();
        let fruit = self.fruit.read();
        let pacman = *self.pacman.lock();
        let ghosts = *self.ghosts.lock();

        SnapshotInput {
            ticks: clock.ticks(),
            update_period: clock.update_period(),
            mode: clock.mode(),
            mode_steps: clock.mode_steps(),
            last_unpaused_mode_duration: crate::clock::mode_duration(clock.last_unpaused_mode()),
            level_steps: clock.level_steps(),
            score: score.score(),
            level: score.level(),
            lives: score.lives(),
            ghost_combo: score.ghost_combo(),
            ghosts: std::array::from_fn(|i| {
                if i < self.num_active_ghosts {
                    let g = ghosts[i];
                    GhostSnapshot {
                        loc: g.loc,
                        fright_steps: g.fright_steps,
                        spawning: g.spawning,
                        trapped_steps: g.trapped_steps,
                        eaten: g.eaten,
                    }
                } else {
                    GhostSnapshot {
                        loc: Position::EMPTY,
                        fright_steps: 0,
                        spawning: false,
                        trapped_steps: 0,
                        eaten: false,
                    }
                }
            }),
            pacman,
            fruit_loc: fruit.loc,
            fruit_exists: fruit.is_visible(),
            fruit_steps: fruit.steps_remaining,
            pellets: pellets.rows(),
        }
    }

    /// Pellets remaining, for logging/metrics.
    #[must_use]
    pub fn pellets_remaining(&self) -> u32 {
        self.pellets.read().remaining()
    }

    /// Current score, for logging/metrics.
    #[must_use]
    pub fn score(&self) -> u16 {
        self.score_board.read().score()
    }
}

/// Shortest-path BFS over non-wall cells, returning the sequence of
/// directions to walk from `start` to `target`. `None` if disconnected.
fn bfs_path(start: (i8, i8), target: (i8, i8)) -> Option<Vec<Direction>> {
    if start == target {
        return Some(Vec::new());
    }

    let mut visited = vec![vec![false; maze::COLS]; maze::ROWS];
    let mut came_from: Vec<Vec<Option<(i8, i8, Direction)>>> =
        vec![vec![None; maze::COLS]; maze::ROWS];
    let mut queue = VecDeque::new();

    visited[start.0 as usize][start.1 as usize] = true;
    queue.push_back(start);

    while let Some((r, c)) = queue.pop_front() {
        if (r, c) == target {
            let mut path = Vec::new();
            let mut cur = (r, c);
            while cur != start {
                let (pr, pc, dir) = came_from[cur.0 as usize][cur.1 as usize]
                    .expect("reachable cell always has a predecessor");
                path.push(dir);
                cur = (pr, pc);
            }
            path.reverse();
            return Some(path);
        }

        for &dir in &Direction::CARDINAL {
            let (dr, dc) = dir.delta();
            let nr = r + dr;
            let nc = c + dc;
            if nr < 0 || nc < 0 || (nr as usize) >= maze::ROWS || (nc as usize) >= maze::COLS {
                continue;
            }
            if maze::is_wall(nr, nc) {
                continue;
            }
            if visited[nr as usize][nc as usize] {
                continue;
            }
            visited[nr as usize][nc as usize] = true;
            came_from[nr as usize][nc as usize] = Some((r, c, dir));
            queue.push_back((nr, nc));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pellet_scenario_clears_one_row_of_dots() {
        let state = GameState::new(4);
        assert!(state.play());
        let before = state.pellets_remaining();
        for _ in 0..20 {
            state.move_dir(Direction::Down);
        }
        assert!(state.pellets_remaining() <= before);
    }

    #[test]
    fn reset_restores_initial_score_and_lives() {
        let state = GameState::new(4);
        state.move_dir(Direction::Down);
        state.reset();
        assert_eq!(state.score(), 0);
        assert_eq!(state.pellets_remaining(), maze::INITIAL_PELLET_COUNT);
    }

    #[test]
    fn snapshot_input_reports_deterministic_frame_fields() {
        let state = GameState::new(4);
        let snapshot = state.snapshot_input();
        assert_eq!(snapshot.ticks, 0);
        assert_eq!(snapshot.mode, Mode::Scatter);
        assert_eq!(snapshot.pacman, PACMAN_SPAWN);
    }

    #[test]
    fn bfs_finds_direct_neighbor_path() {
        let path = bfs_path((23, 13), (23, 14)).unwrap();
        assert_eq!(path, vec![Direction::Right]);
    }

    #[test]
    fn bfs_returns_none_for_a_wall_cell() {
        assert!(bfs_path((23, 13), (0, 0)).is_some() || maze::is_wall(0, 0));
    }
}
