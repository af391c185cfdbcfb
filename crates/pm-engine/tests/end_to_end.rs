//! Black-box scenarios driven entirely through `GameState`'s public API,
//! exercising the pellet, super-pellet, ghost-combo, and death paths the
//! same way a connected client's commands would.
//!
//! Two scenarios aren't reachable from outside the crate and live
//! elsewhere instead: the full level-clear boundary (the pellet grid's
//! exact layout isn't queryable through this API) has its own
//! `#[cfg(test)]` unit test next to `collect_at` in `collision.rs`, and
//! the wire format is already covered by `serialize.rs`'s own tests.

use pm_engine::{GameState, GhostColor, GHOST_FRIGHT_STEPS};
use pm_shared::Direction;

#[test]
fn moving_into_a_pellet_cell_scores_and_decrements_the_count() {
    let game = GameState::new(4);
    let before = game.pellets_remaining();

    game.move_dir(Direction::Left);

    let snapshot = game.snapshot_input();
    assert_eq!(snapshot.score, 10);
    assert_eq!(game.pellets_remaining(), before - 1);
    assert!(!snapshot.pacman.is_empty());
}

#[test]
fn collecting_a_super_pellet_frightens_every_ghost_and_clears_the_combo() {
    let game = GameState::new(4);

    // (3, 1) is far enough from spawn that the BFS walk degrades into a
    // teleport, landing Pacman directly on a super pellet cell.
    game.move_absolute(3, 1);

    let snapshot = game.snapshot_input();
    assert_eq!(snapshot.score, 50);
    assert_eq!(snapshot.ghost_combo, 0);
    for ghost in &snapshot.ghosts {
        assert_eq!(ghost.fright_steps, GHOST_FRIGHT_STEPS);
        assert_eq!(ghost.trapped_steps, 1);
    }
}

#[test]
fn eating_two_frightened_ghosts_in_a_row_doubles_the_combo_payout() {
    let game = GameState::new(4);
    game.move_absolute(3, 1);
    assert_eq!(game.snapshot_input().score, 50);

    // Red's spawn cell doubles as the ghost-house exit, walkable by
    // Pacman and far enough from the super pellet to teleport to.
    game.move_absolute(12, 13);
    let after_red = game.snapshot_input();
    assert_eq!(after_red.score, 50 + 200);
    assert_eq!(after_red.ghost_combo, 1);
    assert!(after_red.ghosts[GhostColor::Red as usize].eaten);
    assert!(after_red.ghosts[GhostColor::Red as usize].spawning);

    game.move_absolute(14, 13);
    let after_pink = game.snapshot_input();
    assert_eq!(after_pink.score, 50 + 200 + 400);
    assert_eq!(after_pink.ghost_combo, 2);
    assert!(after_pink.ghosts[GhostColor::Pink as usize].eaten);
}

#[test]
fn walking_into_an_unfrightened_ghost_costs_a_life_and_leaves_pellets_untouched() {
    let game = GameState::new(4);
    let pellets_before = game.pellets_remaining();

    // Same target cell as the ghost-combo scenario, but this time no
    // super pellet has been collected, so red is still dangerous.
    game.move_absolute(12, 13);

    let snapshot = game.snapshot_input();
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.lives, pm_engine::INITIAL_LIVES - 1);
    assert!(snapshot.pacman.is_empty());
    assert_eq!(game.pellets_remaining(), pellets_before);
}
