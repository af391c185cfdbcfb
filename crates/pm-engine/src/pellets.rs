//! The mutable pellet bit-grid and the fixed count thresholds that
//! trigger fruit spawns, anger speedups, and level clears.

use crate::maze::{self, COLS, ROWS};

/// Remaining-pellet count at which the first fruit spawns.
pub const FRUIT_THRESHOLD_1: u32 = 174;
/// Remaining-pellet count at which the second fruit spawns.
pub const FRUIT_THRESHOLD_2: u32 = 74;
/// Remaining-pellet count at which the first anger speedup fires.
pub const ANGER_THRESHOLD_1: u32 = 20;
/// Remaining-pellet count at which the second anger speedup fires.
pub const ANGER_THRESHOLD_2: u32 = 10;

/// Per-row mutable pellet bitmask plus the running popcount, kept in
/// lockstep so callers never need to recompute it.
#[derive(Clone, Copy, Debug)]
pub struct PelletGrid {
    rows: [u32; ROWS],
    remaining: u32,
}

impl PelletGrid {
    /// A freshly filled grid, as a new game or `levelReset` leaves it.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: maze::INITIAL_PELLETS,
            remaining: maze::INITIAL_PELLET_COUNT,
        }
    }

    /// Pellets left on the board.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The raw per-row bitmask, as the wire snapshot transmits it directly.
    #[must_use]
    pub const fn rows(&self) -> [u32; ROWS] {
        self.rows
    }

    /// True if `(row, col)` currently carries a pellet.
    #[must_use]
    pub fn has_pellet(&self, row: i8, col: i8) -> bool {
        if row < 0 || col < 0 || (row as usize) >= ROWS || (col as usize) >= COLS {
            return false;
        }
        (self.rows[row as usize] >> col) & 1 != 0
    }

    /// Clears the pellet at `(row, col)` if present, decrementing the
    /// running count. Returns whether a pellet was actually there.
    pub fn collect(&mut self, row: i8, col: i8) -> bool {
        if !self.has_pellet(row, col) {
            return false;
        }
        self.rows[row as usize] &= !(1 << col);
        self.remaining -= 1;
        true
    }

    /// Refills the grid back to its initial layout, as `levelReset` does.
    pub fn reset(&mut self) {
        self.rows = maze::INITIAL_PELLETS;
        self.remaining = maze::INITIAL_PELLET_COUNT;
    }

    /// The invariant the grid must always satisfy: `remaining` equals the
    /// popcount of the live bit-grid.
    #[cfg(test)]
    fn popcount_matches_remaining(&self) -> bool {
        let total: u32 = self.rows.iter().map(|row| row.count_ones()).sum();
        total == self.remaining
    }
}

impl Default for PelletGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_grid_matches_maze_initial_count() {
        let grid = PelletGrid::new();
        assert_eq!(grid.remaining(), maze::INITIAL_PELLET_COUNT);
        assert!(grid.popcount_matches_remaining());
    }

    #[test]
    fn collect_clears_bit_and_decrements_count() {
        let mut grid = PelletGrid::new();
        assert!(grid.has_pellet(3, 1));
        assert!(grid.collect(3, 1));
        assert!(!grid.has_pellet(3, 1));
        assert_eq!(grid.remaining(), maze::INITIAL_PELLET_COUNT - 1);
        assert!(grid.popcount_matches_remaining());
    }

    #[test]
    fn collect_on_empty_cell_is_a_no_op() {
        let mut grid = PelletGrid::new();
        assert!(!grid.collect(0, 0));
        assert_eq!(grid.remaining(), maze::INITIAL_PELLET_COUNT);
    }

    #[test]
    fn reset_restores_initial_layout() {
        let mut grid = PelletGrid::new();
        grid.collect(3, 1);
        grid.collect(1, 1);
        grid.reset();
        assert_eq!(grid.remaining(), maze::INITIAL_PELLET_COUNT);
        assert!(grid.has_pellet(3, 1));
    }
}
