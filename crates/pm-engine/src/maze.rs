//! The fixed 31x28 maze grid: an immutable wall bit-grid and the pellet
//! layout new games start from.
//!
//! Each row is packed into a `u32` with column `c` at bit `c` (bit 0 is
//! the leftmost column), matching the wire format's per-row pellet
//! encoding in `serialize.rs`.

/// Number of rows in the maze.
pub const ROWS: usize = 31;
/// Number of columns in the maze.
pub const COLS: usize = 28;

/// Pellet count a freshly reset maze starts with.
pub const INITIAL_PELLET_COUNT: u32 = 244;

/// The four super-pellet cells, as (row, col).
pub const SUPER_PELLETS: [(i8, i8); 4] = [(3, 1), (3, 26), (23, 1), (23, 26)];

/// Cell the ghost house's door opens onto, one row above the box.
pub const GHOST_HOUSE_EXIT: (i8, i8) = (12, 13);

/// Row/column bounds (inclusive) of the ghost house interior, used to
/// relax ghost movement validity while a ghost is spawning.
const GHOST_HOUSE_BOUNDS: (i8, i8, i8, i8) = (13, 16, 11, 16);

/// True if `(row, col)` lies inside the ghost house box, door included.
#[must_use]
pub fn in_ghost_house(row: i8, col: i8) -> bool {
    let (r0, r1, c0, c1) = GHOST_HOUSE_BOUNDS;
    (r0..=r1).contains(&row) && (c0..=c1).contains(&col)
}

/// True if `(row, col)` is the ghost-house exit cell.
#[must_use]
pub fn is_ghost_house_exit(row: i8, col: i8) -> bool {
    (row, col) == GHOST_HOUSE_EXIT
}

/// Immutable per-row wall bitmask. Bit `c` set means `(row, c)` is a wall.
#[rustfmt::skip]
pub const WALLS: [u32; ROWS] = [
    0x0FFF_FFFF,
    0x0800_0001,
    0x0B7F_6FED,
    0x0B7F_6FED,
    0x0B7F_0FED,
    0x0B7F_9FED,
    0x0B7F_9FED,
    0x0B7F_9FED,
    0x0F7F_9FEF,
    0x0B7F_9FED,
    0x0B7F_9FED,
    0x0B7F_0FED,
    0x0B23_0C4D,
    0x086B_9D61,
    0x0DFB_0DFB,
    0x0813_0C81,
    0x0DD5_FABB,
    0x0914_0289,
    0x0B41_982D,
    0x0B7F_9FED,
    0x0B7F_0FED,
    0x0B7F_6FED,
    0x0B7F_0FED,
    0x0B7F_0FED,
    0x0B7F_6FED,
    0x0B7F_6FED,
    0x0B7F_6FED,
    0x0B7F_0FED,
    0x0B7F_9FED,
    0x0BFF_FFFD,
    0x0FFF_FFFF,
];

/// Per-row pellet bitmask a fresh game starts with. Bit `c` set means a
/// pellet (regular or super) sits at `(row, c)`.
#[rustfmt::skip]
pub const INITIAL_PELLETS: [u32; ROWS] = [
    0x0000_0000,
    0x07FF_FFFE,
    0x0480_9012,
    0x0480_9012,
    0x0480_F012,
    0x0480_6012,
    0x0480_6012,
    0x0480_6012,
    0x0080_6010,
    0x0480_6012,
    0x0480_6012,
    0x0480_F012,
    0x04DC_03B2,
    0x0794_029E,
    0x0204_0204,
    0x07EC_037E,
    0x022A_0544,
    0x06EB_9D76,
    0x04BE_67D2,
    0x0480_6012,
    0x0480_F012,
    0x0480_9012,
    0x0480_F012,
    0x0480_F012,
    0x0480_9012,
    0x0480_9012,
    0x0480_9012,
    0x0480_F012,
    0x0480_6012,
    0x0400_0002,
    0x0000_0000,
];

/// Returns true if `(row, col)` is a wall in the static player-facing grid.
///
/// Ghosts are permitted onto the ghost-house exit cell even when this
/// returns true for it in revisions of the layout that wall it off from
/// Pacman; callers implementing ghost movement special-case that cell
/// explicitly rather than relying on this function alone.
#[must_use]
pub fn is_wall(row: i8, col: i8) -> bool {
    if row < 0 || col < 0 || (row as usize) >= ROWS || (col as usize) >= COLS {
        return true;
    }
    (WALLS[row as usize] >> col) & 1 != 0
}

/// Returns true if `(row, col)` is one of the four super-pellet cells.
#[must_use]
pub fn is_super_pellet(row: i8, col: i8) -> bool {
    SUPER_PELLETS.contains(&(row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_pellet_count_matches_popcount() {
        let total: u32 = INITIAL_PELLETS.iter().map(|row| row.count_ones()).sum();
        assert_eq!(total, INITIAL_PELLET_COUNT);
    }

    #[test]
    fn super_pellet_cells_are_not_walls() {
        for &(row, col) in &SUPER_PELLETS {
            assert!(!is_wall(row, col), "({row}, {col}) should be walkable");
            let bit = (INITIAL_PELLETS[row as usize] >> col) & 1;
            assert_eq!(bit, 1, "({row}, {col}) should carry a pellet");
        }
    }

    #[test]
    fn ghost_house_exit_is_walkable() {
        let (row, col) = GHOST_HOUSE_EXIT;
        assert!(!is_wall(row, col));
    }

    #[test]
    fn pacman_and_fruit_spawn_cells_are_walkable() {
        assert!(!is_wall(23, 13), "pacman spawn must be open");
        assert!(!is_wall(17, 13), "fruit spawn must be open");
    }

    #[test]
    fn out_of_bounds_is_always_a_wall() {
        assert!(is_wall(-1, 0));
        assert!(is_wall(0, -1));
        assert!(is_wall(ROWS as i8, 0));
        assert!(is_wall(0, COLS as i8));
    }
}
