//! Packs one tick's worth of game state into the big-endian binary
//! snapshot frame clients and the mirror socket receive.
//!
//! Modeled on `oroboros_networking::protocol::serialization`'s
//! `PacketSerializer` — a reusable fixed-size buffer with `write_u8`/
//! `write_u16`-style helpers — but big-endian throughout, per the wire
//! format this spec fixes (the teacher's own serializer is little-endian;
//! this divergence is the wire format, not a style choice).

use pm_shared::{Position, MAX_SNAPSHOT_SIZE};

use crate::clock::Mode;
use crate::entities::FRUIT_DURATION;
use crate::maze::ROWS;

/// One ghost's fields as they appear in a snapshot, gathered from the
/// locked `Ghost` the moment the frame is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostSnapshot {
    /// Current cell and facing.
    pub loc: Position,
    /// Ticks left frightened.
    pub fright_steps: u8,
    /// Whether still inside/returning to the house.
    pub spawning: bool,
    /// Ticks left forced to reverse.
    pub trapped_steps: u8,
    /// One-shot "just eaten" flag.
    pub eaten: bool,
}

/// Everything one snapshot frame needs, gathered from the locked game
/// state before serialization so the serializer itself never touches a
/// lock.
pub struct SnapshotInput {
    /// Current tick count.
    pub ticks: u16,
    /// Ticks per update boundary.
    pub update_period: u8,
    /// Current mode.
    pub mode: Mode,
    /// Remaining steps in the current mode.
    pub mode_steps: u8,
    /// Step duration of `last_unpaused_mode`.
    pub last_unpaused_mode_duration: u8,
    /// Remaining steps until the next level-penalty speedup.
    pub level_steps: u16,
    /// Current score.
    pub score: u16,
    /// Current level.
    pub level: u8,
    /// Remaining lives.
    pub lives: u8,
    /// Ghosts eaten in the current fright window.
    pub ghost_combo: u8,
    /// The four ghosts, in red/pink/cyan/orange order.
    pub ghosts: [GhostSnapshot; 4],
    /// Pacman's current position (the empty sentinel while dead).
    pub pacman: Position,
    /// Fruit's position, meaningful only if `fruit_exists`.
    pub fruit_loc: Position,
    /// Whether the fruit is currently visible.
    pub fruit_exists: bool,
    /// Update boundaries left before the fruit disappears.
    pub fruit_steps: u8,
    /// The live pellet bit-grid, one `u32` per row.
    pub pellets: [u32; ROWS],
}

/// Total length of one serialized snapshot frame.
pub const FRAME_LEN: usize = 13 + 4 * 4 + 2 + 2 + 1 + 1 + ROWS * 4;

/// Serializes snapshots into a reused, fixed-size buffer — no
/// allocation on the per-tick broadcast path.
pub struct Serializer {
    buf: [u8; MAX_SNAPSHOT_SIZE],
}

impl Serializer {
    /// A serializer with a fresh, zeroed buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0u8; MAX_SNAPSHOT_SIZE],
        }
    }

    /// Writes `input` into the internal buffer and returns the filled
    /// prefix — exactly [`FRAME_LEN`] bytes, every call.
    pub fn serialize(&mut self, input: &SnapshotInput) -> &[u8] {
        let mut w = Cursor {
            buf: &mut self.buf,
            pos: 0,
        };

        w.put_u16(input.ticks);
        w.put_u8(input.update_period);
        w.put_u8(input.mode as u8);
        w.put_u8(input.mode_steps);
        w.put_u8(input.last_unpaused_mode_duration);
        w.put_u16(input.level_steps);
        w.put_u16(input.score);
        w.put_u8(input.level);
        w.put_u8(input.lives);
        w.put_u8(input.ghost_combo);

        for ghost in &input.ghosts {
            let [row_byte, col_byte] = ghost.loc.encode();
            w.put_u8(row_byte);
            w.put_u8(col_byte);
            let fright_byte = ghost.fright_steps | (if ghost.spawning { 0x80 } else { 0 });
            w.put_u8(fright_byte);
            let trapped_byte = ghost.trapped_steps | (if ghost.eaten { 0x80 } else { 0 });
            w.put_u8(trapped_byte);
        }

        let [row_byte, col_byte] = input.pacman.encode();
        w.put_u8(row_byte);
        w.put_u8(col_byte);

        let fruit_wire = if input.fruit_exists {
            input.fruit_loc
        } else {
            Position::EMPTY
        };
        let [row_byte, col_byte] = fruit_wire.encode();
        w.put_u8(row_byte);
        w.put_u8(col_byte);
        w.put_u8(input.fruit_steps);
        w.put_u8(FRUIT_DURATION);

        for row in &input.pellets {
            w.put_u32(*row);
        }

        debug_assert_eq!(w.pos, FRAME_LEN);
        &self.buf[..FRAME_LEN]
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn put_u8(&mut self, value: u8) {
        self.buf[self.pos] = value;
        self.pos += 1;
    }

    fn put_u16(&mut self, value: u16) {
        self.buf[self.pos..self.pos + 2].copy_from_slice(&value.to_be_bytes());
        self.pos += 2;
    }

    fn put_u32(&mut self, value: u32) {
        self.buf[self.pos..self.pos + 4].copy_from_slice(&value.to_be_bytes());
        self.pos += 4;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_shared::Direction;

    fn sample_input() -> SnapshotInput {
        SnapshotInput {
            ticks: 0x0102,
            update_period: 0x0C,
            mode: Mode::Scatter,
            mode_steps: crate::clock::SCATTER_DURATION,
            last_unpaused_mode_duration: crate::clock::SCATTER_DURATION,
            level_steps: crate::clock::INITIAL_LEVEL_STEPS,
            score: 0,
            level: 1,
            lives: 3,
            ghost_combo: 0,
            ghosts: [GhostSnapshot {
                loc: Position::EMPTY,
                fright_steps: 0,
                spawning: true,
                trapped_steps: 0,
                eaten: false,
            }; 4],
            pacman: Position::new(23, 13, Direction::Right),
            fruit_loc: Position::EMPTY,
            fruit_exists: false,
            fruit_steps: 0,
            pellets: crate::maze::INITIAL_PELLETS,
        }
    }

    #[test]
    fn frame_length_is_deterministic() {
        let mut serializer = Serializer::new();
        let bytes = serializer.serialize(&sample_input());
        assert_eq!(bytes.len(), FRAME_LEN);
    }

    #[test]
    fn serializing_same_state_twice_is_identical() {
        let mut serializer = Serializer::new();
        let input = sample_input();
        let first = serializer.serialize(&input).to_vec();
        let second = serializer.serialize(&input).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn header_bytes_match_the_wire_format() {
        let mut serializer = Serializer::new();
        let bytes = serializer.serialize(&sample_input());
        assert_eq!(&bytes[0..5], &[0x01, 0x02, 0x0C, 0x01, crate::clock::SCATTER_DURATION]);
    }
}
