//! Position/direction primitives and wire-frame constants shared by the
//! `pm-engine` and `pm-net` crates.

#![deny(missing_docs)]
#![deny(unsafe_code)]

mod position;
mod wire;

pub use position::{Direction, Position, EMPTY_COORD};
pub use wire::{FRAME_LEN_PREFIX_SIZE, MAX_SNAPSHOT_SIZE};
