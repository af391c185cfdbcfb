//! Typed errors at the engine's crate boundary.
//!
//! Grounded on `oroboros_economy::error::EconomyError`'s style: one
//! `thiserror` enum per crate, descriptive `#[error("...")]` messages,
//! no panics at this boundary.

use thiserror::Error;

/// Error parsing a command frame. Only the malformed-absolute-move case
/// is an error; every other unrecognized byte sequence parses to `None`
/// and is silently discarded by the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// An `'x'` frame wasn't exactly 3 bytes long.
    #[error("absolute move frame must be 3 bytes, got {len}")]
    MalformedAbsoluteMove {
        /// The actual length received.
        len: usize,
    },
}
