//! Constants describing the snapshot wire frame that both the engine
//! (which writes it) and the net layer (which frames and forwards it)
//! need to agree on.

/// Maximum size of one serialized snapshot frame, in bytes.
///
/// Header (13) + 4 ghosts * 4 bytes (16) + Pacman (2) + fruit (2) +
/// fruit steps/duration (2) + pellet grid (4*31 = 124) = 159, rounded
/// up generously so a format tweak doesn't immediately overflow it.
pub const MAX_SNAPSHOT_SIZE: usize = 256;

/// Byte length of the length prefix placed before each frame on the
/// control and mirror sockets.
pub const FRAME_LEN_PREFIX_SIZE: usize = 2;
