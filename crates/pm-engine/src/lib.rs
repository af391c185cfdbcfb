//! Deterministic tick-driven Pacman game core: maze constants, entities,
//! per-aggregate-locked game state, ghost AI, collision/scoring, the
//! command interpreter, the binary snapshot serializer, and the tick
//! scheduler that drives it all forward.
//!
//! Grounded on `oroboros_networking::server::{state,tick,connection}` and
//! `src/worlds/inferno/dragon::state_machine`; see `DESIGN.md` at the
//! workspace root for the full grounding ledger.

#![deny(missing_docs)]
#![deny(unsafe_code)]

mod clock;
mod collision;
mod command;
mod entities;
mod error;
mod ghost;
mod maze;
mod pellets;
mod rng;
mod score;
mod serialize;
mod state;
mod tick;

pub use clock::{Mode, INITIAL_UPDATE_PERIOD};
pub use command::{parse, Command};
pub use entities::{GhostColor, FRUIT_DURATION, FRUIT_POINTS, GHOST_FRIGHT_STEPS};
pub use error::CommandError;
pub use maze::{COLS, INITIAL_PELLET_COUNT, ROWS};
pub use score::INITIAL_LIVES;
pub use serialize::{GhostSnapshot, Serializer, SnapshotInput, FRAME_LEN};
pub use state::{GameState, PACMAN_SPAWN};
pub use tick::{ServerStats, TickLoop, DEFAULT_TICK_HZ};
