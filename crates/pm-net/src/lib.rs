//! TCP fan-out, JSON configuration loading, and the engine↔broker
//! channel plumbing around a [`pm_engine::GameState`].
//!
//! Grounded on `oroboros_networking::server::mod` (`InfernoServer`'s
//! event/command channel split), reworked from bounded UDP datagrams
//! over `crossbeam_channel` to length-prefixed TCP frames over `tokio`
//! tasks, with `crossbeam_channel` kept at the one boundary that still
//! needs it: the sync engine thread talking to the async broker runtime.

#![deny(missing_docs)]
#![deny(unsafe_code)]

mod broker;
mod config;
mod error;
mod mirror;
mod session;

pub use broker::{Broker, SessionId, OUTBOUND_QUEUE_DEPTH};
pub use config::ServerSettings;
pub use error::{BrokerError, ConfigError};
pub use mirror::serve as serve_mirror;
