//! The stdin control surface: a dedicated blocking thread, matching the
//! teacher's pattern of giving each distinct I/O concern its own OS
//! thread rather than folding it into the async runtime. `"q"` triggers
//! orderly shutdown; any other line is forwarded verbatim as a command
//! frame on the same channel real client commands arrive on.

use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tokio::sync::Notify;
use tracing::info;

/// Spawns the stdin bridge. The returned handle is not joined by
/// callers in the normal shutdown path — reading stdin blocks until
/// either `"q"` arrives or the pipe closes, and the process exits once
/// the async side finishes regardless.
pub fn spawn(commands: Sender<Vec<u8>>, engine_cancel: Arc<Notify>, broker_shutdown: Arc<Notify>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line == "q" {
                info!("shutdown requested from stdin");
                engine_cancel.notify_one();
                broker_shutdown.notify_one();
                break;
            }
            if line.is_empty() {
                continue;
            }
            if commands.send(line.into_bytes()).is_err() {
                break;
            }
        }
    })
}
