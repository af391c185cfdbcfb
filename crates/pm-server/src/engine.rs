//! The per-tick pipeline binding [`pm_engine::GameState`] to the broker:
//! wake → update boundary (inside `tick()`) → serialize → push to the
//! broadcast channel → drain inbound commands → sleep, per spec's data
//! flow. `pm_engine::TickLoop` only covers the "wake, advance" cadence;
//! the serialize/push/drain steps need `pm-net`'s channel types, which
//! `pm-engine` deliberately doesn't depend on.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use pm_engine::{GameState, Serializer};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Drives `game` forward at `tick_hz` until `cancel` fires, pushing one
/// serialized frame per tick into `frame_tx` and applying any command
/// bytes waiting on `command_rx`.
pub async fn run(
    game: Arc<GameState>,
    frame_tx: Sender<Arc<[u8]>>,
    command_rx: Receiver<Vec<u8>>,
    tick_hz: u32,
    cancel: Arc<Notify>,
) {
    let period = Duration::from_micros(1_000_000 / u64::from(tick_hz.max(1)));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut serializer = Serializer::new();

    info!(period_us = period.as_micros(), "engine loop starting");

    loop {
        tokio::select! {
            () = cancel.notified() => break,
            _ = interval.tick() => {
                let start = Instant::now();
                game.tick();

                let frame: Arc<[u8]> = Arc::from(serializer.serialize(&game.snapshot_input()));
                if frame_tx.try_send(frame).is_err() {
                    warn!("broker frame channel full, dropping this tick's snapshot");
                }

                drain_commands(&game, &command_rx);

                let elapsed = start.elapsed();
                if elapsed > period {
                    warn!(?elapsed, budget = ?period, "tick overran its period");
                }
            }
        }
    }

    info!("engine loop stopped");
}

fn drain_commands(game: &GameState, command_rx: &Receiver<Vec<u8>>) {
    while let Ok(bytes) = command_rx.try_recv() {
        match pm_engine::parse(&bytes) {
            Ok(Some(command)) => game.handle_command(command),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "malformed command frame, ignoring"),
        }
    }
}
