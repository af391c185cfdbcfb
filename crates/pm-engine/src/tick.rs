//! The tick scheduler: drives one [`GameState`] forward at a fixed rate
//! using `tokio::time::interval`, coalescing missed ticks rather than
//! queuing them, with a `Notify`-based cancellation handle.
//!
//! Grounded on `oroboros_networking::server::tick::{TickLoop, TickStats}`,
//! reworked from a spin-wait accumulator loop to `tokio::time::interval`
//! since the consumer here already runs inside an async broker runtime.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::state::GameState;

/// Default tick rate, in Hz.
pub const DEFAULT_TICK_HZ: u32 = 24;

/// Guards against a second tick loop accidentally running against the
/// same process — `GameState` itself has no opinion on how many loops
/// drive it, so the guard lives here instead.
static RUNNING_INSTANCES: AtomicU32 = AtomicU32::new(0);

/// Tick timing statistics, exposed read-only for logging; never part of
/// the wire snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerStats {
    /// Minimum tick duration observed, in microseconds.
    pub min_tick_us: u64,
    /// Maximum tick duration observed, in microseconds.
    pub max_tick_us: u64,
    /// Rolling average tick duration, in microseconds.
    pub avg_tick_us: u64,
    /// Ticks that took longer than the nominal period.
    pub late_ticks: u64,
    /// Total ticks measured.
    pub total_ticks: u64,
}

impl ServerStats {
    fn record(&mut self, duration: Duration, budget: Duration) {
        let us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.total_ticks += 1;
        self.min_tick_us = if self.total_ticks == 1 { us } else { self.min_tick_us.min(us) };
        self.max_tick_us = self.max_tick_us.max(us);
        self.avg_tick_us = if self.total_ticks == 1 {
            us
        } else {
            (self.avg_tick_us * 15 + us) / 16
        };
        if duration > budget {
            self.late_ticks += 1;
        }
    }
}

/// Drives one [`GameState`] forward at a fixed rate until cancelled.
///
/// Only one `TickLoop` may run per process at a time: a second `run()`
/// call while one is already active logs an error and returns
/// immediately without touching the game state.
pub struct TickLoop {
    period: Duration,
    cancel: Arc<Notify>,
    stats: ServerStats,
}

impl TickLoop {
    /// Builds a loop targeting `tick_hz` ticks per second.
    #[must_use]
    pub fn new(tick_hz: u32) -> Self {
        Self {
            period: Duration::from_micros(1_000_000 / u64::from(tick_hz.max(1))),
            cancel: Arc::new(Notify::new()),
            stats: ServerStats::default(),
        }
    }

    /// A loop at the default 24 Hz rate.
    #[must_use]
    pub fn with_default_rate() -> Self {
        Self::new(DEFAULT_TICK_HZ)
    }

    /// A cancellation handle. Calling `notify_one` on it stops the loop
    /// after at most one more in-flight tick.
    #[must_use]
    pub fn cancel_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.cancel)
    }

    /// Runs until cancelled, calling `game.tick()` once per period.
    /// `MissedTickBehavior::Delay` means a consumer that falls behind
    /// coalesces the backlog instead of firing a burst of queued ticks.
    pub async fn run(mut self, game: Arc<GameState>) -> ServerStats {
        if RUNNING_INSTANCES.fetch_add(1, Ordering::SeqCst) > 0 {
            RUNNING_INSTANCES.fetch_sub(1, Ordering::SeqCst);
            error!("a tick loop is already running in this process, refusing to start a second");
            return self.stats;
        }

        info!(period_us = self.period.as_micros(), "tick loop starting");
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel.notified() => break,
                _ = interval.tick() => {
                    let start = Instant::now();
                    game.tick();
                    self.stats.record(start.elapsed(), self.period);
                    if self.stats.late_ticks > 0 && self.stats.late_ticks % 100 == 0 {
                        warn!(late_ticks = self.stats.late_ticks, "tick loop falling behind");
                    }
                }
            }
        }

        RUNNING_INSTANCES.fetch_sub(1, Ordering::SeqCst);
        info!(total_ticks = self.stats.total_ticks, "tick loop stopped");
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_rate_converts_to_a_period() {
        let tick_loop = TickLoop::new(24);
        assert_eq!(tick_loop.period, Duration::from_micros(1_000_000 / 24));
    }

    #[tokio::test]
    async fn cancel_handle_stops_the_loop_promptly() {
        let game = Arc::new(GameState::new(4));
        let tick_loop = TickLoop::new(1000);
        let cancel = tick_loop.cancel_handle();
        let handle = tokio::spawn(tick_loop.run(Arc::clone(&game)));
        cancel.notify_one();
        let stats = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("tick loop should stop promptly")
            .expect("tick loop task should not panic");
        assert!(stats.total_ticks < 1000);
    }
}
