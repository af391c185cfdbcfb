//! Owns the set of active client sessions and fans out one broadcast
//! frame per tick to all of them, admitting and evicting sessions by IP
//! policy.
//!
//! Grounded on `oroboros_networking::server::InfernoServer`'s
//! `NetworkEvent`/`NetworkCommand` channel split, reworked from bounded
//! `crossbeam_channel` UDP datagrams to a `tokio::sync::broadcast`
//! fan-out over length-prefixed TCP frames — `broadcast`'s own
//! per-receiver lag counter gives each session exactly the "bounded
//! queue, drop oldest and warn" policy §4.9 asks for, for free.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Notify};
use tracing::{info, warn};

use crate::error::BrokerError;
use crate::session;

/// Per-session outbound queue depth. §4.9: "bounded (10 frames)".
pub const OUTBOUND_QUEUE_DEPTH: usize = 10;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying one connected session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Shared registry of admitted sessions, used for the one-session-per-IP
/// policy and for targeted eviction on reconnect.
struct Registry {
    by_ip: HashMap<IpAddr, SessionId>,
    close_signals: HashMap<SessionId, Arc<Notify>>,
}

impl Registry {
    fn new() -> Self {
        Self {
            by_ip: HashMap::new(),
            close_signals: HashMap::new(),
        }
    }
}

/// Fan-out broker: accepts connections on the control listener, admits
/// or evicts sessions by IP policy, and rebroadcasts every frame the
/// engine produces to all of them.
pub struct Broker {
    registry: Arc<Mutex<Registry>>,
    frame_tx: broadcast::Sender<Arc<[u8]>>,
    command_tx: crossbeam_channel::Sender<Vec<u8>>,
    shutdown: Arc<Notify>,
    one_client_per_ip: bool,
    trusted_ips: Arc<[IpAddr]>,
}

impl Broker {
    /// Builds a broker. `command_tx` forwards parsed-or-not command
    /// bytes from trusted sessions to the engine's inbound channel;
    /// `frame_rx` is the engine's per-tick broadcast source.
    #[must_use]
    pub fn new(
        command_tx: crossbeam_channel::Sender<Vec<u8>>,
        one_client_per_ip: bool,
        trusted_ips: Vec<IpAddr>,
    ) -> Self {
        let (frame_tx, _rx) = broadcast::channel(OUTBOUND_QUEUE_DEPTH);
        Self {
            registry: Arc::new(Mutex::new(Registry::new())),
            frame_tx,
            command_tx,
            shutdown: Arc::new(Notify::new()),
            one_client_per_ip,
            trusted_ips: trusted_ips.into(),
        }
    }

    /// A handle that, when notified, stops [`Self::serve`] after it
    /// finishes refusing new connections and closing open sessions.
    #[must_use]
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// A clone of the broadcast sender, so the read-only mirror listener
    /// can subscribe to the exact same frame stream control sessions get.
    #[must_use]
    pub fn frame_sender(&self) -> broadcast::Sender<Arc<[u8]>> {
        self.frame_tx.clone()
    }

    /// Spawns a background task that drains `frame_rx` and republishes
    /// every frame the engine produces to all subscribed sessions.
    pub fn spawn_frame_pump(&self, frame_rx: Receiver<Arc<[u8]>>) {
        let frame_tx = self.frame_tx.clone();
        std::thread::spawn(move || {
            for frame in frame_rx.iter() {
                // No subscribers yet is not an error; it just means no
                // client has connected.
                let _ = frame_tx.send(frame);
            }
        });
    }

    /// Accepts connections on `addr` until the shutdown handle fires.
    /// Each admitted connection gets its own session task.
    ///
    /// # Errors
    /// Returns [`BrokerError::BindFailed`] if the listener cannot bind;
    /// per §7 this is the one fatal broker-side error and is propagated
    /// to `main` rather than logged and swallowed.
    pub async fn serve(&self, addr: SocketAddr) -> Result<(), BrokerError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| BrokerError::BindFailed {
            what: "control",
            addr: addr.to_string(),
            source,
        })?;
        info!(%addr, "control listener bound");

        loop {
            tokio::select! {
                () = self.shutdown.notified() => {
                    info!("broker shutting down, refusing new connections");
                    self.close_all_sessions();
                    return Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.admit(stream, peer),
                        Err(err) => warn!(error = %err, "accept failed, continuing"),
                    }
                }
            }
        }
    }

    fn admit(&self, stream: TcpStream, peer: SocketAddr) {
        let id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        let trusted = self.trusted_ips.iter().any(|ip| *ip == peer.ip());
        let close = Arc::new(Notify::new());

        if self.one_client_per_ip {
            let mut registry = self.registry.lock();
            if let Some(prior) = registry.by_ip.insert(peer.ip(), id) {
                if let Some(prior_close) = registry.close_signals.remove(&prior) {
                    info!(ip = %peer.ip(), "reconnect from same IP, closing prior session");
                    prior_close.notify_one();
                }
            }
            registry.close_signals.insert(id, Arc::clone(&close));
        } else {
            self.registry.lock().close_signals.insert(id, Arc::clone(&close));
        }

        let frame_rx = self.frame_tx.subscribe();
        let command_tx = self.command_tx.clone();
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            session::run(stream, peer, id, trusted, frame_rx, command_tx, close).await;
            let mut reg = registry.lock();
            reg.close_signals.remove(&id);
            reg.by_ip.retain(|_, v| *v != id);
        });
    }

    fn close_all_sessions(&self) {
        let registry = self.registry.lock();
        for signal in registry.close_signals.values() {
            signal.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_distinct() {
        let a = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        let b = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn broker_binds_and_shuts_down_cleanly() {
        let (command_tx, _command_rx) = crossbeam_channel::unbounded();
        let broker = Broker::new(command_tx, true, vec![]);
        let shutdown = broker.shutdown_handle();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        // Port 0 means "any free port"; bind, then fire shutdown right
        // away so `serve` returns without ever accepting a connection.
        let listener_probe = TcpListener::bind(addr).await.unwrap();
        let bound_addr = listener_probe.local_addr().unwrap();
        drop(listener_probe);

        shutdown.notify_one();
        let result = broker.serve(bound_addr).await;
        assert!(result.is_ok());
    }
}
