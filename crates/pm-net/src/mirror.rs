//! The optional mirror socket: a read-only listener re-emitting the
//! identical snapshot stream for hardware clients, per §6. Never reads
//! a byte from its peers, even from a trusted IP.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Notify};
use tracing::{info, warn};

use crate::error::BrokerError;
use crate::session::write_frame;

/// Accepts connections on `addr` and streams every broadcast frame to
/// each one, until `shutdown` fires. No inbound bytes are ever read.
///
/// # Errors
/// Returns [`BrokerError::BindFailed`] if the listener cannot bind.
pub async fn serve(
    addr: SocketAddr,
    frame_tx: broadcast::Sender<Arc<[u8]>>,
    shutdown: Arc<Notify>,
) -> Result<(), BrokerError> {
    let listener = TcpListener::bind(addr).await.map_err(|source| BrokerError::BindFailed {
        what: "mirror",
        addr: addr.to_string(),
        source,
    })?;
    info!(%addr, "mirror listener bound");

    loop {
        tokio::select! {
            () = shutdown.notified() => {
                info!("mirror listener shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let rx = frame_tx.subscribe();
                        tokio::spawn(run_one(stream, peer, rx));
                    }
                    Err(err) => warn!(error = %err, "mirror accept failed, continuing"),
                }
            }
        }
    }
}

async fn run_one(mut stream: TcpStream, peer: SocketAddr, mut frames: broadcast::Receiver<Arc<[u8]>>) {
    info!(%peer, "mirror client admitted");
    loop {
        match frames.recv().await {
            Ok(frame) => {
                if write_frame(&mut stream, &frame).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(%peer, skipped, "mirror client fell behind, dropping frames");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    info!(%peer, "mirror client closed");
}
