//! One client's TCP session: writes length-prefixed snapshot frames as
//! they arrive on the broadcast channel, and — for trusted IPs only —
//! reads self-delimiting inbound command frames and forwards them to
//! the engine.

use std::net::SocketAddr;
use std::sync::Arc;

use crossbeam_channel::Sender as CrossbeamSender;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Notify};
use tracing::{debug, info, warn};

use crate::broker::SessionId;

/// Runs one session to completion: until the peer disconnects, a
/// read/write error occurs, or `close` fires (forced eviction on
/// reconnect, or broker shutdown).
pub async fn run(
    stream: TcpStream,
    peer: SocketAddr,
    id: SessionId,
    trusted: bool,
    mut frames: broadcast::Receiver<Arc<[u8]>>,
    commands: CrossbeamSender<Vec<u8>>,
    close: Arc<Notify>,
) {
    info!(%peer, ?id, trusted, "session admitted");
    let (mut read_half, mut write_half) = stream.into_split();

    let reader = async {
        loop {
            match read_command_frame(&mut read_half).await {
                Ok(Some(frame)) => {
                    if trusted {
                        if commands.send(frame).is_err() {
                            warn!(%peer, "engine command channel closed, stopping reads");
                            break;
                        }
                    }
                    // Untrusted sessions: read path is inert by design,
                    // the bytes are simply discarded after framing.
                }
                Ok(None) => break,
                Err(err) => {
                    debug!(%peer, error = %err, "session read error, closing");
                    break;
                }
            }
        }
    };

    let writer = async {
        loop {
            match frames.recv().await {
                Ok(frame) => {
                    if let Err(err) = write_frame(&mut write_half, &frame).await {
                        debug!(%peer, error = %err, "session write error, closing");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(%peer, skipped, "session fell behind, dropping frames");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    tokio::select! {
        () = reader => {}
        () = writer => {}
        () = close.notified() => {}
    }
    info!(%peer, ?id, "session closed");
}

/// Reads one inbound command frame. A frame is one byte unless that
/// byte is `'x'`, in which case it's three bytes total — matching
/// §4.8's self-delimiting framing with no length prefix. `Ok(None)`
/// means the peer closed the connection cleanly.
async fn read_command_frame(
    reader: &mut (impl AsyncReadExt + Unpin),
) -> std::io::Result<Option<Vec<u8>>> {
    let mut opcode = [0u8; 1];
    match reader.read_exact(&mut opcode).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }

    if opcode[0] == b'x' {
        let mut rest = [0u8; 2];
        reader.read_exact(&mut rest).await?;
        Ok(Some(vec![opcode[0], rest[0], rest[1]]))
    } else {
        Ok(Some(vec![opcode[0]]))
    }
}

/// Writes one outbound snapshot frame with its `u16` big-endian length
/// prefix, per §6. Shared with the mirror listener, which uses the same
/// framing for its read-only stream.
pub(crate) async fn write_frame(
    writer: &mut (impl AsyncWriteExt + Unpin),
    frame: &[u8],
) -> std::io::Result<()> {
    let len = u16::try_from(frame.len()).unwrap_or(u16::MAX);
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(frame).await
}
