//! Per-connection read / dispatch / reply loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::Dispatcher;
use super::framing::FrameBuffer;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::store::Store;

/// Socket settings copied out of [`ServerConfig`] for each connection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConnectionLimits {
    pub buffer_size: usize,
    pub max_frame_bytes: usize,
    pub idle_timeout: Option<Duration>,
}

impl From<&ServerConfig> for ConnectionLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            buffer_size: config.buffer_size,
            max_frame_bytes: config.max_frame_bytes,
            idle_timeout: config.idle_timeout(),
        }
    }
}

/// Serve one device until it disconnects, goes idle, or a socket error occurs.
///
/// Frames are handled strictly in arrival order and each reply is written
/// before the next frame is processed.
pub(crate) async fn serve<S: Store>(
    mut stream: TcpStream,
    peer: SocketAddr,
    dispatcher: Arc<Dispatcher<S>>,
    limits: ConnectionLimits,
) -> Result<()> {
    let mut read_buf = vec![0u8; limits.buffer_size];
    let mut frames = FrameBuffer::new(limits.max_frame_bytes);

    'conn: loop {
        let read = match limits.idle_timeout {
            Some(idle) => match timeout(idle, stream.read(&mut read_buf)).await {
                Ok(read) => read,
                Err(_) => {
                    info!("Closing idle connection from {peer}");
                    break;
                }
            },
            None => stream.read(&mut read_buf).await,
        };

        let n = read?;
        if n == 0 {
            info!("Connection from {peer} closed");
            break;
        }
        debug!("RX {n} bytes from {peer}");
        frames.extend(&read_buf[..n]);

        while let Some(frame) = frames.next_frame() {
            match dispatcher.dispatch(frame, peer).await {
                Ok(Some(reply)) => {
                    if let Err(e) = stream.write_all(&reply).await {
                        warn!("Write to {peer} failed: {e}");
                        break 'conn;
                    }
                }
                Ok(None) => {}
                Err(e) => error!("Frame from {peer} not persisted, no reply sent: {e}"),
            }
        }

        if frames.overflowed() {
            let dropped = frames.clear();
            warn!("Discarded {dropped} buffered bytes from {peer}: no complete frame within limit");
        }
    }

    Ok(())
}
