//! TCP listener shared by the Wialon and EGTS protocols.
//!
//! Every accepted connection gets its own task. Bytes are buffered until a
//! complete frame is available, the frame is routed to its protocol codec,
//! and the codec's reply is written back before the next frame is read.

mod connection;
mod framing;


pub use framing::{Frame, FrameBuffer};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use self::connection::ConnectionLimits;
use crate::config::AppConfig;
use crate::egts;
use crate::error::{AppError, Result};
use crate::store::Store;
use crate::wialon::WialonCodec;

/// Routes frames to the codec of their protocol.
#[derive(Debug)]
pub struct Dispatcher<S> {
    store: Arc<S>,
    wialon: WialonCodec,
}

impl<S: Store> Dispatcher<S> {
    pub fn new(store: Arc<S>, wialon: WialonCodec) -> Self {
        Self { store, wialon }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one frame and return the bytes to send back, if any.
    ///
    /// `Err` means persistence failed; the frame must go unanswered.
    pub async fn dispatch(&self, frame: Frame, peer: SocketAddr) -> Result<Option<Vec<u8>>> {
        match frame {
            Frame::Text(line) => Ok(self
                .wialon
                .handle(&line, peer, self.store.as_ref())
                .await?
                .map(String::into_bytes)),
            Frame::Binary(bytes) => egts::handle_frame(&bytes, peer, self.store.as_ref()).await,
        }
    }
}

/// Bound listener ready to accept devices.
pub struct Server<S> {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<S>>,
    limits: ConnectionLimits,
}

impl<S: Store> Server<S> {
    pub async fn bind(config: &AppConfig, store: Arc<S>) -> Result<Self> {
        let listener = TcpListener::bind(config.server.bind_addr()).await?;
        let wialon = WialonCodec::new(config.protocol.wialon_version.clone());

        Ok(Self {
            listener,
            dispatcher: Arc::new(Dispatcher::new(store, wialon)),
            limits: ConnectionLimits::from(&config.server),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Accept connections until `shutdown` resolves, then stop open connections.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("Listening on {}", self.local_addr()?);
        tokio::pin!(shutdown);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, closing {} connections", connections.len());
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!("Accepted connection from {peer}");
                        let dispatcher = Arc::clone(&self.dispatcher);
                        connections.spawn(connection::serve(stream, peer, dispatcher, self.limits));
                    }
                    Err(e) => error!("Accept failed: {e}"),
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    report(joined);
                }
            }
        }

        connections.abort_all();
        while let Some(joined) = connections.join_next().await {
            if !matches!(&joined, Err(e) if e.is_cancelled()) {
                report(joined);
            }
        }
        Ok(())
    }
}

fn report(joined: std::result::Result<Result<()>, tokio::task::JoinError>) {
    match joined.map_err(|e| AppError::task(format!("Connection task join error: {e}"))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Connection ended with error: {e}"),
        Err(e) => error!("{e}"),
    }
}
