//! Per-frame Wialon processing: validate, attribute, persist, reply.

use std::net::SocketAddr;

use tracing::{debug, info, warn};

use super::parser::{login_check, parse_frame, position_check};
use super::types::{FrameKind, ReplyCode};
use crate::error::Result;
use crate::models::{ClientBinding, PositionReport};
use crate::store::Store;

/// Text protocol codec configured with the expected login version.
#[derive(Debug, Clone)]
pub struct WialonCodec {
    expected_version: String,
}

impl WialonCodec {
    pub fn new(expected_version: impl Into<String>) -> Self {
        Self {
            expected_version: expected_version.into(),
        }
    }

    /// Process one frame (terminator already stripped).
    ///
    /// Returns the reply line, or `None` for frame types this server does
    /// not answer. Errors are persistence failures only.
    pub async fn handle<S: Store>(&self, line: &str, peer: SocketAddr, store: &S) -> Result<Option<String>> {
        let Some(frame) = parse_frame(line) else {
            warn!("Unknown Wialon frame from {peer}: {line:?}");
            return Ok(None);
        };

        let code = match frame.kind {
            FrameKind::Login => self.handle_login(frame.body, peer, store).await?,
            kind => handle_position(frame.body, kind, peer, store).await?,
        };

        Ok(Some(code.reply(frame.kind)))
    }

    async fn handle_login<S: Store>(&self, body: &str, peer: SocketAddr, store: &S) -> Result<ReplyCode> {
        let record = match login_check(body, &self.expected_version) {
            Ok(record) => record,
            Err(code) => {
                warn!("Login from {peer} rejected with code {code}");
                return Ok(code);
            }
        };

        store.save_login(&record).await?;
        store
            .save_client_binding(&ClientBinding {
                ip: peer.ip().to_string(),
                port: peer.port(),
                imei: record.imei.clone(),
            })
            .await?;

        info!("Device {} logged in from {peer}", record.imei);
        Ok(ReplyCode::Accepted)
    }
}

async fn handle_position<S: Store>(body: &str, kind: FrameKind, peer: SocketAddr, store: &S) -> Result<ReplyCode> {
    let position = match position_check(body, kind) {
        Ok(position) => position,
        Err(code) => {
            warn!("{kind:?} frame from {peer} rejected with code {code}");
            return Ok(code);
        }
    };

    let Some(imei) = store.lookup_imei_by_ip(&peer.ip().to_string()).await? else {
        warn!("{kind:?} frame from {peer} without a login binding");
        return Ok(ReplyCode::Unbound);
    };

    match position.attribute(&imei) {
        PositionReport::Short(record) => store.save_short_position(&record).await?,
        PositionReport::Extended(record) => store.save_extended_position(&record).await?,
    }

    debug!("Stored {kind:?} position for {imei}");
    Ok(ReplyCode::Accepted)
}
