//! Per-frame EGTS processing: decode, persist, acknowledge.

use std::net::SocketAddr;

use tracing::{debug, warn};

use super::parser::parse_payload;
use super::protocol::{HeaderCheck, build_response, check_header, check_payload};
use super::types::{Decoded, ResultCode};
use crate::error::Result;
use crate::store::Store;

/// Decode one binary frame without touching storage.
pub fn decode_frame(buf: &[u8]) -> Decoded {
    let header = match check_header(buf) {
        HeaderCheck::Payload(header) => header,
        HeaderCheck::Relay { packet_id } => return Decoded::Relay { packet_id },
        HeaderCheck::Terminal { packet_id, result } => return Decoded::rejected(packet_id, result),
    };

    let parsed = check_payload(buf, &header).and_then(|payload| parse_payload(payload, header.packet_type));
    match parsed {
        Ok(positions) => Decoded::Reply {
            packet_id: header.packet_id,
            result: ResultCode::Ok,
            positions,
        },
        Err(result) => Decoded::rejected(header.packet_id, result),
    }
}

/// Process one binary frame and build the response packet.
///
/// Returns `None` for routed frames that still have TTL left. Positions are
/// stored only when the whole frame decoded; an `Err` is a persistence
/// failure and no response should be sent for it.
pub async fn handle_frame<S: Store>(buf: &[u8], peer: SocketAddr, store: &S) -> Result<Option<Vec<u8>>> {
    let (packet_id, result, positions) = match decode_frame(buf) {
        Decoded::Relay { packet_id } => {
            debug!("EGTS packet {packet_id} from {peer} is routed elsewhere, not answered");
            return Ok(None);
        }
        Decoded::Reply {
            packet_id,
            result,
            positions,
        } => (packet_id, result, positions),
    };

    if result != ResultCode::Ok {
        warn!("EGTS packet {packet_id} from {peer} rejected: {result}");
    }

    for position in &positions {
        store.save_binary_position(position).await?;
    }
    if !positions.is_empty() {
        debug!("Stored {} EGTS positions from {peer}", positions.len());
    }

    Ok(Some(build_response(packet_id, result)))
}
