//! EGTS transport header validation and response packet building.

use super::types::{
    FLAGS_OFFSET, FRAME_DATA_LEN_OFFSET, FrameHeader, HEADER_LEN, HEADER_LEN_OFFSET, PACKET_ID_OFFSET,
    PAYLOAD_CRC_LEN, PROTOCOL_VERSION, PT_RESPONSE, ROUTED_HEADER_LEN, ResultCode, TTL_OFFSET,
};
use crate::checksum::{CrcAlgorithm, checksum, crc8};

/// Header check outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HeaderCheck {
    /// Routed frame with TTL left.
    Relay { packet_id: u16 },
    /// Stop here and answer with `result`.
    Terminal { packet_id: u16, result: ResultCode },
    /// Header valid and a payload follows.
    Payload(FrameHeader),
}

/// Packet id from fixed offsets, 0 when the buffer is too short to hold one.
pub(crate) fn packet_id_hint(buf: &[u8]) -> u16 {
    match buf.get(PACKET_ID_OFFSET..PACKET_ID_OFFSET + 2) {
        Some(b) => u16::from_le_bytes([b[0], b[1]]),
        None => 0,
    }
}

/// Payload checksum (SFRCS).
pub fn payload_checksum(data: &[u8]) -> u16 {
    checksum(data, CrcAlgorithm::Crc16CcittFalse)
}

/// Validate the transport header.
///
/// Check order: version and prefix, header length, header checksum, routing
/// and TTL, empty payload, encryption, compression.
pub(crate) fn check_header(buf: &[u8]) -> HeaderCheck {
    let packet_id = packet_id_hint(buf);
    let terminal = |result| HeaderCheck::Terminal { packet_id, result };

    if buf.len() <= HEADER_LEN_OFFSET {
        return terminal(ResultCode::IncorrectHeaderForm);
    }

    let flags = buf[FLAGS_OFFSET];
    if buf[0] != PROTOCOL_VERSION || flags >> 6 != 0 {
        return terminal(ResultCode::UnsupportedProtocol);
    }

    let header_length = buf[HEADER_LEN_OFFSET];
    if header_length != HEADER_LEN && header_length != ROUTED_HEADER_LEN {
        return terminal(ResultCode::IncorrectHeaderForm);
    }
    let hl = usize::from(header_length);
    if buf.len() < hl {
        return terminal(ResultCode::IncorrectHeaderForm);
    }

    let header_checksum = buf[hl - 1];
    if crc8(&buf[..hl - 1]) != header_checksum {
        return terminal(ResultCode::HeaderCrcError);
    }

    let is_routed = flags & 0x20 != 0;
    let time_to_live = (header_length == ROUTED_HEADER_LEN).then(|| buf[TTL_OFFSET]);
    if is_routed {
        match time_to_live {
            Some(0) => return terminal(ResultCode::TtlExpired),
            Some(_) => return HeaderCheck::Relay { packet_id },
            None => return terminal(ResultCode::IncorrectHeaderForm),
        }
    }

    let header = FrameHeader {
        protocol_version: buf[0],
        security_key_id: buf[1],
        prefix: flags >> 6,
        is_routed,
        encryption: (flags >> 3) & 0x03,
        is_compressed: flags & 0x04 != 0,
        priority: flags & 0x03,
        header_length,
        header_encoding: buf[4],
        frame_data_length: u16::from_le_bytes([buf[FRAME_DATA_LEN_OFFSET], buf[FRAME_DATA_LEN_OFFSET + 1]]),
        packet_id,
        packet_type: buf[9],
        time_to_live,
        header_checksum,
    };

    if header.frame_data_length == 0 {
        return terminal(ResultCode::Ok);
    }
    if header.encryption != 0 {
        return terminal(ResultCode::DecryptError);
    }
    if header.is_compressed {
        return terminal(ResultCode::IncorrectDataForm);
    }

    HeaderCheck::Payload(header)
}

/// Verify the SFRCS following the payload and return the payload slice.
pub(crate) fn check_payload<'a>(buf: &'a [u8], header: &FrameHeader) -> Result<&'a [u8], ResultCode> {
    let (start, end) = (header.payload_start(), header.payload_end());
    let crc_bytes = buf
        .get(end..end + PAYLOAD_CRC_LEN)
        .ok_or(ResultCode::IncorrectDataForm)?;
    let payload = &buf[start..end];

    if payload_checksum(payload) != u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]) {
        return Err(ResultCode::DataCrcError);
    }
    Ok(payload)
}

/// Build an EGTS_PT_RESPONSE packet acknowledging `request_id`.
///
/// Layout: PRV SKID FLAGS HL HE | FDL(2) | PID(2) = request_id + 1 | PT | HCS |
/// RPID(2) = request_id | PR | SFRCS(2).
pub fn build_response(request_id: u16, result: ResultCode) -> Vec<u8> {
    let body_len: u16 = 3;
    let mut packet = Vec::with_capacity(usize::from(HEADER_LEN) + usize::from(body_len) + PAYLOAD_CRC_LEN);

    packet.push(PROTOCOL_VERSION);
    packet.push(0x00); // security key id
    packet.push(0x00); // flags
    packet.push(HEADER_LEN);
    packet.push(0x00); // header encoding
    packet.extend_from_slice(&body_len.to_le_bytes());
    packet.extend_from_slice(&request_id.wrapping_add(1).to_le_bytes());
    packet.push(PT_RESPONSE);
    packet.push(crc8(&packet));

    let body_start = packet.len();
    packet.extend_from_slice(&request_id.to_le_bytes());
    packet.push(result.as_u8());
    let sfrcs = payload_checksum(&packet[body_start..]);
    packet.extend_from_slice(&sfrcs.to_le_bytes());

    packet
}
