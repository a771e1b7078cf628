//! EGTS protocol types and constants.

use std::fmt;

use crate::models::BinaryPosition;

/// Only transport protocol version accepted.
pub const PROTOCOL_VERSION: u8 = 1;

// Header lengths: plain and with routing fields.
pub const HEADER_LEN: u8 = 11;
pub const ROUTED_HEADER_LEN: u8 = 16;

// Fixed header offsets
pub(crate) const FLAGS_OFFSET: usize = 2;
pub(crate) const HEADER_LEN_OFFSET: usize = 3;
pub(crate) const FRAME_DATA_LEN_OFFSET: usize = 5;
pub(crate) const PACKET_ID_OFFSET: usize = 7;
pub(crate) const TTL_OFFSET: usize = 14;

/// Bytes of the trailing payload checksum (SFRCS).
pub const PAYLOAD_CRC_LEN: usize = 2;

// Packet types
pub const PT_RESPONSE: u8 = 0;
pub const PT_APPDATA: u8 = 1;
pub const PT_SIGNED_APPDATA: u8 = 2;

// Record flag bits (RFL)
pub(crate) const RFL_OBJECT_ID: u8 = 0x01;
pub(crate) const RFL_EVENT_ID: u8 = 0x02;
pub(crate) const RFL_TIME: u8 = 0x04;

// Subrecord types
pub const SR_RECORD_RESPONSE: u8 = 0;
pub const SR_POS_DATA: u8 = 16;

// EGTS_SR_POS_DATA flag bits (FLG)
pub(crate) const POS_FLAG_SOUTH: u8 = 0x20;
pub(crate) const POS_FLAG_WEST: u8 = 0x40;

/// Minimum EGTS_SR_POS_DATA length: NTM, LAT, LONG, FLG, SPD, DIR.
pub(crate) const POS_DATA_MIN_LEN: usize = 16;

/// Navigation time counts seconds from 2010-01-01 00:00:00 UTC.
pub const EPOCH_OFFSET: i64 = 1_262_304_000;

/// Processing result codes (EGTS_PC_*).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResultCode {
    Ok = 0,
    UnsupportedProtocol = 128,
    DecryptError = 129,
    IncorrectHeaderForm = 131,
    IncorrectDataForm = 132,
    HeaderCrcError = 137,
    DataCrcError = 138,
    TtlExpired = 144,
}

impl ResultCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "EGTS_PC_OK",
            Self::UnsupportedProtocol => "EGTS_PC_UNS_PROTOCOL",
            Self::DecryptError => "EGTS_PC_DECRYPT_ERROR",
            Self::IncorrectHeaderForm => "EGTS_PC_INC_HEADERFORM",
            Self::IncorrectDataForm => "EGTS_PC_INC_DATAFORM",
            Self::HeaderCrcError => "EGTS_PC_HEADERCRC_ERROR",
            Self::DataCrcError => "EGTS_PC_DATACRC_ERROR",
            Self::TtlExpired => "EGTS_PC_TTLEXPIRED",
        };
        write!(f, "{name} ({})", self.as_u8())
    }
}

/// Transport header of a frame that passed version, length and HCS checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub protocol_version: u8,
    pub security_key_id: u8,
    /// PRF bits; always 0 for accepted frames.
    pub prefix: u8,
    pub is_routed: bool,
    /// ENA bits; non-zero means the payload is encrypted.
    pub encryption: u8,
    pub is_compressed: bool,
    pub priority: u8,
    pub header_length: u8,
    pub header_encoding: u8,
    pub frame_data_length: u16,
    pub packet_id: u16,
    pub packet_type: u8,
    /// Present only on routed frames.
    pub time_to_live: Option<u8>,
    pub header_checksum: u8,
}

impl FrameHeader {
    /// Offset of the first payload byte.
    pub fn payload_start(&self) -> usize {
        usize::from(self.header_length)
    }

    /// Offset one past the last payload byte.
    pub fn payload_end(&self) -> usize {
        self.payload_start() + usize::from(self.frame_data_length)
    }
}

/// Result of decoding one binary frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Routed frame with TTL left: meant for another node, nothing to answer.
    Relay { packet_id: u16 },
    /// Frame processed; `positions` is empty unless `result` is OK.
    Reply {
        packet_id: u16,
        result: ResultCode,
        positions: Vec<BinaryPosition>,
    },
}

impl Decoded {
    pub(crate) fn rejected(packet_id: u16, result: ResultCode) -> Self {
        Self::Reply {
            packet_id,
            result,
            positions: Vec::new(),
        }
    }
}
