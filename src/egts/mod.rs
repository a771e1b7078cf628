//! EGTS binary transport protocol (GOST R 54619).
//!
//! A frame is an 11- or 16-byte transport header protected by CRC-8, followed
//! by an optional payload protected by CRC-16 CCITT. Payloads carry service
//! records whose EGTS_SR_POS_DATA subrecords become [`BinaryPosition`]s.
//!
//! [`BinaryPosition`]: crate::models::BinaryPosition

mod handler;
mod parser;
mod protocol;
mod reader;
mod types;


pub use handler::{decode_frame, handle_frame};
pub use protocol::{build_response, payload_checksum};
pub use types::{
    Decoded, EPOCH_OFFSET, FrameHeader, HEADER_LEN, PAYLOAD_CRC_LEN, PROTOCOL_VERSION, PT_APPDATA, PT_RESPONSE,
    PT_SIGNED_APPDATA, ROUTED_HEADER_LEN, ResultCode, SR_POS_DATA, SR_RECORD_RESPONSE,
};
