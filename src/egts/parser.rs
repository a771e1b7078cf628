//! Service record and subrecord parsing for EGTS payloads.

use chrono::DateTime;
use tracing::{debug, warn};

use super::reader::Cursor;
use super::types::{
    EPOCH_OFFSET, POS_DATA_MIN_LEN, POS_FLAG_SOUTH, POS_FLAG_WEST, PT_APPDATA, PT_RESPONSE, PT_SIGNED_APPDATA,
    RFL_EVENT_ID, RFL_OBJECT_ID, RFL_TIME, ResultCode, SR_POS_DATA, SR_RECORD_RESPONSE,
};
use crate::models::BinaryPosition;
use crate::wialon::validators::round7;

/// Decode every position carried by a payload of the given packet type.
///
/// Any malformed record fails the whole payload so that nothing of a broken
/// frame gets persisted.
pub(crate) fn parse_payload(payload: &[u8], packet_type: u8) -> Result<Vec<BinaryPosition>, ResultCode> {
    let mut cursor = Cursor::new(payload);
    match packet_type {
        PT_APPDATA => {}
        PT_SIGNED_APPDATA => {
            let signature_len = cursor.read_u16()?;
            cursor.skip(usize::from(signature_len))?;
        }
        PT_RESPONSE => return Ok(Vec::new()),
        other => {
            warn!("Unsupported EGTS packet type {other}");
            return Err(ResultCode::UnsupportedProtocol);
        }
    }

    let mut positions = Vec::new();
    while cursor.remaining() > 0 {
        parse_record(&mut cursor, &mut positions)?;
    }
    Ok(positions)
}

/// Parse one service data record (SDR).
fn parse_record(cursor: &mut Cursor<'_>, positions: &mut Vec<BinaryPosition>) -> Result<(), ResultCode> {
    let record_len = cursor.read_u16()?;
    cursor.skip(2)?; // RN
    let flags = cursor.read_u8()?;

    let object_id = if flags & RFL_OBJECT_ID != 0 {
        Some(cursor.read_u32()?)
    } else {
        None
    };
    if flags & RFL_EVENT_ID != 0 {
        cursor.skip(4)?;
    }
    if flags & RFL_TIME != 0 {
        cursor.skip(4)?;
    }
    cursor.skip(2)?; // SST, RST

    let record_data = cursor.take(usize::from(record_len))?;
    match object_id {
        Some(oid) => parse_subrecords(record_data, oid, positions),
        None => {
            debug!("EGTS record without object id, {} bytes skipped", record_data.len());
            Ok(())
        }
    }
}

fn parse_subrecords(data: &[u8], object_id: u32, positions: &mut Vec<BinaryPosition>) -> Result<(), ResultCode> {
    let mut cursor = Cursor::new(data);
    while cursor.remaining() > 0 {
        let subrecord_type = cursor.read_u8()?;
        let len = cursor.read_u16()?;
        let body = cursor.take(usize::from(len))?;

        match subrecord_type {
            SR_RECORD_RESPONSE => break,
            SR_POS_DATA => positions.push(decode_position(body, object_id)?),
            other => warn!("Unknown EGTS subrecord type {other} ({len} bytes) for object {object_id}"),
        }
    }
    Ok(())
}

/// Decode an EGTS_SR_POS_DATA body.
pub(crate) fn decode_position(body: &[u8], object_id: u32) -> Result<BinaryPosition, ResultCode> {
    if body.len() < POS_DATA_MIN_LEN {
        return Err(ResultCode::IncorrectDataForm);
    }
    let mut cursor = Cursor::new(body);
    let nav_time = cursor.read_u32()?;
    let raw_lat = cursor.read_u32()?;
    let raw_lon = cursor.read_u32()?;
    let flags = cursor.read_u8()?;
    let spd = cursor.read_u16()?;
    let dir = cursor.read_u8()?;

    let timestamp =
        DateTime::from_timestamp(i64::from(nav_time) + EPOCH_OFFSET, 0).ok_or(ResultCode::IncorrectDataForm)?;

    let mut latitude = f64::from(raw_lat) * 90.0 / f64::from(u32::MAX);
    let mut longitude = f64::from(raw_lon) * 180.0 / f64::from(u32::MAX);
    if flags & POS_FLAG_SOUTH != 0 {
        latitude = -latitude;
    }
    if flags & POS_FLAG_WEST != 0 {
        longitude = -longitude;
    }

    // SPD: bits 0-13 speed in 0.1 km/h, bit 15 is the high bit of DIR.
    let speed = f64::from(spd & 0x3FFF) / 10.0;
    let course = u16::from(dir) | ((spd >> 15) & 0x01) << 8;

    Ok(BinaryPosition {
        object_id,
        date: timestamp.date_naive(),
        time: timestamp.time(),
        latitude: round7(latitude),
        longitude: round7(longitude),
        speed,
        course,
    })
}
