//! EGTS DTOs.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Position decoded from an EGTS_SR_POS_DATA subrecord.
///
/// Carries no checksum of its own; the frame checksum covers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryPosition {
    pub object_id: u32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub latitude: f64,
    pub longitude: f64,
    /// km/h, 0.1 resolution.
    pub speed: f64,
    /// Degrees, 0-359.
    pub course: u16,
}
