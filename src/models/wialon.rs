//! Wialon DTOs: login, short and extended position records.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Login frame contents. Establishes the device identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRecord {
    pub imei: String,
    pub protocol_version: String,
    pub password: Option<String>,
    pub checksum: u16,
}

/// Short position frame (`#SD#`), attributed to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortPosition {
    pub imei: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub latitude: f64,
    pub latitude_hemisphere: String,
    pub longitude: f64,
    pub longitude_hemisphere: String,
    pub speed: Option<i32>,
    pub course: Option<i32>,
    pub altitude: Option<i32>,
    pub satellites: Option<i32>,
    pub checksum: u16,
}

/// Extended position frame (`#D#`): every short field plus I/O and extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedPosition {
    #[serde(flatten)]
    pub position: ShortPosition,
    pub hdop: Option<f64>,
    pub inputs: Option<i32>,
    pub outputs: Option<i32>,
    pub adc: Option<String>,
    pub ibutton: Option<String>,
    pub params: Option<String>,
}

/// A validated position report of either frame type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionReport {
    Short(ShortPosition),
    Extended(ExtendedPosition),
}
