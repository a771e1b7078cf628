//! Wialon frame kinds, reply codes and field layout.

use std::fmt;

use crate::checksum::CrcAlgorithm;

/// Line terminator separating frames on the wire.
pub const FRAME_SEPARATOR: &str = "\r\n";

/// Checksum used for every Wialon frame.
pub(crate) const FRAME_CRC: CrcAlgorithm = CrcAlgorithm::Crc16;

/// Marker for an absent value in position fields.
pub(crate) const NOT_AVAILABLE: &str = "NA";

/// Longest accepted parameter name.
pub(crate) const MAX_PARAM_NAME_LEN: usize = 40;

/// Frame types handled by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `#L#`
    Login,
    /// `#SD#`
    Short,
    /// `#D#`
    Extended,
}

impl FrameKind {
    /// Match the type marker between the leading `#` pair, ignoring case.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.to_ascii_uppercase().as_str() {
            "L" => Some(Self::Login),
            "SD" => Some(Self::Short),
            "D" => Some(Self::Extended),
            _ => None,
        }
    }

    /// Reply prefix, e.g. `#AL#`.
    pub fn reply_marker(self) -> &'static str {
        match self {
            Self::Login => "#AL#",
            Self::Short => "#ASD#",
            Self::Extended => "#AD#",
        }
    }

    /// Number of `;`-separated fields, checksum included.
    pub fn field_count(self) -> usize {
        match self {
            Self::Login => 4,
            Self::Short => 11,
            Self::Extended => 17,
        }
    }

    /// Ordered validators for position frames. Empty for login.
    pub(crate) fn pipeline(self) -> &'static [Field] {
        match self {
            Self::Login => &[],
            Self::Short => SHORT_PIPELINE,
            Self::Extended => EXTENDED_PIPELINE,
        }
    }

    /// Code returned when the frame checksum does not match.
    pub fn checksum_error(self) -> ReplyCode {
        match self {
            Self::Login => ReplyCode::LoginChecksum,
            Self::Short => ReplyCode::ShortChecksum,
            Self::Extended => ReplyCode::ExtendedChecksum,
        }
    }
}

/// Validation failure classes, one per validator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    DateTime,
    Coord,
    SpeedCourseAlt,
    SatsHdop,
    InputsOutputs,
    Adc,
    Params,
    ParamsLenLimit,
    ParamsSpace,
}

impl FieldError {
    /// Wire code sent back to the device.
    pub fn code(self) -> &'static str {
        match self {
            Self::DateTime => "0",
            Self::Coord => "10",
            Self::SpeedCourseAlt => "11",
            Self::SatsHdop => "12",
            Self::InputsOutputs => "13",
            Self::Adc => "14",
            Self::Params => "15",
            Self::ParamsLenLimit => "15.1",
            Self::ParamsSpace => "15.2",
        }
    }
}

/// Status code carried in a `#A..#` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCode {
    /// Frame accepted.
    Accepted,
    /// Login structure or protocol version rejected.
    LoginRejected,
    /// Login checksum mismatch.
    LoginChecksum,
    /// Wrong field count or unparseable structure.
    Malformed,
    /// No login binding for the sending address.
    Unbound,
    /// A field failed validation.
    Field(FieldError),
    /// Short frame checksum mismatch.
    ShortChecksum,
    /// Extended frame checksum mismatch.
    ExtendedChecksum,
}

impl ReplyCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "1",
            Self::LoginRejected => "0",
            Self::LoginChecksum => "10",
            Self::Malformed | Self::Unbound => "-1",
            Self::Field(e) => e.code(),
            Self::ShortChecksum => "13",
            Self::ExtendedChecksum => "16",
        }
    }

    /// Encode the full reply line for a frame of `kind`.
    pub fn reply(self, kind: FrameKind) -> String {
        format!("{}{}{}", kind.reply_marker(), self.as_str(), FRAME_SEPARATOR)
    }
}

impl From<FieldError> for ReplyCode {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated position fields, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Date,
    Time,
    Latitude,
    Longitude,
    Altitude,
    Speed,
    Course,
    Satellites,
    Hdop,
    Inputs,
    Outputs,
    Adc,
    Params,
}

pub(crate) const SHORT_PIPELINE: &[Field] = &[
    Field::Date,
    Field::Time,
    Field::Latitude,
    Field::Longitude,
    Field::Altitude,
    Field::Speed,
    Field::Course,
    Field::Satellites,
];

pub(crate) const EXTENDED_PIPELINE: &[Field] = &[
    Field::Date,
    Field::Time,
    Field::Latitude,
    Field::Longitude,
    Field::Altitude,
    Field::Speed,
    Field::Course,
    Field::Satellites,
    Field::Hdop,
    Field::Inputs,
    Field::Outputs,
    Field::Adc,
    Field::Params,
];

// Token positions inside a position frame. Short frames stop after SATS.
pub(crate) const DATE: usize = 0;
pub(crate) const TIME: usize = 1;
pub(crate) const LAT: usize = 2;
pub(crate) const LAT_SIGN: usize = 3;
pub(crate) const LON: usize = 4;
pub(crate) const LON_SIGN: usize = 5;
pub(crate) const SPEED: usize = 6;
pub(crate) const COURSE: usize = 7;
pub(crate) const ALT: usize = 8;
pub(crate) const SATS: usize = 9;
pub(crate) const HDOP: usize = 10;
pub(crate) const INPUTS: usize = 11;
pub(crate) const OUTPUTS: usize = 12;
pub(crate) const ADC: usize = 13;
pub(crate) const IBUTTON: usize = 14;
pub(crate) const PARAMS: usize = 15;
