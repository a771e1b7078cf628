//! Wialon frame parsing and validation.

use chrono::{NaiveDate, NaiveTime};

use super::types::{
    ADC, ALT, COURSE, DATE, FRAME_CRC, Field, FrameKind, HDOP, IBUTTON, INPUTS, LAT, LAT_SIGN, LON, LON_SIGN,
    NOT_AVAILABLE, OUTPUTS, PARAMS, ReplyCode, SATS, SPEED, TIME,
};
use super::validators::{
    Axis, NumericField, Validation, check_adc, check_coord, check_date, check_hdop, check_number, check_params,
    check_time,
};
use crate::checksum::checksum;
use crate::models::{ExtendedPosition, LoginRecord, PositionReport, ShortPosition};

/// A frame split into its type and `;`-separated body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    pub kind: FrameKind,
    pub body: &'a str,
}

/// Split `#TYPE#body` into kind and body.
///
/// Returns `None` for lines that are not Wialon frames or carry a type this
/// server does not handle.
pub fn parse_frame(line: &str) -> Option<RawFrame<'_>> {
    let (marker, body) = line.strip_prefix('#')?.split_once('#')?;
    let kind = FrameKind::from_marker(marker)?;
    Some(RawFrame { kind, body })
}

/// Fields of `body`, checked against the expected count.
fn split_fields(body: &str, kind: FrameKind) -> Option<Vec<&str>> {
    let fields: Vec<&str> = body.split(';').collect();
    (fields.len() == kind.field_count()).then_some(fields)
}

/// Checksum token, a decimal CRC-16 value.
fn parse_checksum(token: &str) -> Option<u16> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Everything the checksum covers: the body up to and including the last `;`.
fn checksum_span(body: &str) -> &str {
    body.rfind(';').map_or("", |pos| &body[..=pos])
}

fn checksum_matches(body: &str, expected: u16) -> bool {
    checksum(checksum_span(body).as_bytes(), FRAME_CRC) == expected
}

/// Validate a login frame body.
///
/// `0` for structure or version problems, `10` for a checksum mismatch.
pub fn login_check(body: &str, expected_version: &str) -> Result<LoginRecord, ReplyCode> {
    let fields = split_fields(body, FrameKind::Login).ok_or(ReplyCode::LoginRejected)?;
    let (version, imei, password, crc_token) = (fields[0], fields[1], fields[2], fields[3]);

    if imei.is_empty() {
        return Err(ReplyCode::LoginRejected);
    }
    let expected_crc = parse_checksum(crc_token).ok_or(ReplyCode::LoginRejected)?;
    if version != expected_version {
        return Err(ReplyCode::LoginRejected);
    }
    if !checksum_matches(body, expected_crc) {
        return Err(ReplyCode::LoginChecksum);
    }

    let password = (!password.is_empty() && !password.eq_ignore_ascii_case(NOT_AVAILABLE)).then(|| password.to_string());

    Ok(LoginRecord {
        imei: imei.to_string(),
        protocol_version: version.to_string(),
        password,
        checksum: expected_crc,
    })
}

/// Values accumulated while the pipeline runs.
#[derive(Debug, Default)]
struct PositionDraft {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<i32>,
    speed: Option<i32>,
    course: Option<i32>,
    satellites: Option<i32>,
    hdop: Option<f64>,
    inputs: Option<i32>,
    outputs: Option<i32>,
    adc: Option<String>,
    params: Option<String>,
}

impl Field {
    /// Run this field's validator against its token.
    fn apply(self, tokens: &[&str], draft: &mut PositionDraft) -> Validation<()> {
        match self {
            Self::Date => draft.date = Some(check_date(tokens[DATE])?),
            Self::Time => draft.time = Some(check_time(tokens[TIME])?),
            Self::Latitude => draft.latitude = Some(check_coord(tokens[LAT], tokens[LAT_SIGN], Axis::Latitude)?),
            Self::Longitude => {
                draft.longitude = Some(check_coord(tokens[LON], tokens[LON_SIGN], Axis::Longitude)?)
            }
            Self::Altitude => draft.altitude = check_number(tokens[ALT], NumericField::Altitude)?,
            Self::Speed => draft.speed = check_number(tokens[SPEED], NumericField::Speed)?,
            Self::Course => draft.course = check_number(tokens[COURSE], NumericField::Course)?,
            Self::Satellites => draft.satellites = check_number(tokens[SATS], NumericField::Satellites)?,
            Self::Hdop => draft.hdop = check_hdop(tokens[HDOP])?,
            Self::Inputs => draft.inputs = check_number(tokens[INPUTS], NumericField::Inputs)?,
            Self::Outputs => draft.outputs = check_number(tokens[OUTPUTS], NumericField::Outputs)?,
            Self::Adc => draft.adc = check_adc(tokens[ADC])?,
            Self::Params => draft.params = check_params(tokens[PARAMS])?,
        }
        Ok(())
    }
}

/// A position frame that passed every check, not yet tied to a device.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPosition {
    kind: FrameKind,
    short: ShortPosition,
    hdop: Option<f64>,
    inputs: Option<i32>,
    outputs: Option<i32>,
    adc: Option<String>,
    ibutton: Option<String>,
    params: Option<String>,
}

impl ValidatedPosition {
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Stamp the device identity resolved from the client binding.
    pub fn attribute(self, imei: &str) -> PositionReport {
        let mut short = self.short;
        short.imei = imei.to_string();
        match self.kind {
            FrameKind::Extended => PositionReport::Extended(ExtendedPosition {
                position: short,
                hdop: self.hdop,
                inputs: self.inputs,
                outputs: self.outputs,
                adc: self.adc,
                ibutton: self.ibutton,
                params: self.params,
            }),
            _ => PositionReport::Short(short),
        }
    }
}

/// Validate a short or extended position frame body.
///
/// Validators run in pipeline order and the first failure wins; the checksum
/// is only compared once every field passed.
pub fn position_check(body: &str, kind: FrameKind) -> Result<ValidatedPosition, ReplyCode> {
    if kind == FrameKind::Login {
        return Err(ReplyCode::Malformed);
    }
    let tokens = split_fields(body, kind).ok_or(ReplyCode::Malformed)?;
    let expected_crc = tokens.last().and_then(|t| parse_checksum(t)).ok_or(ReplyCode::Malformed)?;

    let mut draft = PositionDraft::default();
    for field in kind.pipeline() {
        field.apply(&tokens, &mut draft)?;
    }

    if !checksum_matches(body, expected_crc) {
        return Err(kind.checksum_error());
    }

    let (Some(date), Some(time), Some(latitude), Some(longitude)) =
        (draft.date, draft.time, draft.latitude, draft.longitude)
    else {
        return Err(ReplyCode::Malformed);
    };

    let ibutton = match kind {
        FrameKind::Extended => Some(tokens[IBUTTON])
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(NOT_AVAILABLE))
            .map(str::to_string),
        _ => None,
    };

    Ok(ValidatedPosition {
        kind,
        short: ShortPosition {
            imei: String::new(),
            date,
            time,
            latitude,
            latitude_hemisphere: tokens[LAT_SIGN].to_ascii_uppercase(),
            longitude,
            longitude_hemisphere: tokens[LON_SIGN].to_ascii_uppercase(),
            speed: draft.speed,
            course: draft.course,
            altitude: draft.altitude,
            satellites: draft.satellites,
            checksum: expected_crc,
        },
        hdop: draft.hdop,
        inputs: draft.inputs,
        outputs: draft.outputs,
        adc: draft.adc,
        ibutton,
        params: draft.params,
    })
}
