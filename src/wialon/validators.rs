//! Field validators for Wialon position frames.
//!
//! Every validator is pure and total: a malformed token yields the
//! [`FieldError`] class the device is told about, never a panic.

use chrono::{NaiveDate, NaiveTime, Utc};

use super::types::{FieldError, MAX_PARAM_NAME_LEN, NOT_AVAILABLE};

/// Outcome of validating one field.
pub type Validation<T> = Result<T, FieldError>;

/// Coordinate axis, selects degree width and hemisphere letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `DDMM.MMMM`, `N`/`S`.
    Latitude,
    /// `DDDMM.MMMM`, `E`/`W`.
    Longitude,
}

/// Integer fields sharing the `NA`-or-number rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Speed,
    Course,
    Altitude,
    Satellites,
    Inputs,
    Outputs,
}

impl NumericField {
    fn error(self) -> FieldError {
        match self {
            Self::Speed | Self::Course | Self::Altitude => FieldError::SpeedCourseAlt,
            Self::Satellites => FieldError::SatsHdop,
            Self::Inputs | Self::Outputs => FieldError::InputsOutputs,
        }
    }
}

fn is_not_available(token: &str) -> bool {
    token.is_empty() || token.eq_ignore_ascii_case(NOT_AVAILABLE)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Round to 7 decimal places.
pub(crate) fn round7(value: f64) -> f64 {
    (value * 1e7).round() / 1e7
}

/// `DDMMYY`; `NA` means today (UTC).
pub fn check_date(token: &str) -> Validation<NaiveDate> {
    if is_not_available(token) {
        return Ok(Utc::now().date_naive());
    }
    if token.len() != 6 || !all_digits(token) {
        return Err(FieldError::DateTime);
    }
    NaiveDate::parse_from_str(token, "%d%m%y").map_err(|_| FieldError::DateTime)
}

/// `HHMMSS.fff`; `NA` means now (UTC).
pub fn check_time(token: &str) -> Validation<NaiveTime> {
    if is_not_available(token) {
        return Ok(Utc::now().time());
    }
    let (hms, fraction) = token.split_once('.').ok_or(FieldError::DateTime)?;
    if hms.len() != 6 || !all_digits(hms) || fraction.len() > 9 || !all_digits(fraction) {
        return Err(FieldError::DateTime);
    }

    let part = |range: std::ops::Range<usize>| hms[range].parse::<u32>().map_err(|_| FieldError::DateTime);
    let (hour, minute, second) = (part(0..2)?, part(2..4)?, part(4..6)?);

    // Left-aligned fraction: ".5" is 500ms.
    let nanos = format!("{fraction:0<9}").parse::<u32>().map_err(|_| FieldError::DateTime)?;

    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).ok_or(FieldError::DateTime)
}

/// Degrees plus decimal minutes, signed by hemisphere.
pub fn check_coord(token: &str, hemisphere: &str, axis: Axis) -> Validation<f64> {
    let (degree_width, positive, negative) = match axis {
        Axis::Latitude => (2, "N", "S"),
        Axis::Longitude => (3, "E", "W"),
    };

    let sign = if hemisphere.eq_ignore_ascii_case(positive) {
        1.0
    } else if hemisphere.eq_ignore_ascii_case(negative) {
        -1.0
    } else {
        return Err(FieldError::Coord);
    };

    let degrees = token.get(..degree_width).filter(|d| all_digits(d)).ok_or(FieldError::Coord)?;
    let minutes = token.get(degree_width..).ok_or(FieldError::Coord)?;
    let minutes_valid = minutes.bytes().any(|b| b.is_ascii_digit())
        && minutes.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && minutes.bytes().filter(|&b| b == b'.').count() <= 1;
    if !minutes_valid {
        return Err(FieldError::Coord);
    }

    let degrees: f64 = degrees.parse::<u32>().map_err(|_| FieldError::Coord)?.into();
    let minutes: f64 = minutes.parse().map_err(|_| FieldError::Coord)?;

    Ok(round7(sign * (degrees + minutes / 60.0)))
}

/// Integer or `NA`. Course must lie in `[0, 359)`.
pub fn check_number(token: &str, field: NumericField) -> Validation<Option<i32>> {
    if token.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return Ok(None);
    }
    let value = token.parse::<i32>().map_err(|_| field.error())?;
    if field == NumericField::Course && !(0..359).contains(&value) {
        return Err(field.error());
    }
    Ok(Some(value))
}

/// Horizontal dilution of precision, float or `NA`.
pub fn check_hdop(token: &str) -> Validation<Option<f64>> {
    if token.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return Ok(None);
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or(FieldError::SatsHdop)
}

/// Analog channel list: empty, or starting with `1`.
pub fn check_adc(token: &str) -> Validation<Option<String>> {
    if token.is_empty() {
        return Ok(None);
    }
    if !token.starts_with('1') {
        return Err(FieldError::Adc);
    }
    Ok(Some(token.to_string()))
}

/// Comma-separated `name:type[:value]` parameters.
pub fn check_params(token: &str) -> Validation<Option<String>> {
    if token.contains(' ') {
        return Err(FieldError::ParamsSpace);
    }
    for param in token.split(',') {
        let mut parts = param.split(':');
        let name = parts.next().unwrap_or_default();
        if name.chars().count() > MAX_PARAM_NAME_LEN {
            return Err(FieldError::ParamsLenLimit);
        }
        let kind = parts
            .next()
            .and_then(|k| k.parse::<i32>().ok())
            .ok_or(FieldError::Params)?;
        if !(1..3).contains(&kind) {
            return Err(FieldError::Params);
        }
    }
    Ok(Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_date_strict_ddmmyy() {
        assert_eq!(check_date("150623"), Ok(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()));
        assert_eq!(check_date("320123"), Err(FieldError::DateTime));
        assert_eq!(check_date("15062023"), Err(FieldError::DateTime));
        assert_eq!(check_date("15-623"), Err(FieldError::DateTime));
    }

    #[test]
    fn test_date_na_is_today() {
        assert_eq!(check_date("NA"), Ok(Utc::now().date_naive()));
    }

    #[test]
    fn test_time_requires_fraction() {
        let t = check_time("101530.250").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (10, 15, 30));
        assert_eq!(t.nanosecond(), 250_000_000);

        assert_eq!(check_time("101530"), Err(FieldError::DateTime));
        assert_eq!(check_time("251530.000"), Err(FieldError::DateTime));
        assert_eq!(check_time("1015.30"), Err(FieldError::DateTime));
        assert_eq!(check_time("101530.x"), Err(FieldError::DateTime));
    }

    #[test]
    fn test_time_na_is_valid() {
        assert!(check_time("NA").is_ok());
    }

    #[test]
    fn test_latitude_north_and_south() {
        let north = check_coord("5544.6025", "N", Axis::Latitude).unwrap();
        assert!((north - 55.743375).abs() < 1e-9);

        let south = check_coord("5544.6025", "S", Axis::Latitude).unwrap();
        assert_eq!(south, -north);
    }

    #[test]
    fn test_longitude_east_and_west() {
        let east = check_coord("03739.6834", "E", Axis::Longitude).unwrap();
        assert_eq!(east, round7(37.0 + 39.6834 / 60.0));

        let west = check_coord("03739.6834", "W", Axis::Longitude).unwrap();
        assert_eq!(west, -east);
    }

    #[test]
    fn test_coordinate_rounded_to_seven_places() {
        let value = check_coord("0012.3456789", "N", Axis::Latitude).unwrap();
        assert_eq!(value, round7(12.3456789 / 60.0));
        assert_eq!(value, 0.2057613);
    }

    #[test]
    fn test_coordinate_bad_hemisphere() {
        assert_eq!(check_coord("5544.6025", "E", Axis::Latitude), Err(FieldError::Coord));
        assert_eq!(check_coord("03739.6834", "N", Axis::Longitude), Err(FieldError::Coord));
        assert_eq!(check_coord("5544.6025", "X", Axis::Latitude), Err(FieldError::Coord));
    }

    #[test]
    fn test_coordinate_bad_token() {
        assert_eq!(check_coord("NA", "N", Axis::Latitude), Err(FieldError::Coord));
        assert_eq!(check_coord("55", "N", Axis::Latitude), Err(FieldError::Coord));
        assert_eq!(check_coord("55inf", "N", Axis::Latitude), Err(FieldError::Coord));
        assert_eq!(check_coord("5a44.6025", "N", Axis::Latitude), Err(FieldError::Coord));
    }

    #[test]
    fn test_course_range() {
        assert_eq!(check_number("359", NumericField::Course), Err(FieldError::SpeedCourseAlt));
        assert_eq!(check_number("358", NumericField::Course), Ok(Some(358)));
        assert_eq!(check_number("0", NumericField::Course), Ok(Some(0)));
        assert_eq!(check_number("-1", NumericField::Course), Err(FieldError::SpeedCourseAlt));
        assert_eq!(check_number("NA", NumericField::Course), Ok(None));
    }

    #[test]
    fn test_numeric_error_classes() {
        assert_eq!(check_number("fast", NumericField::Speed), Err(FieldError::SpeedCourseAlt));
        assert_eq!(check_number("1.5", NumericField::Altitude), Err(FieldError::SpeedCourseAlt));
        assert_eq!(check_number("x", NumericField::Satellites), Err(FieldError::SatsHdop));
        assert_eq!(check_number("x", NumericField::Inputs), Err(FieldError::InputsOutputs));
        assert_eq!(check_number("x", NumericField::Outputs), Err(FieldError::InputsOutputs));
        assert_eq!(check_number("-20", NumericField::Altitude), Ok(Some(-20)));
    }

    #[test]
    fn test_hdop() {
        assert_eq!(check_hdop("1.2"), Ok(Some(1.2)));
        assert_eq!(check_hdop("NA"), Ok(None));
        assert_eq!(check_hdop("bad"), Err(FieldError::SatsHdop));
        assert_eq!(check_hdop("NaN"), Err(FieldError::SatsHdop));
    }

    #[test]
    fn test_adc() {
        assert_eq!(check_adc(""), Ok(None));
        assert_eq!(check_adc("1,2.5,3.7"), Ok(Some("1,2.5,3.7".to_string())));
        assert_eq!(check_adc("2,1"), Err(FieldError::Adc));
    }

    #[test]
    fn test_params() {
        assert_eq!(check_params("temp:1:20,fuel:2:33.5"), Ok(Some("temp:1:20,fuel:2:33.5".to_string())));
        assert_eq!(check_params("temp:1:20, fuel:2:33.5"), Err(FieldError::ParamsSpace));
        assert_eq!(check_params("temp:3:hello"), Err(FieldError::Params));
        assert_eq!(check_params("temp"), Err(FieldError::Params));
        assert_eq!(check_params(""), Err(FieldError::Params));

        let long_name = "a".repeat(41);
        assert_eq!(check_params(&format!("{long_name}:1:5")), Err(FieldError::ParamsLenLimit));
        let max_name = "a".repeat(40);
        assert!(check_params(&format!("{max_name}:1:5")).is_ok());
    }
}
