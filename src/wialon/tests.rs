//! Unit tests for Wialon frame handling.

use std::net::SocketAddr;

use chrono::{NaiveDate, NaiveTime};

use super::handler::WialonCodec;
use super::parser::{login_check, parse_frame, position_check};
use super::types::{FieldError, FrameKind, ReplyCode};
use crate::checksum::{CrcAlgorithm, checksum};
use crate::models::PositionReport;
use crate::store::MemoryStore;

const IMEI: &str = "864895030123456";
const SHORT_FIELDS: &str = "150623;101530.000;5544.6025;N;03739.6834;E;60;90;150;8";
const EXTENDED_FIELDS: &str =
    "150623;101530.000;5544.6025;N;03739.6834;E;60;90;150;8;1.2;3;0;1.5,2.5;NA;temp:1:22,volt:2:12.5";

/// `fields;CRC` with a correct checksum over `fields;`.
fn signed_body(fields: &str) -> String {
    let span = format!("{fields};");
    let crc = checksum(span.as_bytes(), CrcAlgorithm::Crc16);
    format!("{span}{crc}")
}

/// `fields;CRC` with a checksum that is off by one.
fn bad_crc_body(fields: &str) -> String {
    let span = format!("{fields};");
    let crc = checksum(span.as_bytes(), CrcAlgorithm::Crc16).wrapping_add(1);
    format!("{span}{crc}")
}

fn line(marker: &str, body: &str) -> String {
    format!("#{marker}#{body}")
}

fn login_body() -> String {
    signed_body(&format!("2.0;{IMEI};secret"))
}

fn peer(port: u16) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, 5], port))
}

#[test]
fn test_parse_frame_kinds() {
    let frame = parse_frame("#SD#a;b").unwrap();
    assert_eq!(frame.kind, FrameKind::Short);
    assert_eq!(frame.body, "a;b");

    assert_eq!(parse_frame("#D#x").unwrap().kind, FrameKind::Extended);
    assert_eq!(parse_frame("#L#x").unwrap().kind, FrameKind::Login);
    assert_eq!(parse_frame("#sd#x").unwrap().kind, FrameKind::Short);
    assert_eq!(parse_frame("#l#x").unwrap().kind, FrameKind::Login);
    assert!(parse_frame("#P#").is_none());
    assert!(parse_frame("L#x").is_none());
    assert!(parse_frame("#SD").is_none());
}

#[test]
fn test_login_accepted() {
    let body = login_body();
    let record = login_check(&body, "2.0").unwrap();

    assert_eq!(record.imei, IMEI);
    assert_eq!(record.protocol_version, "2.0");
    assert_eq!(record.password.as_deref(), Some("secret"));
    let expected_crc = checksum(format!("2.0;{IMEI};secret;").as_bytes(), CrcAlgorithm::Crc16);
    assert_eq!(record.checksum, expected_crc);
}

#[test]
fn test_checksum_token_is_decimal() {
    // CRC-16/ARC of "2.0;864895030123456;secret;" is 4216 (0x1078).
    let fields = format!("2.0;{IMEI};secret;");
    assert_eq!(login_check(&format!("{fields}4216"), "2.0").unwrap().checksum, 4216);
    assert_eq!(login_check(&format!("{fields}1078"), "2.0"), Err(ReplyCode::LoginChecksum));
    assert_eq!(login_check(&format!("{fields}43981"), "2.0"), Err(ReplyCode::LoginChecksum));
    assert_eq!(login_check(&format!("{fields}70000"), "2.0"), Err(ReplyCode::LoginRejected));
    assert_eq!(login_check(&format!("{fields}+4216"), "2.0"), Err(ReplyCode::LoginRejected));
}

#[test]
fn test_login_na_password_is_none() {
    let body = signed_body(&format!("2.0;{IMEI};NA"));
    assert_eq!(login_check(&body, "2.0").unwrap().password, None);
}

#[test]
fn test_login_rejections() {
    let bad_crc = bad_crc_body(&format!("2.0;{IMEI};secret"));
    assert_eq!(login_check(&bad_crc, "2.0"), Err(ReplyCode::LoginChecksum));

    assert_eq!(login_check(&login_body(), "1.1"), Err(ReplyCode::LoginRejected));
    assert_eq!(
        login_check(&format!("2.0;{IMEI};secret;ZZZZ"), "2.0"),
        Err(ReplyCode::LoginRejected)
    );
    assert_eq!(login_check(&signed_body("2.0;;secret"), "2.0"), Err(ReplyCode::LoginRejected));
    assert_eq!(login_check(&signed_body("2.0;secret"), "2.0"), Err(ReplyCode::LoginRejected));
}

#[test]
fn test_short_position_fields() {
    let position = position_check(&signed_body(SHORT_FIELDS), FrameKind::Short).unwrap();
    assert_eq!(position.kind(), FrameKind::Short);

    let PositionReport::Short(short) = position.attribute(IMEI) else {
        panic!("expected a short position");
    };
    assert_eq!(short.imei, IMEI);
    assert_eq!(short.date, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
    assert_eq!(short.time, NaiveTime::from_hms_opt(10, 15, 30).unwrap());
    assert_eq!(short.latitude, 55.743375);
    assert!((short.longitude - 37.66139).abs() < 1e-9);
    assert_eq!(short.latitude_hemisphere, "N");
    assert_eq!(short.speed, Some(60));
    assert_eq!(short.course, Some(90));
    assert_eq!(short.altitude, Some(150));
    assert_eq!(short.satellites, Some(8));
}

#[test]
fn test_southern_western_hemispheres_negated() {
    let fields = "150623;101530.000;5544.6025;s;03739.6834;w;NA;NA;NA;NA";
    let position = position_check(&signed_body(fields), FrameKind::Short).unwrap();

    let PositionReport::Short(short) = position.attribute(IMEI) else {
        panic!("expected a short position");
    };
    assert_eq!(short.latitude, -55.743375);
    assert!(short.longitude < 0.0);
    assert_eq!(short.latitude_hemisphere, "S");
    assert_eq!(short.longitude_hemisphere, "W");
    assert_eq!(short.speed, None);
    assert_eq!(short.satellites, None);
}

#[test]
fn test_extended_position_fields() {
    let position = position_check(&signed_body(EXTENDED_FIELDS), FrameKind::Extended).unwrap();

    let PositionReport::Extended(extended) = position.attribute(IMEI) else {
        panic!("expected an extended position");
    };
    assert_eq!(extended.position.imei, IMEI);
    assert_eq!(extended.hdop, Some(1.2));
    assert_eq!(extended.inputs, Some(3));
    assert_eq!(extended.outputs, Some(0));
    assert_eq!(extended.adc.as_deref(), Some("1.5,2.5"));
    assert_eq!(extended.ibutton, None);
    assert_eq!(extended.params.as_deref(), Some("temp:1:22,volt:2:12.5"));
}

#[test]
fn test_field_error_wins_over_checksum() {
    let fields = "320623;101530.000;5544.6025;N;03739.6834;E;60;90;150;8";
    assert_eq!(
        position_check(&bad_crc_body(fields), FrameKind::Short),
        Err(ReplyCode::Field(FieldError::DateTime))
    );

    let fields = EXTENDED_FIELDS.replacen("150623", "320623", 1);
    assert_eq!(
        position_check(&bad_crc_body(&fields), FrameKind::Extended),
        Err(ReplyCode::Field(FieldError::DateTime))
    );
}

#[test]
fn test_first_failing_field_reported() {
    // Bad coordinate and bad speed: coordinate comes first.
    let fields = "150623;101530.000;5544.6025;X;03739.6834;E;fast;90;150;8";
    assert_eq!(
        position_check(&signed_body(fields), FrameKind::Short),
        Err(ReplyCode::Field(FieldError::Coord))
    );

    let fields = "150623;101530.000;5544.6025;N;03739.6834;E;60;359;150;8";
    assert_eq!(
        position_check(&signed_body(fields), FrameKind::Short),
        Err(ReplyCode::Field(FieldError::SpeedCourseAlt))
    );
}

#[test]
fn test_extended_field_errors() {
    let with_params = |params: &str| {
        let fields = format!("150623;101530.000;5544.6025;N;03739.6834;E;60;90;150;8;1.2;3;0;;NA;{params}");
        position_check(&signed_body(&fields), FrameKind::Extended)
    };

    assert!(with_params("temp:1:22").is_ok());
    assert_eq!(with_params("temp: 1:22"), Err(ReplyCode::Field(FieldError::ParamsSpace)));
    assert_eq!(with_params("temp:3:x"), Err(ReplyCode::Field(FieldError::Params)));
    assert_eq!(with_params(""), Err(ReplyCode::Field(FieldError::Params)));
    let long_name = "p".repeat(41);
    assert_eq!(
        with_params(&format!("{long_name}:1:1")),
        Err(ReplyCode::Field(FieldError::ParamsLenLimit))
    );

    let fields = "150623;101530.000;5544.6025;N;03739.6834;E;60;90;150;8;1.2;3;0;2.5;NA;temp:1:22";
    assert_eq!(
        position_check(&signed_body(fields), FrameKind::Extended),
        Err(ReplyCode::Field(FieldError::Adc))
    );
}

#[test]
fn test_position_structure_errors() {
    assert_eq!(
        position_check(&signed_body("150623;101530.000"), FrameKind::Short),
        Err(ReplyCode::Malformed)
    );
    assert_eq!(
        position_check(&format!("{SHORT_FIELDS};XYZW"), FrameKind::Short),
        Err(ReplyCode::Malformed)
    );
    // Short body sent as extended has the wrong field count.
    assert_eq!(
        position_check(&signed_body(SHORT_FIELDS), FrameKind::Extended),
        Err(ReplyCode::Malformed)
    );
}

#[test]
fn test_checksum_errors_per_kind() {
    assert_eq!(
        position_check(&bad_crc_body(SHORT_FIELDS), FrameKind::Short),
        Err(ReplyCode::ShortChecksum)
    );
    assert_eq!(
        position_check(&bad_crc_body(EXTENDED_FIELDS), FrameKind::Extended),
        Err(ReplyCode::ExtendedChecksum)
    );
}

#[test]
fn test_reply_encoding() {
    assert_eq!(ReplyCode::Accepted.reply(FrameKind::Login), "#AL#1\r\n");
    assert_eq!(ReplyCode::ShortChecksum.reply(FrameKind::Short), "#ASD#13\r\n");
    assert_eq!(
        ReplyCode::Field(FieldError::ParamsLenLimit).reply(FrameKind::Extended),
        "#AD#15.1\r\n"
    );
    assert_eq!(ReplyCode::Unbound.reply(FrameKind::Short), "#ASD#-1\r\n");
}

#[tokio::test]
async fn test_handler_position_without_login_is_unbound() {
    let codec = WialonCodec::new("2.0");
    let store = MemoryStore::new();

    let reply = codec
        .handle(&line("SD", &signed_body(SHORT_FIELDS)), peer(4000), &store)
        .await
        .unwrap();

    assert_eq!(reply.as_deref(), Some("#ASD#-1\r\n"));
    assert!(store.short_positions().await.is_empty());
}

#[tokio::test]
async fn test_handler_login_then_positions() {
    let codec = WialonCodec::new("2.0");
    let store = MemoryStore::new();

    let reply = codec.handle(&line("L", &login_body()), peer(4000), &store).await.unwrap();
    assert_eq!(reply.as_deref(), Some("#AL#1\r\n"));

    let bindings = store.bindings().await;
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].ip, "10.0.0.5");
    assert_eq!(bindings[0].port, 4000);
    assert_eq!(bindings[0].imei, IMEI);

    // A new connection from the same address is still attributed.
    let reply = codec
        .handle(&line("SD", &signed_body(SHORT_FIELDS)), peer(4001), &store)
        .await
        .unwrap();
    assert_eq!(reply.as_deref(), Some("#ASD#1\r\n"));

    let reply = codec
        .handle(&line("D", &signed_body(EXTENDED_FIELDS)), peer(4001), &store)
        .await
        .unwrap();
    assert_eq!(reply.as_deref(), Some("#AD#1\r\n"));

    assert_eq!(store.short_positions().await[0].imei, IMEI);
    assert_eq!(store.extended_positions().await[0].position.imei, IMEI);
}

#[tokio::test]
async fn test_handler_rejected_login_stores_nothing() {
    let codec = WialonCodec::new("2.0");
    let store = MemoryStore::new();

    let body = bad_crc_body(&format!("2.0;{IMEI};secret"));
    let reply = codec.handle(&line("L", &body), peer(4000), &store).await.unwrap();

    assert_eq!(reply.as_deref(), Some("#AL#10\r\n"));
    assert!(store.logins().await.is_empty());
    assert!(store.bindings().await.is_empty());
}

#[tokio::test]
async fn test_handler_ignores_unknown_frame() {
    let codec = WialonCodec::new("2.0");
    let store = MemoryStore::new();
    assert_eq!(codec.handle("#P#", peer(4000), &store).await.unwrap(), None);
}

#[tokio::test]
async fn test_handler_accepts_lowercase_marker() {
    let codec = WialonCodec::new("2.0");
    let store = MemoryStore::new();

    let reply = codec.handle(&line("l", &login_body()), peer(4000), &store).await.unwrap();
    assert_eq!(reply.as_deref(), Some("#AL#1\r\n"));

    let reply = codec
        .handle(&line("sd", &signed_body(SHORT_FIELDS)), peer(4000), &store)
        .await
        .unwrap();
    assert_eq!(reply.as_deref(), Some("#ASD#1\r\n"));
    assert_eq!(store.short_positions().await.len(), 1);
}
