//! Wialon login and position repository.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::analytics::TrackPoint;
use crate::entities::{extended_position, login, prelude::*, short_position};
use crate::models::{ExtendedPosition as ExtendedRecord, LoginRecord, ShortPosition as ShortRecord};

/// Insert a login. An IMEI that is already known is left untouched.
pub async fn insert_login(db: &DatabaseConnection, record: &LoginRecord) -> Result<(), DbErr> {
    let model = login::ActiveModel {
        imei: Set(record.imei.clone()),
        protocol_version: Set(record.protocol_version.clone()),
        password: Set(record.password.clone()),
        crc16: Set(i32::from(record.checksum)),
        ..Default::default()
    };

    Login::insert(model)
        .on_conflict(OnConflict::column(login::Column::Imei).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(())
}

fn short_model(record: &ShortRecord) -> short_position::ActiveModel {
    short_position::ActiveModel {
        imei: Set(record.imei.clone()),
        date: Set(record.date),
        time: Set(record.time),
        lat_deg: Set(record.latitude),
        lat_sign: Set(record.latitude_hemisphere.clone()),
        long_deg: Set(record.longitude),
        long_sign: Set(record.longitude_hemisphere.clone()),
        speed: Set(record.speed),
        course: Set(record.course),
        alt: Set(record.altitude),
        sats: Set(record.satellites),
        crc16: Set(i32::from(record.checksum)),
        ..Default::default()
    }
}

pub async fn insert_short(db: &DatabaseConnection, record: &ShortRecord) -> Result<(), DbErr> {
    ShortPosition::insert(short_model(record))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn insert_extended(db: &DatabaseConnection, record: &ExtendedRecord) -> Result<(), DbErr> {
    let p = &record.position;
    let model = extended_position::ActiveModel {
        imei: Set(p.imei.clone()),
        date: Set(p.date),
        time: Set(p.time),
        lat_deg: Set(p.latitude),
        lat_sign: Set(p.latitude_hemisphere.clone()),
        long_deg: Set(p.longitude),
        long_sign: Set(p.longitude_hemisphere.clone()),
        speed: Set(p.speed),
        course: Set(p.course),
        alt: Set(p.altitude),
        sats: Set(p.satellites),
        crc16: Set(i32::from(p.checksum)),
        hdop: Set(record.hdop),
        inputs: Set(record.inputs),
        outputs: Set(record.outputs),
        adc: Set(record.adc.clone()),
        ibutton: Set(record.ibutton.clone()),
        params: Set(record.params.clone()),
        ..Default::default()
    };

    ExtendedPosition::insert(model).exec_without_returning(db).await?;
    Ok(())
}

fn track_point(date: NaiveDate, time: NaiveTime, latitude: f64, longitude: f64, speed: Option<i32>) -> TrackPoint {
    TrackPoint {
        timestamp: date.and_time(time).and_utc(),
        latitude,
        longitude,
        speed: speed.map(f64::from),
    }
}

/// Short and extended positions of one device within `[from, to]`, oldest first.
///
/// Rows are narrowed by date in SQL and by exact timestamp here, since date
/// and time live in separate columns.
pub async fn get_track(
    db: &DatabaseConnection,
    imei: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<TrackPoint>, DbErr> {
    let (start, end) = (from.date_naive(), to.date_naive());

    let short = ShortPosition::find()
        .filter(short_position::Column::Imei.eq(imei))
        .filter(short_position::Column::Date.between(start, end))
        .all(db)
        .await?;
    let extended = ExtendedPosition::find()
        .filter(extended_position::Column::Imei.eq(imei))
        .filter(extended_position::Column::Date.between(start, end))
        .all(db)
        .await?;

    let mut points: Vec<TrackPoint> = short
        .into_iter()
        .map(|m| track_point(m.date, m.time, m.lat_deg, m.long_deg, m.speed))
        .chain(
            extended
                .into_iter()
                .map(|m| track_point(m.date, m.time, m.lat_deg, m.long_deg, m.speed)),
        )
        .filter(|p| p.timestamp >= from && p.timestamp <= to)
        .collect();
    points.sort_by_key(|p| p.timestamp);

    Ok(points)
}
