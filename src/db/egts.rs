//! EGTS position repository.

use sea_orm::*;

use crate::entities::{binary_position, prelude::*};
use crate::models::BinaryPosition as Record;

pub async fn insert_position(db: &DatabaseConnection, record: &Record) -> Result<(), DbErr> {
    let model = binary_position::ActiveModel {
        oid: Set(i64::from(record.object_id)),
        date: Set(record.date),
        time: Set(record.time),
        lat_deg: Set(record.latitude),
        long_deg: Set(record.longitude),
        speed: Set(record.speed),
        course: Set(i32::from(record.course)),
        ..Default::default()
    };

    BinaryPosition::insert(model).exec_without_returning(db).await?;
    Ok(())
}
