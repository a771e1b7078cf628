use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(schema_name = "gpswe", table_name = "egts_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub oid: i64,
    pub date: Date,
    pub time: Time,
    #[sea_orm(column_type = "Double")]
    pub lat_deg: f64,
    #[sea_orm(column_type = "Double")]
    pub long_deg: f64,
    #[sea_orm(column_type = "Double")]
    pub speed: f64,
    pub course: i32,
    pub created: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
