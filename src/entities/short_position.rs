use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(schema_name = "gpswe", table_name = "wialon_cut_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub imei: String,
    pub date: Date,
    pub time: Time,
    #[sea_orm(column_type = "Double")]
    pub lat_deg: f64,
    pub lat_sign: String,
    #[sea_orm(column_type = "Double")]
    pub long_deg: f64,
    pub long_sign: String,
    pub speed: Option<i32>,
    pub course: Option<i32>,
    pub alt: Option<i32>,
    pub sats: Option<i32>,
    pub crc16: i32,
    pub created: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::login::Entity",
        from = "Column::Imei",
        to = "super::login::Column::Imei",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Login,
}

impl Related<super::login::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Login.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
