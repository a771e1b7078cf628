use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(schema_name = "gpswe", table_name = "wialon_login")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub imei: String,
    pub protocol_version: String,
    pub password: Option<String>,
    pub crc16: i32,
    pub created: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::short_position::Entity")]
    ShortPosition,
    #[sea_orm(has_many = "super::extended_position::Entity")]
    ExtendedPosition,
    #[sea_orm(has_many = "super::client_binding::Entity")]
    ClientBinding,
}

impl Related<super::short_position::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShortPosition.def()
    }
}

impl Related<super::extended_position::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExtendedPosition.def()
    }
}

impl Related<super::client_binding::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientBinding.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
