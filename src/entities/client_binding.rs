use sea_orm::entity::prelude::*;

/// Last known peer address of a logged-in device, one row per ip.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(schema_name = "gpswe", table_name = "client")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ip: String,
    pub port: i32,
    pub imei: String,
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
