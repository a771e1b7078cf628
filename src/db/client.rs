//! Client binding repository: which device talks from which ip.

use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::entities::{client_binding, prelude::*};
use crate::models::ClientBinding as Binding;

/// Insert or replace the binding for `binding.ip`.
pub async fn upsert(db: &DatabaseConnection, binding: &Binding) -> Result<(), DbErr> {
    let model = client_binding::ActiveModel {
        ip: Set(binding.ip.clone()),
        port: Set(i32::from(binding.port)),
        imei: Set(binding.imei.clone()),
    };

    ClientBinding::insert(model)
        .on_conflict(
            OnConflict::column(client_binding::Column::Ip)
                .update_columns([client_binding::Column::Port, client_binding::Column::Imei])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// IMEI bound to `ip`, if any.
pub async fn find_imei(db: &DatabaseConnection, ip: &str) -> Result<Option<String>, DbErr> {
    let binding = ClientBinding::find_by_id(ip.to_owned()).one(db).await?;
    Ok(binding.map(|b| b.imei))
}
