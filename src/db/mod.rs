//! PostgreSQL persistence through sea-orm.

pub mod client;
pub mod connection;
pub mod egts;
pub mod wialon;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::info;

pub use connection::{RetryPolicy, connect, create_schema, with_retry};

use crate::analytics::TrackPoint;
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{BinaryPosition, ClientBinding, ExtendedPosition, LoginRecord, ShortPosition};
use crate::store::Store;

/// [`Store`] backed by a PostgreSQL pool. Every operation is retried on
/// connectivity errors according to the configured [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseConnection,
    retry: RetryPolicy,
}

impl PgStore {
    /// Connect, retrying while the server is unreachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let retry = RetryPolicy::from_config(config);
        let db = with_retry(retry, "database connect", || connect(config)).await?;
        info!("Connected to PostgreSQL at {}:{}/{}", config.host, config.port, config.name);
        Ok(Self { db, retry })
    }

    pub async fn init_schema(&self) -> Result<()> {
        with_retry(self.retry, "schema init", || create_schema(&self.db)).await?;
        Ok(())
    }
}

impl Store for PgStore {
    async fn save_login(&self, record: &LoginRecord) -> Result<()> {
        with_retry(self.retry, "save login", || wialon::insert_login(&self.db, record)).await?;
        Ok(())
    }

    async fn save_short_position(&self, record: &ShortPosition) -> Result<()> {
        with_retry(self.retry, "save short position", || wialon::insert_short(&self.db, record)).await?;
        Ok(())
    }

    async fn save_extended_position(&self, record: &ExtendedPosition) -> Result<()> {
        with_retry(self.retry, "save extended position", || wialon::insert_extended(&self.db, record)).await?;
        Ok(())
    }

    async fn save_client_binding(&self, binding: &ClientBinding) -> Result<()> {
        with_retry(self.retry, "save client binding", || client::upsert(&self.db, binding)).await?;
        Ok(())
    }

    async fn lookup_imei_by_ip(&self, ip: &str) -> Result<Option<String>> {
        Ok(with_retry(self.retry, "lookup client", || client::find_imei(&self.db, ip)).await?)
    }

    async fn save_binary_position(&self, record: &BinaryPosition) -> Result<()> {
        with_retry(self.retry, "save binary position", || egts::insert_position(&self.db, record)).await?;
        Ok(())
    }

    async fn positions_in_range(&self, imei: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<TrackPoint>> {
        if from > to {
            return Err(AppError::store(format!("Range start {from} is after end {to}")));
        }
        Ok(with_retry(self.retry, "load track", || wialon::get_track(&self.db, imei, from, to)).await?)
    }
}
