//! Database connection pool, schema bootstrap and retry policy.

use std::future::Future;
use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::log::LevelFilter;
use tracing::warn;

use crate::config::DatabaseConfig;

/// Longest single backoff sleep.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

const INIT_SCHEMA: &str = r#"
    CREATE SCHEMA IF NOT EXISTS gpswe;

    CREATE TABLE IF NOT EXISTS gpswe.wialon_login (
        imei TEXT PRIMARY KEY,
        protocol_version TEXT NOT NULL,
        password TEXT,
        crc16 INTEGER NOT NULL,
        created TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS gpswe.wialon_cut_data (
        id BIGSERIAL PRIMARY KEY,
        imei TEXT NOT NULL REFERENCES gpswe.wialon_login(imei) ON DELETE CASCADE,
        date DATE NOT NULL,
        time TIME NOT NULL,
        lat_deg DOUBLE PRECISION NOT NULL,
        lat_sign TEXT NOT NULL,
        long_deg DOUBLE PRECISION NOT NULL,
        long_sign TEXT NOT NULL,
        speed INTEGER,
        course INTEGER,
        alt INTEGER,
        sats INTEGER,
        crc16 INTEGER NOT NULL,
        created TIMESTAMPTZ NOT NULL DEFAULT now()
    );
    CREATE INDEX IF NOT EXISTS wialon_cut_data_imei_date_idx ON gpswe.wialon_cut_data (imei, date);

    CREATE TABLE IF NOT EXISTS gpswe.wialon_extend_data (
        id BIGSERIAL PRIMARY KEY,
        imei TEXT NOT NULL REFERENCES gpswe.wialon_login(imei) ON DELETE CASCADE,
        date DATE NOT NULL,
        time TIME NOT NULL,
        lat_deg DOUBLE PRECISION NOT NULL,
        lat_sign TEXT NOT NULL,
        long_deg DOUBLE PRECISION NOT NULL,
        long_sign TEXT NOT NULL,
        speed INTEGER,
        course INTEGER,
        alt INTEGER,
        sats INTEGER,
        crc16 INTEGER NOT NULL,
        hdop DOUBLE PRECISION,
        inputs INTEGER,
        outputs INTEGER,
        adc TEXT,
        ibutton TEXT,
        params TEXT,
        created TIMESTAMPTZ NOT NULL DEFAULT now()
    );
    CREATE INDEX IF NOT EXISTS wialon_extend_data_imei_date_idx ON gpswe.wialon_extend_data (imei, date);

    CREATE TABLE IF NOT EXISTS gpswe.client (
        ip TEXT PRIMARY KEY,
        port INTEGER NOT NULL,
        imei TEXT NOT NULL REFERENCES gpswe.wialon_login(imei) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS gpswe.egts_data (
        id BIGSERIAL PRIMARY KEY,
        oid BIGINT NOT NULL,
        date DATE NOT NULL,
        time TIME NOT NULL,
        lat_deg DOUBLE PRECISION NOT NULL,
        long_deg DOUBLE PRECISION NOT NULL,
        speed DOUBLE PRECISION NOT NULL,
        course INTEGER NOT NULL,
        created TIMESTAMPTZ NOT NULL DEFAULT now()
    );
"#;

/// Create a connection pool sized from the config.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.connection_string());
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt).await
}

/// Create the `gpswe` schema and its tables if missing.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(INIT_SCHEMA).await?;
    Ok(())
}

/// Exponential backoff for transient database failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, the first one included.
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            attempts: config.retry_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Sleep before retry number `retry` (0-based): `base * 2^retry`, capped.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }
}

/// Connectivity failures worth another try. Query errors are not.
pub fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

/// Run `op` until it succeeds, fails permanently, or attempts run out.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut retry = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) && retry + 1 < policy.attempts => {
                let delay = policy.delay(retry);
                warn!("{what} failed ({e}), retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
