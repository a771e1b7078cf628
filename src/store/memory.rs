//! In-process store.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::Store;
use crate::analytics::TrackPoint;
use crate::error::{AppError, Result};
use crate::models::{BinaryPosition, ClientBinding, ExtendedPosition, LoginRecord, ShortPosition};

#[derive(Debug, Default)]
struct Tables {
    logins: Vec<LoginRecord>,
    bindings: Vec<ClientBinding>,
    short_positions: Vec<ShortPosition>,
    extended_positions: Vec<ExtendedPosition>,
    binary_positions: Vec<BinaryPosition>,
}

/// Store keeping every table in memory. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn logins(&self) -> Vec<LoginRecord> {
        self.tables.read().await.logins.clone()
    }

    pub async fn bindings(&self) -> Vec<ClientBinding> {
        self.tables.read().await.bindings.clone()
    }

    pub async fn short_positions(&self) -> Vec<ShortPosition> {
        self.tables.read().await.short_positions.clone()
    }

    pub async fn extended_positions(&self) -> Vec<ExtendedPosition> {
        self.tables.read().await.extended_positions.clone()
    }

    pub async fn binary_positions(&self) -> Vec<BinaryPosition> {
        self.tables.read().await.binary_positions.clone()
    }
}

impl Store for MemoryStore {
    async fn save_login(&self, record: &LoginRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.logins.iter().any(|l| l.imei == record.imei) {
            tables.logins.push(record.clone());
        }
        Ok(())
    }

    async fn save_short_position(&self, record: &ShortPosition) -> Result<()> {
        self.tables.write().await.short_positions.push(record.clone());
        Ok(())
    }

    async fn save_extended_position(&self, record: &ExtendedPosition) -> Result<()> {
        self.tables.write().await.extended_positions.push(record.clone());
        Ok(())
    }

    async fn save_client_binding(&self, binding: &ClientBinding) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.bindings.retain(|b| b.ip != binding.ip);
        tables.bindings.push(binding.clone());
        Ok(())
    }

    async fn lookup_imei_by_ip(&self, ip: &str) -> Result<Option<String>> {
        let tables = self.tables.read().await;
        Ok(tables.bindings.iter().find(|b| b.ip == ip).map(|b| b.imei.clone()))
    }

    async fn save_binary_position(&self, record: &BinaryPosition) -> Result<()> {
        self.tables.write().await.binary_positions.push(record.clone());
        Ok(())
    }

    async fn positions_in_range(&self, imei: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<TrackPoint>> {
        if from > to {
            return Err(AppError::store(format!("Range start {from} is after end {to}")));
        }
        let tables = self.tables.read().await;
        let short = tables.short_positions.iter();
        let extended = tables.extended_positions.iter().map(|e| &e.position);

        let mut points: Vec<TrackPoint> = short
            .chain(extended)
            .filter(|p| p.imei == imei)
            .map(TrackPoint::from)
            .filter(|p| p.timestamp >= from && p.timestamp <= to)
            .collect();
        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    fn position(imei: &str, hour: u32) -> ShortPosition {
        ShortPosition {
            imei: imei.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            latitude: 55.0,
            latitude_hemisphere: "N".to_string(),
            longitude: 37.0,
            longitude_hemisphere: "E".to_string(),
            speed: Some(40),
            course: Some(90),
            altitude: None,
            satellites: Some(7),
            checksum: 0,
        }
    }

    #[tokio::test]
    async fn test_binding_replaced_per_ip() {
        let store = MemoryStore::new();
        for imei in ["111", "222"] {
            store
                .save_client_binding(&ClientBinding {
                    ip: "10.0.0.1".to_string(),
                    port: 5000,
                    imei: imei.to_string(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.bindings().await.len(), 1);
        assert_eq!(store.lookup_imei_by_ip("10.0.0.1").await.unwrap().as_deref(), Some("222"));
        assert_eq!(store.lookup_imei_by_ip("10.0.0.2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_login_ignored() {
        let store = MemoryStore::new();
        let login = LoginRecord {
            imei: "111".to_string(),
            protocol_version: "2.0".to_string(),
            password: None,
            checksum: 0x1234,
        };
        store.save_login(&login).await.unwrap();
        store.save_login(&login).await.unwrap();
        assert_eq!(store.logins().await.len(), 1);
    }

    #[tokio::test]
    async fn test_positions_in_range_filters_and_sorts() {
        let store = MemoryStore::new();
        store.save_short_position(&position("111", 12)).await.unwrap();
        store.save_short_position(&position("111", 9)).await.unwrap();
        store.save_short_position(&position("111", 20)).await.unwrap();
        store.save_short_position(&position("999", 10)).await.unwrap();

        let from = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap();
        let points = store.positions_in_range("111", from, to).await.unwrap();

        assert_eq!(points.len(), 2);
        assert!(points[0].timestamp < points[1].timestamp);

        let inverted = store.positions_in_range("111", to, from).await;
        assert!(matches!(inverted, Err(AppError::Store(_))));
    }
}
