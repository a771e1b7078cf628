//! Persistence collaborator used by the protocol handlers.
//!
//! [`crate::db::PgStore`] is the production implementation; [`MemoryStore`]
//! backs tests and `serve --memory` runs.

mod memory;

pub use memory::MemoryStore;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::analytics::TrackPoint;
use crate::error::Result;
use crate::models::{BinaryPosition, ClientBinding, ExtendedPosition, LoginRecord, ShortPosition};

/// Durable storage for logins, bindings and positions.
///
/// Implementations retry transient failures themselves; an `Err` means the
/// operation is lost for the current frame.
pub trait Store: Send + Sync + 'static {
    /// Record a device login. Repeated logins of one IMEI are a no-op.
    fn save_login(&self, record: &LoginRecord) -> impl Future<Output = Result<()>> + Send;

    fn save_short_position(&self, record: &ShortPosition) -> impl Future<Output = Result<()>> + Send;

    fn save_extended_position(&self, record: &ExtendedPosition) -> impl Future<Output = Result<()>> + Send;

    /// Bind a peer ip to a device, replacing an earlier binding for that ip.
    fn save_client_binding(&self, binding: &ClientBinding) -> impl Future<Output = Result<()>> + Send;

    fn lookup_imei_by_ip(&self, ip: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn save_binary_position(&self, record: &BinaryPosition) -> impl Future<Output = Result<()>> + Send;

    /// Wialon positions of `imei` with `from <= timestamp <= to`, oldest first.
    fn positions_in_range(
        &self,
        imei: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<TrackPoint>>> + Send;
}
