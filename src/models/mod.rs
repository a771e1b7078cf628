//! Data models for device logins, bindings and position records.

pub mod client;
pub mod egts;
pub mod wialon;

pub use client::ClientBinding;
pub use egts::BinaryPosition;
pub use wialon::{ExtendedPosition, LoginRecord, PositionReport, ShortPosition};
