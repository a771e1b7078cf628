pub mod analytics;
pub mod checksum;
pub mod config;
pub mod db;
pub mod egts;
pub mod entities;
pub mod error;
pub mod models;
pub mod server;
pub mod store;
pub mod wialon;

pub use error::{AppError, Result};
