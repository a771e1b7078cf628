//! sea-orm entities for the `gpswe` schema.

pub mod prelude;

pub mod binary_position;
pub mod client_binding;
pub mod extended_position;
pub mod login;
pub mod short_position;
