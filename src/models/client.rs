//! Connection-to-device binding.

use serde::{Deserialize, Serialize};

/// Associates a peer address with the device that logged in from it.
///
/// Position frames do not repeat the IMEI, so they are attributed through
/// the binding for their source ip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientBinding {
    pub ip: String,
    pub port: u16,
    pub imei: String,
}
