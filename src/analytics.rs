//! Track statistics over stored positions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ShortPosition;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// One stored fix, reduced to what the statistics need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
}

impl From<&ShortPosition> for TrackPoint {
    fn from(p: &ShortPosition) -> Self {
        Self {
            timestamp: p.date.and_time(p.time).and_utc(),
            latitude: p.latitude,
            longitude: p.longitude,
            speed: p.speed.map(f64::from),
        }
    }
}

/// Summary of a device track over a time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub points: usize,
    pub distance_km: f64,
    /// Mean of the reported speeds; `None` when no point carried one.
    pub average_speed: Option<f64>,
}

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Cumulative distance and average speed. Points are taken in time order.
pub fn summarize(points: &[TrackPoint]) -> TrackSummary {
    let mut ordered: Vec<&TrackPoint> = points.iter().collect();
    ordered.sort_by_key(|p| p.timestamp);

    let distance_km = ordered
        .windows(2)
        .map(|w| haversine_km(w[0].latitude, w[0].longitude, w[1].latitude, w[1].longitude))
        .sum();

    let speeds: Vec<f64> = ordered.iter().filter_map(|p| p.speed).collect();
    let average_speed = (!speeds.is_empty()).then(|| speeds.iter().sum::<f64>() / speeds.len() as f64);

    TrackSummary {
        points: ordered.len(),
        distance_km,
        average_speed,
    }
}
