//! Weather observations and the immutable snapshot published per refresh.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// One forecast timestamp with all four required parameters present.
///
/// Upstream slots with a placeholder or malformed token never become an
/// observation; the parser drops the whole timestamp instead of defaulting
/// a field to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherObservation {
    /// Forecast valid time (upstream publishes UTC).
    pub timestamp: DateTime<Utc>,
    /// Global horizontal irradiance accumulated over the preceding hour, Wh/m².
    pub irradiance_wh_m2: f64,
    /// Air temperature 2 m above ground, °C, before any configured offset.
    pub temperature_c: f64,
    /// Surface pressure (reduced), hPa.
    pub pressure_hpa: f64,
    /// Wind speed, m/s.
    pub wind_speed_ms: f64,
}

/// Content identity of a fetched document, used to detect unchanged upstream
/// data without re-parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of a raw payload (SHA-256, hex).
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One complete, internally consistent parse result, published as a unit.
///
/// Timestamps are strictly increasing but may have gaps where upstream data
/// was missing. Consumers only ever receive this behind an `Arc`; nothing
/// mutates a snapshot after construction.
#[derive(Debug, Clone)]
pub struct ForecastSnapshot {
    fetched_at: DateTime<Utc>,
    fingerprint: Fingerprint,
    observations: Vec<WeatherObservation>,
}

impl ForecastSnapshot {
    pub fn new(
        fetched_at: DateTime<Utc>,
        fingerprint: Fingerprint,
        observations: Vec<WeatherObservation>,
    ) -> Self {
        assert!(
            observations.windows(2).all(|w| w[0].timestamp < w[1].timestamp),
            "snapshot timestamps must be strictly increasing"
        );
        Self {
            fetched_at,
            fingerprint,
            observations,
        }
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn observations(&self) -> &[WeatherObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn observation(hour: u32) -> WeatherObservation {
        WeatherObservation {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
            irradiance_wh_m2: 100.0,
            temperature_c: 15.0,
            pressure_hpa: 1013.0,
            wind_speed_ms: 2.0,
        }
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn snapshot_rejects_unsorted_observations() {
        ForecastSnapshot::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            Fingerprint::of_bytes(b"unsorted"),
            vec![observation(11), observation(10)],
        );
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn snapshot_rejects_duplicate_timestamps() {
        ForecastSnapshot::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            Fingerprint::of_bytes(b"duplicate"),
            vec![observation(10), observation(10)],
        );
    }

    #[test]
    fn fingerprint_is_stable_for_identical_content() {
        let a = Fingerprint::of_bytes(b"forecast body");
        let b = Fingerprint::of_bytes(b"forecast body");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_differs_for_different_content() {
        let a = Fingerprint::of_bytes(b"monday run");
        let b = Fingerprint::of_bytes(b"tuesday run");
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }
}
