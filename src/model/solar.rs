//! Solar position from timestamp and location.
//!
//! Declination/hour-angle geometry; accurate to a fraction of a degree, which
//! is plenty for hourly energy estimates. All angles in degrees.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Angle above the horizon (negative below).
    pub elevation_deg: f64,
    /// Complement of elevation.
    pub zenith_deg: f64,
    /// Degrees from north, clockwise (90 = east, 180 = south).
    pub azimuth_deg: f64,
}

impl SunPosition {
    pub fn is_up(&self) -> bool {
        self.elevation_deg > 0.0
    }
}

/// Compute the sun's position for a UTC timestamp at the given coordinates.
///
/// Pure function of time and location; recomputed per observation timestamp
/// on every simulation pass rather than cached against fetch state.
pub fn sun_position(time: DateTime<Utc>, latitude_deg: f64, longitude_deg: f64) -> SunPosition {
    let day_of_year = time.ordinal() as f64;
    let utc_hour = time.hour() as f64 + time.minute() as f64 / 60.0;

    // Declination swings between ±23.45° over the year.
    let declination_deg = 23.45 * (360.0 / 365.0 * (day_of_year + 284.0) * PI / 180.0).sin();
    let declination_rad = declination_deg * PI / 180.0;
    let latitude_rad = latitude_deg * PI / 180.0;

    // Hour angle relative to local solar noon. Working in UTC, the
    // longitude correction is the whole timezone story.
    let solar_time = utc_hour + longitude_deg / 15.0;
    let hour_angle_deg = 15.0 * (solar_time - 12.0);
    let hour_angle_rad = hour_angle_deg * PI / 180.0;

    let elevation_sin = latitude_rad.sin() * declination_rad.sin()
        + latitude_rad.cos() * declination_rad.cos() * hour_angle_rad.cos();
    let elevation_rad = elevation_sin.clamp(-1.0, 1.0).asin();
    let elevation_deg = elevation_rad * 180.0 / PI;

    let azimuth_cos = (declination_rad.sin() - latitude_rad.sin() * elevation_rad.sin())
        / (latitude_rad.cos() * elevation_rad.cos());
    let mut azimuth_deg = azimuth_cos.clamp(-1.0, 1.0).acos() * 180.0 / PI;

    // Afternoon: sun is in the western half of the sky.
    if hour_angle_deg > 0.0 {
        azimuth_deg = 360.0 - azimuth_deg;
    }

    SunPosition {
        elevation_deg,
        zenith_deg: 90.0 - elevation_deg,
        azimuth_deg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn summer_noon_munich_is_high_and_south() {
        // Solar noon in Munich (11.6°E) is ~11:14 UTC.
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 11, 14, 0).unwrap();
        let sun = sun_position(t, 48.14, 11.58);

        assert!(sun.elevation_deg > 60.0 && sun.elevation_deg < 70.0);
        assert!(sun.azimuth_deg > 160.0 && sun.azimuth_deg < 200.0);
        assert!(sun.is_up());
    }

    #[test]
    fn midnight_is_below_horizon() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 23, 0, 0).unwrap();
        let sun = sun_position(t, 48.14, 11.58);
        assert!(!sun.is_up());
        assert!(sun.zenith_deg > 90.0);
    }

    #[test]
    fn winter_noon_is_much_lower_than_summer() {
        let summer = sun_position(
            Utc.with_ymd_and_hms(2024, 6, 21, 11, 14, 0).unwrap(),
            48.14,
            11.58,
        );
        let winter = sun_position(
            Utc.with_ymd_and_hms(2024, 12, 21, 11, 14, 0).unwrap(),
            48.14,
            11.58,
        );
        assert!(summer.elevation_deg > winter.elevation_deg + 40.0);
    }

    #[test]
    fn morning_sun_is_east_afternoon_sun_is_west() {
        let morning = sun_position(
            Utc.with_ymd_and_hms(2024, 6, 21, 5, 0, 0).unwrap(),
            48.14,
            11.58,
        );
        let afternoon = sun_position(
            Utc.with_ymd_and_hms(2024, 6, 21, 16, 0, 0).unwrap(),
            48.14,
            11.58,
        );
        assert!(morning.azimuth_deg < 180.0);
        assert!(afternoon.azimuth_deg > 180.0);
    }
}
