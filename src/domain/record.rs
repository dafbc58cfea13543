//! Simulation output records and the flat row shape the sinks persist.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::weather::WeatherObservation;

/// A weather observation enriched with simulated power output.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRecord {
    pub observation: WeatherObservation,
    /// Raw upstream temperature plus the configured offset, °C.
    pub temperature_adjusted_c: f64,
    /// `irradiance_wh_m2 * simple_multiplication_factor`, the cheap linear
    /// estimate kept alongside the full model output.
    pub simplified_energy_wh: f64,
    /// AC power from the full PV model, W.
    pub ac_power_w: f64,
    /// DC power at the maximum power point, W.
    pub dc_power_w: f64,
    /// Modeled cell temperature, °C.
    pub cell_temperature_c: f64,
}

/// The eleven-column row shape shared by the CSV file and the database table.
///
/// `forecast_time` and `epoch_s` together form the composite key; `epoch_s`
/// alone is what the database upserts on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRecord {
    pub forecast_time: String,
    pub epoch_s: i64,
    pub irradiance_wh_m2: f64,
    pub temperature_c: f64,
    pub pressure_hpa: f64,
    pub wind_speed_ms: f64,
    pub temperature_adjusted_c: f64,
    pub simplified_energy_wh: f64,
    pub ac_power_w: f64,
    pub dc_power_w: f64,
    pub cell_temperature_c: f64,
}

impl SimulatedRecord {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.observation.timestamp
    }

    /// Flatten for the sinks. The datetime column uses the plain
    /// `YYYY-MM-DD HH:MM:SS.mmm` form, which databases accept without
    /// timezone-suffix quirks.
    pub fn flatten(&self) -> FlatRecord {
        FlatRecord {
            forecast_time: self
                .observation
                .timestamp
                .format("%Y-%m-%d %H:%M:%S%.3f")
                .to_string(),
            epoch_s: self.observation.timestamp.timestamp(),
            irradiance_wh_m2: self.observation.irradiance_wh_m2,
            temperature_c: self.observation.temperature_c,
            pressure_hpa: self.observation.pressure_hpa,
            wind_speed_ms: self.observation.wind_speed_ms,
            temperature_adjusted_c: self.temperature_adjusted_c,
            simplified_energy_wh: self.simplified_energy_wh,
            ac_power_w: self.ac_power_w,
            dc_power_w: self.dc_power_w,
            cell_temperature_c: self.cell_temperature_c,
        }
    }
}
