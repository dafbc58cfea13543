//! Weather-to-power simulation stage.
//!
//! Pure and deterministic: the same snapshot, system and model always yield
//! the same records, one per observation, in timestamp order.

use chrono::Datelike;
use tracing::debug;

use crate::domain::{ForecastSnapshot, SimulatedRecord, SystemDescription};
use crate::model::{solar, ModelInput, PowerModel};

/// Run every observation in the snapshot through the power model.
pub fn simulate(
    snapshot: &ForecastSnapshot,
    system: &SystemDescription,
    model: &dyn PowerModel,
) -> Vec<SimulatedRecord> {
    let records: Vec<SimulatedRecord> = snapshot
        .observations()
        .iter()
        .map(|observation| {
            let temperature_adjusted_c = observation.temperature_c + system.temperature_offset_c;
            let sun = solar::sun_position(
                observation.timestamp,
                system.latitude_deg,
                system.longitude_deg,
            );

            let estimate = model.estimate(&ModelInput {
                irradiance_wh_m2: observation.irradiance_wh_m2,
                temperature_c: temperature_adjusted_c,
                wind_speed_ms: observation.wind_speed_ms,
                pressure_hpa: observation.pressure_hpa,
                sun,
                day_of_year: observation.timestamp.ordinal(),
            });

            SimulatedRecord {
                observation: observation.clone(),
                temperature_adjusted_c,
                simplified_energy_wh: observation.irradiance_wh_m2
                    * system.simple_multiplication_factor,
                ac_power_w: estimate.ac_power_w,
                dc_power_w: estimate.dc_power_w,
                cell_temperature_c: estimate.cell_temperature_c,
            }
        })
        .collect();

    debug!(
        records = records.len(),
        fingerprint = %snapshot.fingerprint(),
        "simulation pass complete"
    );
    records
}
