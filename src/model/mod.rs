//! Power model boundary.
//!
//! The core pipeline never branches on module or inverter identifier strings;
//! it resolves them once at startup into a boxed [`PowerModel`] and from then
//! on only calls the trait.

pub mod pv;
pub mod registry;
pub mod solar;

use crate::domain::SystemDescription;
use crate::error::ConfigError;

pub use solar::{sun_position, SunPosition};

/// Everything the model receives for one forecast timestamp.
#[derive(Debug, Clone, Copy)]
pub struct ModelInput {
    /// Hourly-accumulated GHI, Wh/m². Treated as the mean irradiance in W/m²
    /// over the hour.
    pub irradiance_wh_m2: f64,
    /// Ambient temperature after the configured offset, °C.
    pub temperature_c: f64,
    pub wind_speed_ms: f64,
    pub pressure_hpa: f64,
    pub sun: SunPosition,
    /// Day of year, for the extraterrestrial irradiance correction.
    pub day_of_year: u32,
}

/// Model output for one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerEstimate {
    pub ac_power_w: f64,
    pub dc_power_w: f64,
    pub cell_temperature_c: f64,
}

/// Maps weather plus sun geometry to power and cell temperature. Pure: no
/// clock reads, no I/O, identical inputs give identical outputs.
pub trait PowerModel: Send + Sync {
    fn estimate(&self, input: &ModelInput) -> PowerEstimate;
}

impl std::fmt::Debug for dyn PowerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PowerModel")
    }
}

/// Resolve the configured module/inverter identifiers into a concrete model.
/// Unknown identifiers are fatal configuration errors.
pub fn resolve(system: &SystemDescription) -> Result<Box<dyn PowerModel>, ConfigError> {
    let module = registry::lookup_module(&system.module)
        .ok_or_else(|| ConfigError::UnknownModule(system.module.clone()))?;
    let inverter = registry::lookup_inverter(&system.inverter)
        .ok_or_else(|| ConfigError::UnknownInverter(system.inverter.clone()))?;

    Ok(Box::new(pv::FixedArrayModel::new(
        module,
        inverter,
        system.surface_tilt_deg,
        system.surface_azimuth_deg,
        system.albedo,
        system.module_count(),
    )))
}
