//! Static description of the physical PV installation.

use chrono_tz::Tz;

/// Read-only process-wide configuration for one installation, loaded once at
/// startup. The simulation stage and the power model only ever borrow this.
#[derive(Debug, Clone)]
pub struct SystemDescription {
    /// Latitude in degrees, positive north.
    pub latitude_deg: f64,
    /// Longitude in degrees, positive east.
    pub longitude_deg: f64,
    /// Site altitude above sea level, m.
    pub altitude_m: f64,
    /// Panel tilt from horizontal, degrees.
    pub surface_tilt_deg: f64,
    /// Panel azimuth, degrees from north (180 = south).
    pub surface_azimuth_deg: f64,
    /// Modules wired per string.
    pub modules_per_string: u32,
    /// Parallel strings on the inverter.
    pub strings: u32,
    /// Ground reflectance (0.0-1.0).
    pub albedo: f64,
    /// Module identifier resolved against the built-in parameter registry.
    pub module: String,
    /// Inverter identifier resolved against the built-in parameter registry.
    pub inverter: String,
    /// Local timezone of the installation (reporting only; upstream data is UTC).
    pub timezone: Tz,
    /// Offset added to the raw upstream temperature before simulation, °C.
    pub temperature_offset_c: f64,
    /// Linear Wh-per-irradiance factor for the simplified energy estimate.
    pub simple_multiplication_factor: f64,
}

impl SystemDescription {
    /// Total nameplate module count.
    pub fn module_count(&self) -> u32 {
        self.modules_per_string * self.strings
    }
}
