//! Bundled fixed-array PV model.
//!
//! GHI is decomposed into beam and diffuse with the DISC direct-insolation
//! model (which is where the surface pressure input participates, through
//! absolute air mass), projected onto the tilted plane with an isotropic sky,
//! run through a linear cell temperature model, and clipped at the inverter
//! rating.

use std::f64::consts::PI;

use super::registry::{InverterParams, ModuleParams};
use super::{ModelInput, PowerEstimate, PowerModel};

/// Solar constant, W/m².
const SOLAR_CONSTANT: f64 = 1367.0;
/// Standard sea-level pressure, hPa.
const STANDARD_PRESSURE_HPA: f64 = 1013.25;
/// Below this cosine of zenith the decomposition is numerically meaningless.
const MIN_COS_ZENITH: f64 = 0.065;
/// SAPM open-rack glass/polymer coefficients.
const SAPM_A: f64 = -3.56;
const SAPM_B: f64 = -0.075;
const SAPM_DELTA_T: f64 = 3.0;

pub struct FixedArrayModel {
    module: ModuleParams,
    inverter: InverterParams,
    surface_tilt_deg: f64,
    surface_azimuth_deg: f64,
    albedo: f64,
    module_count: u32,
}

impl FixedArrayModel {
    pub fn new(
        module: ModuleParams,
        inverter: InverterParams,
        surface_tilt_deg: f64,
        surface_azimuth_deg: f64,
        albedo: f64,
        module_count: u32,
    ) -> Self {
        Self {
            module,
            inverter,
            surface_tilt_deg,
            surface_azimuth_deg,
            albedo,
            module_count,
        }
    }

    /// Array nameplate DC power at STC, W.
    fn pdc0_total(&self) -> f64 {
        self.module.pdc0_w * self.module_count as f64
    }

    /// Plane-of-array irradiance in W/m² for the given sky state.
    fn poa_irradiance(&self, input: &ModelInput) -> f64 {
        let ghi = input.irradiance_wh_m2;
        let cos_zenith = (input.sun.zenith_deg * PI / 180.0).cos().max(MIN_COS_ZENITH);

        let (dni, dhi) = disc_decomposition(
            ghi,
            input.sun.zenith_deg,
            cos_zenith,
            input.pressure_hpa,
            input.day_of_year,
        );

        let tilt_rad = self.surface_tilt_deg * PI / 180.0;
        let cos_aoi = cos_angle_of_incidence(
            self.surface_tilt_deg,
            self.surface_azimuth_deg,
            input.sun.zenith_deg,
            input.sun.azimuth_deg,
        );

        let beam = dni * cos_aoi.max(0.0);
        let sky_diffuse = dhi * (1.0 + tilt_rad.cos()) / 2.0;
        let ground = ghi * self.albedo * (1.0 - tilt_rad.cos()) / 2.0;

        (beam + sky_diffuse + ground).max(0.0)
    }
}

impl PowerModel for FixedArrayModel {
    fn estimate(&self, input: &ModelInput) -> PowerEstimate {
        if !input.sun.is_up() || input.irradiance_wh_m2 <= 0.0 {
            return PowerEstimate {
                ac_power_w: 0.0,
                dc_power_w: 0.0,
                cell_temperature_c: input.temperature_c,
            };
        }

        let poa = self.poa_irradiance(input);

        let cell_temperature_c =
            sapm_cell_temperature(poa, input.temperature_c, input.wind_speed_ms);

        // PVWatts-style DC with linear temperature derate.
        let dc_power_w = (self.pdc0_total() * (poa / 1000.0)
            * (1.0 + self.module.gamma_pdc * (cell_temperature_c - 25.0)))
            .max(0.0);

        let ac_power_w = (dc_power_w * self.inverter.eta_nom).min(self.inverter.paco_w);

        PowerEstimate {
            ac_power_w,
            dc_power_w,
            cell_temperature_c,
        }
    }
}

/// DISC model: estimate DNI from GHI, then back out DHI via closure.
///
/// Returns `(dni, dhi)` in W/m².
fn disc_decomposition(
    ghi: f64,
    zenith_deg: f64,
    cos_zenith: f64,
    pressure_hpa: f64,
    day_of_year: u32,
) -> (f64, f64) {
    if ghi <= 0.0 {
        return (0.0, 0.0);
    }

    // Extraterrestrial irradiance with the yearly orbit correction.
    let i0 = SOLAR_CONSTANT * (1.0 + 0.033 * (2.0 * PI * day_of_year as f64 / 365.0).cos());

    let kt = (ghi / (i0 * cos_zenith)).clamp(0.0, 1.0);

    // Kasten-Young relative air mass, pressure-corrected to absolute.
    let am_rel = 1.0 / (cos_zenith + 0.15 * (93.885 - zenith_deg.min(93.0)).powf(-1.253));
    let am = am_rel * pressure_hpa / STANDARD_PRESSURE_HPA;

    let (a, b, c) = if kt <= 0.6 {
        (
            0.512 - 1.56 * kt + 2.286 * kt.powi(2) - 2.222 * kt.powi(3),
            0.37 + 0.962 * kt,
            -0.28 + 0.932 * kt - 2.048 * kt.powi(2),
        )
    } else {
        (
            -5.743 + 21.77 * kt - 27.49 * kt.powi(2) + 11.56 * kt.powi(3),
            41.4 - 118.5 * kt + 66.05 * kt.powi(2) + 31.9 * kt.powi(3),
            -47.01 + 184.2 * kt - 222.0 * kt.powi(2) + 73.81 * kt.powi(3),
        )
    };

    let kn_clear = 0.866 - 0.122 * am + 0.0121 * am.powi(2) - 0.000653 * am.powi(3)
        + 1.4e-5 * am.powi(4);
    let kn = kn_clear - (a + b * (c * am).exp());

    let dni = (kn * i0).clamp(0.0, i0);
    let dhi = (ghi - dni * cos_zenith).max(0.0);
    (dni, dhi)
}

/// Cosine of the angle of incidence between the sun and the panel normal.
fn cos_angle_of_incidence(
    surface_tilt_deg: f64,
    surface_azimuth_deg: f64,
    sun_zenith_deg: f64,
    sun_azimuth_deg: f64,
) -> f64 {
    let tilt = surface_tilt_deg * PI / 180.0;
    let zenith = sun_zenith_deg * PI / 180.0;
    let az_diff = (sun_azimuth_deg - surface_azimuth_deg) * PI / 180.0;

    tilt.cos() * zenith.cos() + tilt.sin() * zenith.sin() * az_diff.cos()
}

/// SAPM open-rack module/cell temperature, °C.
fn sapm_cell_temperature(poa_w_m2: f64, ambient_c: f64, wind_ms: f64) -> f64 {
    let module_temp = poa_w_m2 * (SAPM_A + SAPM_B * wind_ms).exp() + ambient_c;
    module_temp + poa_w_m2 / 1000.0 * SAPM_DELTA_T
}
