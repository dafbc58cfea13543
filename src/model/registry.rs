//! Built-in module and inverter parameter sets.
//!
//! A deliberately small catalogue keyed by the identifier strings used in the
//! configuration file. Lookup happens exactly once at startup; an identifier
//! not listed here is a fatal configuration error rather than a silent
//! fallback to some "typical" panel.

/// Datasheet parameters for one module type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleParams {
    pub id: &'static str,
    /// Nameplate DC power at STC, W.
    pub pdc0_w: f64,
    /// Power temperature coefficient, 1/°C (negative).
    pub gamma_pdc: f64,
}

/// Datasheet parameters for one inverter type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverterParams {
    pub id: &'static str,
    /// Rated AC output power, W. DC in excess of this is clipped.
    pub paco_w: f64,
    /// Nominal conversion efficiency.
    pub eta_nom: f64,
}

const MODULES: &[ModuleParams] = &[
    ModuleParams {
        id: "LG_Electronics_Inc__LG335E1C_A5",
        pdc0_w: 335.0,
        gamma_pdc: -0.0036,
    },
    ModuleParams {
        id: "Trina_Solar_TSM_300DEG5C_07_II",
        pdc0_w: 300.0,
        gamma_pdc: -0.0037,
    },
    ModuleParams {
        id: "SunPower_SPR_X21_345",
        pdc0_w: 345.0,
        gamma_pdc: -0.0029,
    },
    ModuleParams {
        id: "Canadian_Solar_Inc__CS6K_280M",
        pdc0_w: 280.0,
        gamma_pdc: -0.0039,
    },
];

const INVERTERS: &[InverterParams] = &[
    InverterParams {
        id: "SMA_America__SB10000TL_US__240V_",
        paco_w: 10000.0,
        eta_nom: 0.974,
    },
    InverterParams {
        id: "Fronius_International_GmbH__Fronius_Symo_8_2_3_M",
        paco_w: 8200.0,
        eta_nom: 0.975,
    },
    InverterParams {
        id: "SolarEdge_Technologies_Ltd__SE7600A_US",
        paco_w: 7600.0,
        eta_nom: 0.980,
    },
];

pub fn lookup_module(id: &str) -> Option<ModuleParams> {
    MODULES.iter().copied().find(|m| m.id == id)
}

pub fn lookup_inverter(id: &str) -> Option<InverterParams> {
    INVERTERS.iter().copied().find(|i| i.id == id)
}
