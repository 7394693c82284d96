//! # Conductor Data
//!
//! Low-voltage cable properties shared by the cable sizing and short-circuit
//! calculators: standard cross sections, current-carrying capacity, and
//! per-metre impedance. All values are SI (m², Ω/m, A).
//!
//! ## References
//!
//! - IEC 60364-5-52 Table B.52.4: PVC insulation, copper, reference method C,
//!   30 °C ambient
//! - CEI 64-8: resistivity at conductor operating temperature

use serde::{Deserialize, Serialize};

use crate::parse::FormOption;

/// Standard cross sections (mm²)
pub const STANDARD_SECTIONS_MM2: [f64; 15] = [
    1.5, 2.5, 4.0, 6.0, 10.0, 16.0, 25.0, 35.0, 50.0, 70.0, 95.0, 120.0, 150.0, 185.0, 240.0,
];

/// Copper ampacity (A), method C, two loaded conductors
const AMPACITY_TWO_LOADED_A: [f64; 15] = [
    19.5, 27.0, 36.0, 46.0, 63.0, 85.0, 112.0, 138.0, 168.0, 213.0, 258.0, 299.0, 344.0, 392.0, 461.0,
];

/// Copper ampacity (A), method C, three loaded conductors
const AMPACITY_THREE_LOADED_A: [f64; 15] = [
    17.5, 24.0, 32.0, 41.0, 57.0, 76.0, 96.0, 119.0, 144.0, 184.0, 223.0, 259.0, 299.0, 341.0, 403.0,
];

/// Series reactance of a low-voltage cable (Ω/m)
pub const REACTANCE_OHM_PER_M: f64 = 0.08e-3;

const MM2_TO_M2: f64 = 1.0e-6;

/// Supply arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplySystem {
    /// Phase + neutral
    SinglePhase,
    /// Three phases, line-to-line voltage
    ThreePhase,
}

impl FormOption for SupplySystem {
    const OPTIONS: &'static [(&'static str, Self)] = &[
        ("single", SupplySystem::SinglePhase),
        ("three", SupplySystem::ThreePhase),
    ];
}

impl SupplySystem {
    /// Current drawn by `power_w` at `voltage_v` and power factor `cos_phi`
    pub fn line_current(self, power_w: f64, voltage_v: f64, cos_phi: f64) -> f64 {
        let apparent_divisor = match self {
            SupplySystem::SinglePhase => voltage_v * cos_phi,
            SupplySystem::ThreePhase => 3f64.sqrt() * voltage_v * cos_phi,
        };
        if apparent_divisor > 0.0 {
            power_w / apparent_divisor
        } else {
            0.0
        }
    }

    /// Voltage drop multiplier (2 for the outgoing and return path, √3 for
    /// a balanced three-phase line)
    pub fn drop_factor(self) -> f64 {
        match self {
            SupplySystem::SinglePhase => 2.0,
            SupplySystem::ThreePhase => 3f64.sqrt(),
        }
    }

    /// Conductors carrying the load current
    pub fn loaded_conductors(self) -> f64 {
        match self {
            SupplySystem::SinglePhase => 2.0,
            SupplySystem::ThreePhase => 3.0,
        }
    }
}

/// Conductor metal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductorMaterial {
    Copper,
    Aluminium,
}

impl FormOption for ConductorMaterial {
    const OPTIONS: &'static [(&'static str, Self)] = &[
        ("copper", ConductorMaterial::Copper),
        ("aluminium", ConductorMaterial::Aluminium),
    ];
}

impl ConductorMaterial {
    /// Resistivity at operating temperature (Ω·m)
    pub fn resistivity(self) -> f64 {
        match self {
            ConductorMaterial::Copper => 0.0225e-6,
            ConductorMaterial::Aluminium => 0.036e-6,
        }
    }

    /// Ampacity relative to copper of the same section
    pub fn ampacity_factor(self) -> f64 {
        match self {
            ConductorMaterial::Copper => 1.0,
            ConductorMaterial::Aluminium => 0.78,
        }
    }

    /// Resistance per metre of one conductor of `section_m2`
    pub fn resistance_per_m(self, section_m2: f64) -> f64 {
        if section_m2 > 0.0 {
            self.resistivity() / section_m2
        } else {
            0.0
        }
    }
}

/// Installation method per IEC 60364-5-52, as a factor on method C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallationMethod {
    /// Insulated conductors in conduit in a thermally insulated wall
    A1,
    /// Insulated conductors in conduit on a wall
    B1,
    /// Single or multi-core cable clipped direct to a wall
    C,
    /// Multi-core cable in ducts in the ground
    D,
    /// Multi-core cable in free air or on perforated tray
    E,
}

impl FormOption for InstallationMethod {
    const OPTIONS: &'static [(&'static str, Self)] = &[
        ("a1", InstallationMethod::A1),
        ("b1", InstallationMethod::B1),
        ("c", InstallationMethod::C),
        ("d", InstallationMethod::D),
        ("e", InstallationMethod::E),
    ];
}

impl InstallationMethod {
    /// Derating relative to reference method C
    pub fn factor(self) -> f64 {
        match self {
            InstallationMethod::A1 => 0.76,
            InstallationMethod::B1 => 0.89,
            InstallationMethod::C => 1.0,
            InstallationMethod::D => 0.93,
            InstallationMethod::E => 1.06,
        }
    }
}

/// Section in m² of the standard size at `index`
pub fn standard_section_m2(index: usize) -> f64 {
    STANDARD_SECTIONS_MM2[index] * MM2_TO_M2
}

/// Index of the smallest standard section of at least `section_m2`;
/// `None` above the largest tabulated size.
pub fn standard_index_at_least(section_m2: f64) -> Option<usize> {
    STANDARD_SECTIONS_MM2
        .iter()
        .position(|&mm2| mm2 * MM2_TO_M2 >= section_m2 * (1.0 - 1e-9))
}

/// Current-carrying capacity (A) of the standard section at `index`.
pub fn ampacity(
    index: usize,
    system: SupplySystem,
    material: ConductorMaterial,
    installation: InstallationMethod,
) -> f64 {
    let base = match system {
        SupplySystem::SinglePhase => AMPACITY_TWO_LOADED_A[index],
        SupplySystem::ThreePhase => AMPACITY_THREE_LOADED_A[index],
    };
    base * material.ampacity_factor() * installation.factor()
}
