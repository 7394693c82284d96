//! # Cable Sizing
//!
//! Selects a low-voltage cable cross section for a load, checking both the
//! current-carrying capacity and the voltage drop.
//!
//! ## Method
//!
//! - Design current: `Ib = P / (V cos φ)` single-phase,
//!   `Ib = P / (√3 V cos φ)` three-phase
//! - Capacity: `Iz` from the standard table, derated for material and
//!   installation method
//! - Voltage drop: `ΔV = k L Ib (R' cos φ + X' sin φ)`, `k = 2` or `√3`
//! - Automatic sizing walks the standard sections from the smallest and
//!   keeps the first one satisfying `Ib ≤ Iz` and `ΔV% ≤ limit`
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::cable_sizing::{calculate, CableSizingInput};
//!
//! let input = CableSizingInput::default(); // 10 kW, 400 V three-phase, 50 m
//! let result = calculate(&input).unwrap();
//! assert!(result.design_current_a > 16.0 && result.design_current_a < 16.1);
//! assert!(result.utilization_percentage <= 100.0);
//! assert!(result.voltage_drop_percentage <= 4.0);
//! ```

use serde::{Deserialize, Serialize};

use super::conductors::{
    ampacity, standard_index_at_least, standard_section_m2, ConductorMaterial,
    InstallationMethod, SupplySystem, REACTANCE_OHM_PER_M, STANDARD_SECTIONS_MM2,
};
use super::{Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, FormatSettings, SummaryRow};
use crate::parse::RawInputs;
use crate::units::tables::{AREA, LENGTH, POWER};
use crate::warnings::WarningRule;

/// Inputs for cable sizing (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CableSizingInput {
    /// Active power of the load (W)
    pub power_w: f64,
    /// Supply voltage (V), line-to-line for three-phase
    pub voltage_v: f64,
    /// Supply arrangement
    pub system: SupplySystem,
    /// Load power factor, 0.5 to 1
    pub cos_phi: f64,
    /// One-way cable length (m)
    pub length_m: f64,
    /// Admissible voltage drop (%)
    pub max_voltage_drop_percentage: f64,
    /// Conductor metal
    pub material: ConductorMaterial,
    /// Installation method
    pub installation: InstallationMethod,
    /// Fixed cross section (m²); `None` selects automatically
    pub fixed_section_m2: Option<f64>,
}

impl Default for CableSizingInput {
    fn default() -> Self {
        CableSizingInput {
            power_w: 10_000.0,
            voltage_v: 400.0,
            system: SupplySystem::ThreePhase,
            cos_phi: 0.9,
            length_m: 50.0,
            max_voltage_drop_percentage: 4.0,
            material: ConductorMaterial::Copper,
            installation: InstallationMethod::C,
            fixed_section_m2: None,
        }
    }
}

impl CableSizingInput {
    /// Build from form fields.
    ///
    /// | field | unit field | default |
    /// |---|---|---|
    /// | `power` | `power_unit` (kw) | 10 kW |
    /// | `voltage` | | 400 V |
    /// | `system` | | `three` |
    /// | `cos_phi` | | 0.9, clamped 0.5–1 |
    /// | `length` | `length_unit` (m) | 50 m |
    /// | `max_drop` | | 4 %, clamped 0.5–10 |
    /// | `material` | | `copper` |
    /// | `installation` | | `c` |
    /// | `section` | (mm²) | 0 = automatic; rounded up to a standard size |
    pub fn from_raw(raw: &RawInputs) -> CalcResult<Self> {
        let d = CableSizingInput::default();
        let section_mm2 = raw.number("section", 0.0);
        Ok(CableSizingInput {
            power_w: raw.measure("power", 10.0, "power_unit", &POWER, "kw")?,
            voltage_v: raw.number("voltage", d.voltage_v),
            system: raw.option("system", d.system)?,
            cos_phi: raw.bounded("cos_phi", d.cos_phi, 0.5, 1.0),
            length_m: raw.measure("length", d.length_m, "length_unit", &LENGTH, "m")?,
            max_voltage_drop_percentage: raw.bounded("max_drop", d.max_voltage_drop_percentage, 0.5, 10.0),
            material: raw.option("material", d.material)?,
            installation: raw.option("installation", d.installation)?,
            fixed_section_m2: if section_mm2 > 0.0 {
                Some(AREA.to_canonical(section_mm2, "mm2")?)
            } else {
                None
            },
        })
    }
}

/// Cable sizing results (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CableSizingResult {
    /// Design current Ib (A)
    pub design_current_a: f64,
    /// Selected cross section (m²)
    pub section_m2: f64,
    /// Derated current-carrying capacity Iz (A)
    pub ampacity_a: f64,
    /// Ib / Iz × 100
    pub utilization_percentage: f64,
    /// Voltage drop at the load end (V)
    pub voltage_drop_v: f64,
    /// Voltage drop relative to supply voltage (%)
    pub voltage_drop_percentage: f64,
    /// Admissible voltage drop (%)
    pub max_voltage_drop_percentage: f64,
    /// Resistance of one conductor over the run (Ω)
    pub conductor_resistance_ohm: f64,
    /// Joule losses in the loaded conductors (W)
    pub power_loss_w: f64,
    /// True when the section satisfies both checks
    pub section_adequate: bool,
    /// True when the section was chosen automatically
    pub automatic: bool,
}

/// Per-section evaluation
struct SectionCheck {
    section_m2: f64,
    ampacity_a: f64,
    drop_v: f64,
    resistance_ohm: f64,
}

fn check_section(input: &CableSizingInput, index: usize, ib: f64, sin_phi: f64) -> SectionCheck {
    let section_m2 = standard_section_m2(index);
    let r_per_m = input.material.resistance_per_m(section_m2);
    let drop_v = input.system.drop_factor()
        * input.length_m
        * ib
        * (r_per_m * input.cos_phi + REACTANCE_OHM_PER_M * sin_phi);
    SectionCheck {
        section_m2,
        ampacity_a: ampacity(index, input.system, input.material, input.installation),
        drop_v,
        resistance_ohm: r_per_m * input.length_m,
    }
}

/// Size the cable; `None` when power, voltage or length is not positive,
/// or a fixed section is larger than the biggest standard size.
pub fn calculate(input: &CableSizingInput) -> Option<CableSizingResult> {
    if input.power_w <= 0.0 || input.voltage_v <= 0.0 || input.length_m <= 0.0 {
        return None;
    }

    let ib = input.system.line_current(input.power_w, input.voltage_v, input.cos_phi);
    let sin_phi = (1.0 - input.cos_phi * input.cos_phi).max(0.0).sqrt();
    let max_drop_v = input.voltage_v * input.max_voltage_drop_percentage / 100.0;
    let passes = |c: &SectionCheck| ib <= c.ampacity_a && c.drop_v <= max_drop_v;

    let (check, automatic) = match input.fixed_section_m2 {
        Some(section_m2) => (check_section(input, standard_index_at_least(section_m2)?, ib, sin_phi), false),
        None => {
            let largest = STANDARD_SECTIONS_MM2.len() - 1;
            let chosen = (0..STANDARD_SECTIONS_MM2.len())
                .map(|i| check_section(input, i, ib, sin_phi))
                .find(|c| passes(c))
                .unwrap_or_else(|| check_section(input, largest, ib, sin_phi));
            (chosen, true)
        }
    };

    // Tabulated ampacities are all positive
    let utilization_percentage = ib / check.ampacity_a * 100.0;

    Some(CableSizingResult {
        design_current_a: ib,
        section_m2: check.section_m2,
        ampacity_a: check.ampacity_a,
        utilization_percentage,
        voltage_drop_v: check.drop_v,
        voltage_drop_percentage: check.drop_v / input.voltage_v * 100.0,
        max_voltage_drop_percentage: input.max_voltage_drop_percentage,
        conductor_resistance_ohm: check.resistance_ohm,
        power_loss_w: input.system.loaded_conductors() * check.resistance_ohm * ib * ib,
        section_adequate: passes(&check),
        automatic,
    })
}

fn section_mm2(r: &CableSizingResult) -> f64 {
    AREA.from_canonical(r.section_m2, "mm2").unwrap_or(r.section_m2 * 1.0e6)
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<CableSizingResult>] = &[
    WarningRule::new(
        |r: &CableSizingResult| r.utilization_percentage > 100.0,
        |r: &CableSizingResult| {
            format!(
                "Corrente di impiego {:.1} A superiore alla portata {:.1} A della sezione {:.1} mm² (utilizzo {:.0}%).",
                r.design_current_a,
                r.ampacity_a,
                section_mm2(r),
                r.utilization_percentage
            )
        },
    ),
    WarningRule::new(
        |r: &CableSizingResult| r.voltage_drop_percentage > r.max_voltage_drop_percentage,
        |r: &CableSizingResult| {
            format!(
                "Caduta di tensione {:.2}% oltre il limite del {:.1}%.",
                r.voltage_drop_percentage, r.max_voltage_drop_percentage
            )
        },
    ),
    WarningRule::new(
        |r: &CableSizingResult| r.automatic && !r.section_adequate,
        |_: &CableSizingResult| {
            "Nessuna sezione standard soddisfa le verifiche: valutare più cavi in parallelo o una tensione superiore."
                .to_string()
        },
    ),
];

/// Pipeline adapter for [`Domain::CableSizing`]
pub struct CableSizingCalculator;

impl Calculator for CableSizingCalculator {
    const DOMAIN: Domain = Domain::CableSizing;
    type Input = CableSizingInput;
    type Output = CableSizingResult;

    fn normalize(raw: &RawInputs) -> CalcResult<CableSizingInput> {
        CableSizingInput::from_raw(raw)
    }

    fn evaluate(input: &CableSizingInput) -> Option<CableSizingResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<CableSizingResult>] {
        RULES
    }

    fn summary(r: &CableSizingResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let d = format.decimals();
        let l = format.locale;
        vec![
            format_row("Corrente di impiego (Ib)", r.design_current_a, "A", d, l),
            format_row("Sezione", section_mm2(r), "mm²", 1, l),
            format_row("Portata (Iz)", r.ampacity_a, "A", 1, l),
            format_row("Utilizzo", r.utilization_percentage, "%", 1, l),
            format_row("Caduta di tensione", r.voltage_drop_v, "V", d, l),
            format_row("Caduta di tensione", r.voltage_drop_percentage, "%", d, l),
            format_row("Perdite", r.power_loss_w, "W", 0, l),
        ]
    }
}
