//! # Short-Circuit Current
//!
//! Prospective fault current at the end of a low-voltage line fed by an
//! MV/LV transformer, using the simplified IEC 60909 impedance chain.
//!
//! ## Method
//!
//! - Transformer: `Zt = ucc · V² / Sn`, `Rt = Pcu · V² / Sn²`,
//!   `Xt = √(Zt² − Rt²)`
//! - Cable (per phase): `Rc = ρ L / S`, `Xc = 0.08 mΩ/m · L`
//! - Three-phase: `Ik3 = c_max · V / (√3 · |Zt + Zc|)`, `c_max = 1.05`
//! - Phase-to-neutral: `Ik1 = c_min · V / (√3 · |Zt + 2 Zc|)`, `c_min = 0.95`
//! - Peak: `ip = κ √2 Ik3`, `κ = 1.02 + 0.98 e^(−3R/X)`
//!
//! Upstream network impedance is neglected, which overestimates the fault
//! current slightly.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::short_circuit::{calculate, ShortCircuitInput};
//!
//! // 630 kVA, 400 V, ucc 4 %, 20 m of 95 mm² copper
//! let result = calculate(&ShortCircuitInput::default()).unwrap();
//! assert!((result.ik3_a / 1000.0 - 17.86).abs() < 0.01);
//!
//! let dead = ShortCircuitInput { voltage_v: 0.0, ..ShortCircuitInput::default() };
//! assert!(calculate(&dead).is_none());
//! ```

use serde::{Deserialize, Serialize};

use super::conductors::{ConductorMaterial, REACTANCE_OHM_PER_M};
use super::{Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, FormatSettings, SummaryRow};
use crate::parse::RawInputs;
use crate::units::tables::{AREA, LENGTH};
use crate::warnings::WarningRule;

/// Voltage factor for maximum fault current
pub const C_MAX: f64 = 1.05;

/// Voltage factor for minimum fault current
pub const C_MIN: f64 = 0.95;

/// Making capacity as a multiple of breaking capacity (IEC 60947-2,
/// 20–50 kA range)
pub const MAKING_CAPACITY_RATIO: f64 = 2.1;

/// Below this fraction of the terminal current the cable dominates the loop
const CABLE_DOMINANCE_RATIO: f64 = 0.2;

/// Inputs for a short-circuit calculation (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortCircuitInput {
    /// Transformer rated power Sn (VA)
    pub rating_va: f64,
    /// Secondary line-to-line voltage (V)
    pub voltage_v: f64,
    /// Short-circuit voltage ucc (%)
    pub ucc_percentage: f64,
    /// Load (copper) losses Pcu (W); 0 neglects transformer resistance
    pub load_losses_w: f64,
    /// Cable length from the transformer to the fault (m)
    pub length_m: f64,
    /// Phase conductor section (m²)
    pub section_m2: f64,
    /// Conductor metal
    pub material: ConductorMaterial,
    /// Breaking capacity of the protective device (A)
    pub breaking_capacity_a: f64,
}

impl Default for ShortCircuitInput {
    fn default() -> Self {
        ShortCircuitInput {
            rating_va: 630_000.0,
            voltage_v: 400.0,
            ucc_percentage: 4.0,
            load_losses_w: 6_500.0,
            length_m: 20.0,
            section_m2: 95.0e-6,
            material: ConductorMaterial::Copper,
            breaking_capacity_a: 25_000.0,
        }
    }
}

impl ShortCircuitInput {
    /// Build from form fields: `rating` (kVA), `voltage` (V), `ucc` (%),
    /// `load_losses` (W), `length` + `length_unit`, `section` (mm²),
    /// `material`, `breaking_capacity` (kA).
    pub fn from_raw(raw: &RawInputs) -> CalcResult<Self> {
        let d = ShortCircuitInput::default();
        Ok(ShortCircuitInput {
            rating_va: raw.number("rating", d.rating_va / 1_000.0) * 1_000.0,
            voltage_v: raw.number("voltage", d.voltage_v),
            ucc_percentage: raw.number("ucc", d.ucc_percentage),
            load_losses_w: raw.number("load_losses", d.load_losses_w).max(0.0),
            length_m: raw.measure("length", d.length_m, "length_unit", &LENGTH, "m")?.max(0.0),
            section_m2: AREA.to_canonical(raw.number("section", 95.0), "mm2")?,
            material: raw.option("material", d.material)?,
            breaking_capacity_a: raw.number("breaking_capacity", d.breaking_capacity_a / 1_000.0) * 1_000.0,
        })
    }
}

/// Fault currents and loop impedances (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortCircuitResult {
    /// Transformer impedance Zt (Ω)
    pub transformer_impedance_ohm: f64,
    /// Transformer resistance Rt (Ω)
    pub transformer_resistance_ohm: f64,
    /// Transformer reactance Xt (Ω)
    pub transformer_reactance_ohm: f64,
    /// Cable resistance per phase (Ω)
    pub cable_resistance_ohm: f64,
    /// Cable reactance per phase (Ω)
    pub cable_reactance_ohm: f64,
    /// |Zt + Zc| (Ω)
    pub loop_impedance_ohm: f64,
    /// Three-phase current at the transformer terminals (A)
    pub ik3_terminal_a: f64,
    /// Maximum three-phase current at the fault (A)
    pub ik3_a: f64,
    /// Minimum phase-to-neutral current at the fault (A)
    pub ik1_a: f64,
    /// Peak factor κ
    pub kappa: f64,
    /// Peak current ip (A)
    pub peak_current_a: f64,
    /// Breaking capacity of the protective device (A)
    pub breaking_capacity_a: f64,
}

impl ShortCircuitResult {
    /// True when the device can interrupt the maximum fault current
    pub fn breaking_capacity_adequate(&self) -> bool {
        self.breaking_capacity_a >= self.ik3_a
    }
}

/// Evaluate the fault chain; `None` when V, Sn, ucc or the section is not
/// positive.
pub fn calculate(input: &ShortCircuitInput) -> Option<ShortCircuitResult> {
    if input.voltage_v <= 0.0
        || input.rating_va <= 0.0
        || input.ucc_percentage <= 0.0
        || input.section_m2 <= 0.0
    {
        return None;
    }

    let v2 = input.voltage_v * input.voltage_v;
    let zt = input.ucc_percentage / 100.0 * v2 / input.rating_va;
    // Losses larger than ucc allows would make Xt imaginary
    let rt = (input.load_losses_w * v2 / (input.rating_va * input.rating_va)).min(zt);
    let xt = (zt * zt - rt * rt).max(0.0).sqrt();

    let rc = input.material.resistance_per_m(input.section_m2) * input.length_m;
    let xc = REACTANCE_OHM_PER_M * input.length_m;

    let r = rt + rc;
    let x = xt + xc;
    let loop_impedance_ohm = r.hypot(x);
    let single_phase_loop_ohm = (rt + 2.0 * rc).hypot(xt + 2.0 * xc);

    let phase_voltage = input.voltage_v / 3f64.sqrt();
    let ik3_a = C_MAX * phase_voltage / loop_impedance_ohm;
    let ik3_terminal_a = C_MAX * phase_voltage / zt;
    let ik1_a = C_MIN * phase_voltage / single_phase_loop_ohm;

    // Purely resistive loop: e^(−∞) = 0
    let kappa = if x > 0.0 {
        1.02 + 0.98 * (-3.0 * r / x).exp()
    } else {
        1.02
    };

    Some(ShortCircuitResult {
        transformer_impedance_ohm: zt,
        transformer_resistance_ohm: rt,
        transformer_reactance_ohm: xt,
        cable_resistance_ohm: rc,
        cable_reactance_ohm: xc,
        loop_impedance_ohm,
        ik3_terminal_a,
        ik3_a,
        ik1_a,
        kappa,
        peak_current_a: kappa * 2f64.sqrt() * ik3_a,
        breaking_capacity_a: input.breaking_capacity_a,
    })
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<ShortCircuitResult>] = &[
    WarningRule::new(
        |r: &ShortCircuitResult| !r.breaking_capacity_adequate(),
        |r: &ShortCircuitResult| {
            format!(
                "Potere di interruzione {:.1} kA inferiore alla corrente di cortocircuito presunta {:.2} kA.",
                r.breaking_capacity_a / 1_000.0,
                r.ik3_a / 1_000.0
            )
        },
    ),
    WarningRule::new(
        |r: &ShortCircuitResult| r.peak_current_a > MAKING_CAPACITY_RATIO * r.breaking_capacity_a,
        |r: &ShortCircuitResult| {
            format!(
                "Corrente di picco {:.1} kA oltre il potere di chiusura stimato ({:.1} kA).",
                r.peak_current_a / 1_000.0,
                MAKING_CAPACITY_RATIO * r.breaking_capacity_a / 1_000.0
            )
        },
    ),
    WarningRule::new(
        |r: &ShortCircuitResult| r.ik3_a < CABLE_DOMINANCE_RATIO * r.ik3_terminal_a,
        |_: &ShortCircuitResult| {
            "L'impedenza del cavo prevale su quella del trasformatore: verificare l'intervento delle protezioni con la corrente minima."
                .to_string()
        },
    ),
];

/// Pipeline adapter for [`Domain::ShortCircuit`]
pub struct ShortCircuitCalculator;

impl Calculator for ShortCircuitCalculator {
    const DOMAIN: Domain = Domain::ShortCircuit;
    type Input = ShortCircuitInput;
    type Output = ShortCircuitResult;

    fn normalize(raw: &RawInputs) -> CalcResult<ShortCircuitInput> {
        ShortCircuitInput::from_raw(raw)
    }

    fn evaluate(input: &ShortCircuitInput) -> Option<ShortCircuitResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<ShortCircuitResult>] {
        RULES
    }

    fn summary(r: &ShortCircuitResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let d = format.decimals();
        let l = format.locale;
        vec![
            format_row("Ik3 massima", r.ik3_a / 1_000.0, "kA", d, l),
            format_row("Ik1 minima", r.ik1_a / 1_000.0, "kA", d, l),
            format_row("Corrente di picco (ip)", r.peak_current_a / 1_000.0, "kA", d, l),
            format_row("Fattore di picco κ", r.kappa, "", 3, l),
            format_row("Ik3 ai morsetti", r.ik3_terminal_a / 1_000.0, "kA", d, l),
            format_row("Impedenza trasformatore", r.transformer_impedance_ohm * 1_000.0, "mΩ", d, l),
            format_row("Impedenza totale", r.loop_impedance_ohm * 1_000.0, "mΩ", d, l),
        ]
    }
}
