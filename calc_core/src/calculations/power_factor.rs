//! # Power Factor Correction
//!
//! Sizes a capacitor bank to raise a load's power factor:
//! `Qc = P (tan φ1 − tan φ2)`, then picks the smallest standard bank of at
//! least `Qc` and reports the power factor actually achieved.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::power_factor::{calculate, PowerFactorInput};
//!
//! // 100 kW from cos φ 0.75 to 0.95: 55.3 kvar needed, 60 kvar bank
//! let result = calculate(&PowerFactorInput::default()).unwrap();
//! assert_eq!(result.bank_var, 60_000.0);
//! assert!(result.achieved_cos_phi > 0.95);
//! ```

use serde::{Deserialize, Serialize};

use super::{Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, FormatSettings, SummaryRow};
use crate::parse::RawInputs;
use crate::units::tables::POWER;
use crate::warnings::WarningRule;

/// Standard capacitor bank ratings (kvar), ascending
pub const STANDARD_BANK_STEPS_KVAR: [f64; 20] = [
    5.0, 10.0, 12.5, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0, 75.0, 80.0, 100.0, 125.0, 150.0, 200.0,
    250.0, 300.0, 400.0, 500.0,
];

/// Monthly average below which Italian distributors bill reactive energy
pub const PENALTY_THRESHOLD_COS_PHI: f64 = 0.9;

const KVAR: f64 = 1_000.0;

/// Inputs for power factor correction (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerFactorInput {
    /// Active power P (W)
    pub active_power_w: f64,
    /// Present power factor, 0.5 to 1
    pub current_cos_phi: f64,
    /// Target power factor, 0.5 to 1
    pub target_cos_phi: f64,
}

impl Default for PowerFactorInput {
    fn default() -> Self {
        PowerFactorInput {
            active_power_w: 100_000.0,
            current_cos_phi: 0.75,
            target_cos_phi: 0.95,
        }
    }
}

impl PowerFactorInput {
    /// Build from `power` + `power_unit` (default kW), `cos_phi` and
    /// `target_cos_phi` (clamped 0.5–1).
    pub fn from_raw(raw: &RawInputs) -> CalcResult<Self> {
        let d = PowerFactorInput::default();
        Ok(PowerFactorInput {
            active_power_w: raw.measure("power", 100.0, "power_unit", &POWER, "kw")?,
            current_cos_phi: raw.bounded("cos_phi", d.current_cos_phi, 0.5, 1.0),
            target_cos_phi: raw.bounded("target_cos_phi", d.target_cos_phi, 0.5, 1.0),
        })
    }
}

/// Compensation results (SI units: W, var, VA).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerFactorResult {
    pub active_power_w: f64,
    pub current_cos_phi: f64,
    pub target_cos_phi: f64,
    /// Reactive power before correction (var)
    pub reactive_before_var: f64,
    /// Required compensation Qc (var); not positive when none is needed
    pub required_var: f64,
    /// Selected standard bank (var); 0 when none is needed
    pub bank_var: f64,
    /// Reactive power after correction (var); negative when leading
    pub reactive_after_var: f64,
    /// Power factor with the selected bank
    pub achieved_cos_phi: f64,
    /// Apparent power before correction (VA)
    pub apparent_before_va: f64,
    /// Apparent power after correction (VA)
    pub apparent_after_va: f64,
    /// Reduction of apparent power (and line current), %
    pub apparent_reduction_percentage: f64,
    /// True when `required_var` exceeds the largest standard bank
    pub exceeds_largest_step: bool,
}

fn tan_phi(cos_phi: f64) -> f64 {
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    sin_phi / cos_phi
}

/// Smallest standard bank of at least `required_var`, or the largest bank
/// when none is big enough.
pub fn select_bank(required_var: f64) -> (f64, bool) {
    match STANDARD_BANK_STEPS_KVAR
        .iter()
        .find(|&&kvar| kvar * KVAR >= required_var)
    {
        Some(kvar) => (kvar * KVAR, false),
        None => (STANDARD_BANK_STEPS_KVAR[STANDARD_BANK_STEPS_KVAR.len() - 1] * KVAR, true),
    }
}

/// Size the bank; `None` when P is not positive.
pub fn calculate(input: &PowerFactorInput) -> Option<PowerFactorResult> {
    if input.active_power_w <= 0.0 {
        return None;
    }
    let p = input.active_power_w;
    let cos1 = input.current_cos_phi.clamp(0.5, 1.0);
    let cos2 = input.target_cos_phi.clamp(0.5, 1.0);

    let reactive_before_var = p * tan_phi(cos1);
    let required_var = p * (tan_phi(cos1) - tan_phi(cos2));
    let (bank_var, exceeds_largest_step) = if required_var > 0.0 {
        select_bank(required_var)
    } else {
        (0.0, false)
    };

    let reactive_after_var = reactive_before_var - bank_var;
    let apparent_before_va = p.hypot(reactive_before_var);
    let apparent_after_va = p.hypot(reactive_after_var);

    Some(PowerFactorResult {
        active_power_w: p,
        current_cos_phi: cos1,
        target_cos_phi: cos2,
        reactive_before_var,
        required_var,
        bank_var,
        reactive_after_var,
        achieved_cos_phi: p / apparent_after_va,
        apparent_before_va,
        apparent_after_va,
        apparent_reduction_percentage: (1.0 - apparent_after_va / apparent_before_va) * 100.0,
        exceeds_largest_step,
    })
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<PowerFactorResult>] = &[
    WarningRule::new(
        |r: &PowerFactorResult| r.required_var <= 0.0,
        |r: &PowerFactorResult| {
            format!(
                "Il fattore di potenza attuale ({:.2}) è già pari o superiore all'obiettivo: nessun rifasamento necessario.",
                r.current_cos_phi
            )
        },
    ),
    WarningRule::new(
        |r: &PowerFactorResult| r.exceeds_largest_step,
        |r: &PowerFactorResult| {
            format!(
                "Potenza reattiva richiesta {:.1} kvar oltre la batteria standard più grande: suddividere su più batterie.",
                r.required_var / KVAR
            )
        },
    ),
    WarningRule::new(
        |r: &PowerFactorResult| r.target_cos_phi < PENALTY_THRESHOLD_COS_PHI,
        |_: &PowerFactorResult| {
            "Obiettivo inferiore a 0,9: l'energia reattiva resta soggetta a penale.".to_string()
        },
    ),
    WarningRule::new(
        |r: &PowerFactorResult| r.reactive_after_var < 0.0,
        |r: &PowerFactorResult| {
            format!(
                "Sovrarifasamento: carico capacitivo di {:.1} kvar a basso carico.",
                -r.reactive_after_var / KVAR
            )
        },
    ),
];

/// Pipeline adapter for [`Domain::PowerFactor`]
pub struct PowerFactorCalculator;

impl Calculator for PowerFactorCalculator {
    const DOMAIN: Domain = Domain::PowerFactor;
    type Input = PowerFactorInput;
    type Output = PowerFactorResult;

    fn normalize(raw: &RawInputs) -> CalcResult<PowerFactorInput> {
        PowerFactorInput::from_raw(raw)
    }

    fn evaluate(input: &PowerFactorInput) -> Option<PowerFactorResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<PowerFactorResult>] {
        RULES
    }

    fn summary(r: &PowerFactorResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let d = format.decimals();
        let l = format.locale;
        vec![
            format_row("Potenza reattiva necessaria", r.required_var.max(0.0) / KVAR, "kvar", d, l),
            format_row("Batteria standard", r.bank_var / KVAR, "kvar", 1, l),
            format_row("cos φ ottenuto", r.achieved_cos_phi, "", 3, l),
            format_row("Potenza apparente prima", r.apparent_before_va / KVAR, "kVA", d, l),
            format_row("Potenza apparente dopo", r.apparent_after_va / KVAR, "kVA", d, l),
            format_row("Riduzione corrente", r.apparent_reduction_percentage, "%", 1, l),
        ]
    }
}
