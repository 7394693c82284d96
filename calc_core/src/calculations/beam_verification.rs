//! # Reinforced Concrete Beam Verification
//!
//! Ultimate and serviceability checks of a simply supported, singly
//! reinforced rectangular beam under a uniform load, per Eurocode 2
//! (EN 1992-1-1).
//!
//! ## Checks
//!
//! - **Bending** (§3.1.7, rectangular stress block `0.8x`):
//!   `fcd = 0.85 fck / 1.5`, `fyd = fyk / 1.15`,
//!   `x = As fyd / (0.8 b fcd)`, `MRd = As fyd (d − 0.4x)`
//! - **Shear** without shear reinforcement (§6.2.2):
//!   `VRd,c = 0.12 k (100 ρl fck)^(1/3) b d ≥ vmin b d`,
//!   `k = 1 + √(200/d) ≤ 2`, `ρl ≤ 0.02`, `vmin = 0.035 k^1.5 √fck`
//! - **Deflection** by span/depth ratio (§7.4.2, K = 1)
//!
//! Design actions: `MEd = q L² / 8`, `VEd = q L / 2`.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::beam_verification::{calculate, BeamVerificationInput};
//!
//! // 300×500 mm, 3Ø16, C25/30, B450C, 5 m span, 20 kN/m
//! let result = calculate(&BeamVerificationInput::default()).unwrap();
//! assert!(result.bending_utilization_percentage < 100.0);
//! assert!(result.shear_utilization_percentage < 100.0);
//! ```

use serde::{Deserialize, Serialize};

use super::{Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, FormatSettings, SummaryRow};
use crate::parse::RawInputs;
use crate::units::tables::{AREA, LENGTH, PRESSURE};
use crate::warnings::WarningRule;

/// Partial factor for concrete
pub const GAMMA_C: f64 = 1.5;

/// Partial factor for reinforcing steel
pub const GAMMA_S: f64 = 1.15;

/// Long-term effects coefficient
pub const ALPHA_CC: f64 = 0.85;

/// Ductility limit on x/d for redistribution-free design
pub const MAX_NEUTRAL_AXIS_RATIO: f64 = 0.45;

/// Maximum tension reinforcement as a fraction of Ac (§9.2.1.1)
pub const MAX_REINFORCEMENT_RATIO: f64 = 0.04;

const MPA: f64 = 1.0e6;

/// Beam geometry, materials and load (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamVerificationInput {
    /// Web width b (m)
    pub width_m: f64,
    /// Overall depth h (m)
    pub height_m: f64,
    /// Distance from the tension face to the bar centroid (m)
    pub cover_m: f64,
    /// Tension reinforcement As (m²)
    pub reinforcement_m2: f64,
    /// Characteristic cylinder strength fck (Pa)
    pub fck_pa: f64,
    /// Characteristic yield strength fyk (Pa)
    pub fyk_pa: f64,
    /// Effective span L (m)
    pub span_m: f64,
    /// Design load q_Ed (N/m)
    pub load_n_m: f64,
}

impl Default for BeamVerificationInput {
    fn default() -> Self {
        BeamVerificationInput {
            width_m: 0.30,
            height_m: 0.50,
            cover_m: 0.04,
            reinforcement_m2: 603.0e-6,
            fck_pa: 25.0 * MPA,
            fyk_pa: 450.0 * MPA,
            span_m: 5.0,
            load_n_m: 20_000.0,
        }
    }
}

impl BeamVerificationInput {
    /// Build from form fields: `b`, `h`, `cover` (mm), `as` (mm²), `fck`,
    /// `fyk` (MPa), `span` (m), `load` (kN/m). Each length and stress field
    /// accepts a matching `*_unit`.
    pub fn from_raw(raw: &RawInputs) -> CalcResult<Self> {
        Ok(BeamVerificationInput {
            width_m: raw.measure("b", 300.0, "b_unit", &LENGTH, "mm")?,
            height_m: raw.measure("h", 500.0, "h_unit", &LENGTH, "mm")?,
            cover_m: raw.measure("cover", 40.0, "cover_unit", &LENGTH, "mm")?.max(0.0),
            reinforcement_m2: raw.measure("as", 603.0, "as_unit", &AREA, "mm2")?,
            fck_pa: raw.measure("fck", 25.0, "fck_unit", &PRESSURE, "mpa")?,
            fyk_pa: raw.measure("fyk", 450.0, "fyk_unit", &PRESSURE, "mpa")?,
            span_m: raw.measure("span", 5.0, "span_unit", &LENGTH, "m")?,
            load_n_m: raw.number("load", 20.0).max(0.0) * 1_000.0,
        })
    }
}

/// Verification results (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamVerificationResult {
    /// Effective depth d (m)
    pub effective_depth_m: f64,
    /// Design concrete strength (Pa)
    pub fcd_pa: f64,
    /// Design steel strength (Pa)
    pub fyd_pa: f64,
    /// Neutral axis depth x (m)
    pub neutral_axis_m: f64,
    /// x / d
    pub neutral_axis_ratio: f64,
    /// MRd (N·m)
    pub moment_resistance_nm: f64,
    /// MEd (N·m)
    pub design_moment_nm: f64,
    pub bending_utilization_percentage: f64,
    /// VRd,c (N)
    pub shear_resistance_n: f64,
    /// VEd (N)
    pub design_shear_n: f64,
    pub shear_utilization_percentage: f64,
    /// L / d
    pub span_depth_ratio: f64,
    /// Limiting L / d
    pub span_depth_limit: f64,
    pub deflection_utilization_percentage: f64,
    /// As / (b d)
    pub reinforcement_ratio: f64,
    /// As provided (m²)
    pub reinforcement_m2: f64,
    /// As,min (m²)
    pub min_reinforcement_m2: f64,
    /// As,max = 0.04 Ac (m²)
    pub max_reinforcement_m2: f64,
}

/// Mean tensile strength fctm (MPa) for fck ≤ 50 MPa
pub fn fctm_mpa(fck_mpa: f64) -> f64 {
    0.3 * fck_mpa.powf(2.0 / 3.0)
}

/// Shear resistance without shear reinforcement, per unit b·d (MPa)
pub fn shear_stress_resistance_mpa(effective_depth_m: f64, reinforcement_ratio: f64, fck_mpa: f64) -> f64 {
    let k = (1.0 + (0.2 / effective_depth_m).sqrt()).min(2.0);
    let rho = reinforcement_ratio.min(0.02);
    let c_rd_c = 0.18 / GAMMA_C;
    let v = c_rd_c * k * (100.0 * rho * fck_mpa).cbrt();
    let v_min = 0.035 * k.powf(1.5) * fck_mpa.sqrt();
    v.max(v_min)
}

/// Limiting span/depth ratio (EC2 eq. 7.16, K = 1, no compression steel)
pub fn span_depth_limit(reinforcement_ratio: f64, fck_mpa: f64) -> f64 {
    let sqrt_fck = fck_mpa.sqrt();
    let rho0 = sqrt_fck * 1.0e-3;
    if reinforcement_ratio <= 0.0 {
        return f64::MAX;
    }
    let r = rho0 / reinforcement_ratio;
    if reinforcement_ratio <= rho0 {
        11.0 + 1.5 * sqrt_fck * r + 3.2 * sqrt_fck * (r - 1.0).powf(1.5)
    } else {
        11.0 + 1.5 * sqrt_fck * r
    }
}

/// Capacities reaching here are positive, `calculate` rejects the rest.
fn percentage(demand: f64, capacity: f64) -> f64 {
    demand / capacity * 100.0
}

/// Verify the beam; `None` when a dimension, strength or the span is not
/// positive, the cover leaves no effective depth, or the compression
/// block is deeper than the lever arm allows (`d − 0.4x ≤ 0`, no moment
/// resistance).
pub fn calculate(input: &BeamVerificationInput) -> Option<BeamVerificationResult> {
    let positive = [
        input.width_m,
        input.height_m,
        input.reinforcement_m2,
        input.fck_pa,
        input.fyk_pa,
        input.span_m,
    ];
    if positive.iter().any(|v| *v <= 0.0) {
        return None;
    }
    let d = input.height_m - input.cover_m;
    if d <= 0.0 {
        return None;
    }

    let b = input.width_m;
    let as_ = input.reinforcement_m2;
    let fck_mpa = input.fck_pa / MPA;
    let fcd_pa = ALPHA_CC * input.fck_pa / GAMMA_C;
    let fyd_pa = input.fyk_pa / GAMMA_S;

    // Bending
    let x = as_ * fyd_pa / (0.8 * b * fcd_pa);
    let moment_resistance_nm = as_ * fyd_pa * (d - 0.4 * x);
    if moment_resistance_nm <= 0.0 {
        return None;
    }
    let design_moment_nm = input.load_n_m * input.span_m * input.span_m / 8.0;

    // Shear
    let rho = as_ / (b * d);
    let shear_resistance_n = shear_stress_resistance_mpa(d, rho, fck_mpa) * MPA * b * d;
    let design_shear_n = input.load_n_m * input.span_m / 2.0;

    // Deflection
    let span_depth_ratio = input.span_m / d;
    let limit = span_depth_limit(rho, fck_mpa);

    let min_reinforcement_m2 = (0.26 * fctm_mpa(fck_mpa) * MPA / input.fyk_pa * b * d).max(0.0013 * b * d);

    Some(BeamVerificationResult {
        effective_depth_m: d,
        fcd_pa,
        fyd_pa,
        neutral_axis_m: x,
        neutral_axis_ratio: x / d,
        moment_resistance_nm,
        design_moment_nm,
        bending_utilization_percentage: percentage(design_moment_nm, moment_resistance_nm),
        shear_resistance_n,
        design_shear_n,
        shear_utilization_percentage: percentage(design_shear_n, shear_resistance_n),
        span_depth_ratio,
        span_depth_limit: limit,
        deflection_utilization_percentage: percentage(span_depth_ratio, limit),
        reinforcement_ratio: rho,
        reinforcement_m2: as_,
        min_reinforcement_m2,
        max_reinforcement_m2: MAX_REINFORCEMENT_RATIO * b * input.height_m,
    })
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<BeamVerificationResult>] = &[
    WarningRule::new(
        |r: &BeamVerificationResult| r.bending_utilization_percentage > 100.0,
        |r: &BeamVerificationResult| {
            format!(
                "Verifica a flessione non soddisfatta: MEd = {:.1} kNm > MRd = {:.1} kNm.",
                r.design_moment_nm / 1_000.0,
                r.moment_resistance_nm / 1_000.0
            )
        },
    ),
    WarningRule::new(
        |r: &BeamVerificationResult| r.shear_utilization_percentage > 100.0,
        |r: &BeamVerificationResult| {
            format!(
                "Verifica a taglio non soddisfatta senza staffe: VEd = {:.1} kN > VRd,c = {:.1} kN. Prevedere armatura a taglio.",
                r.design_shear_n / 1_000.0,
                r.shear_resistance_n / 1_000.0
            )
        },
    ),
    WarningRule::new(
        |r: &BeamVerificationResult| r.deflection_utilization_percentage > 100.0,
        |r: &BeamVerificationResult| {
            format!(
                "Snellezza L/d = {:.1} oltre il limite {:.1}: verificare la freccia con calcolo diretto.",
                r.span_depth_ratio, r.span_depth_limit
            )
        },
    ),
    WarningRule::new(
        |r: &BeamVerificationResult| r.neutral_axis_ratio > MAX_NEUTRAL_AXIS_RATIO,
        |r: &BeamVerificationResult| {
            format!(
                "x/d = {:.2} oltre 0,45: sezione poco duttile.",
                r.neutral_axis_ratio
            )
        },
    ),
    WarningRule::new(
        |r: &BeamVerificationResult| r.reinforcement_m2 < r.min_reinforcement_m2,
        |r: &BeamVerificationResult| {
            format!(
                "Armatura inferiore al minimo As,min = {:.0} mm².",
                r.min_reinforcement_m2 * 1.0e6
            )
        },
    ),
    WarningRule::new(
        |r: &BeamVerificationResult| r.reinforcement_m2 > r.max_reinforcement_m2,
        |r: &BeamVerificationResult| {
            format!(
                "Armatura superiore al massimo 0,04·Ac = {:.0} mm².",
                r.max_reinforcement_m2 * 1.0e6
            )
        },
    ),
];

/// Pipeline adapter for [`Domain::BeamVerification`]
pub struct BeamVerificationCalculator;

impl Calculator for BeamVerificationCalculator {
    const DOMAIN: Domain = Domain::BeamVerification;
    type Input = BeamVerificationInput;
    type Output = BeamVerificationResult;

    fn normalize(raw: &RawInputs) -> CalcResult<BeamVerificationInput> {
        BeamVerificationInput::from_raw(raw)
    }

    fn evaluate(input: &BeamVerificationInput) -> Option<BeamVerificationResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<BeamVerificationResult>] {
        RULES
    }

    fn summary(r: &BeamVerificationResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let d = format.decimals();
        let l = format.locale;
        vec![
            format_row("Altezza utile d", r.effective_depth_m * 1_000.0, "mm", 0, l),
            format_row("Asse neutro x", r.neutral_axis_m * 1_000.0, "mm", 1, l),
            format_row("x/d", r.neutral_axis_ratio, "", 3, l),
            format_row("MEd", r.design_moment_nm / 1_000.0, "kNm", d, l),
            format_row("MRd", r.moment_resistance_nm / 1_000.0, "kNm", d, l),
            format_row("Utilizzo flessione", r.bending_utilization_percentage, "%", 1, l),
            format_row("VEd", r.design_shear_n / 1_000.0, "kN", d, l),
            format_row("VRd,c", r.shear_resistance_n / 1_000.0, "kN", d, l),
            format_row("Utilizzo taglio", r.shear_utilization_percentage, "%", 1, l),
            format_row("L/d", r.span_depth_ratio, "", 1, l),
            format_row("L/d limite", r.span_depth_limit, "", 1, l),
            format_row("Utilizzo deformabilità", r.deflection_utilization_percentage, "%", 1, l),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::generate_warnings;
    use approx::assert_relative_eq;

    fn beam(reinforcement_mm2: f64, load_kn_m: f64) -> BeamVerificationResult {
        calculate(&BeamVerificationInput {
            reinforcement_m2: reinforcement_mm2 * 1.0e-6,
            load_n_m: load_kn_m * 1_000.0,
            ..BeamVerificationInput::default()
        })
        .unwrap()
    }

    #[test]
    fn test_design_strengths() {
        let r = beam(603.0, 20.0);
        assert_relative_eq!(r.fcd_pa / MPA, 14.1667, epsilon = 1e-4);
        assert_relative_eq!(r.fyd_pa / MPA, 391.3043, epsilon = 1e-4);
        assert_relative_eq!(r.effective_depth_m, 0.46, epsilon = 1e-12);
    }

    #[test]
    fn test_bending_capacity() {
        let r = beam(603.0, 20.0);
        assert_relative_eq!(r.neutral_axis_m * 1_000.0, 69.399, epsilon = 1e-3);
        assert_relative_eq!(r.moment_resistance_nm / 1_000.0, 101.990, epsilon = 1e-3);
        assert_relative_eq!(r.design_moment_nm, 62_500.0);
    }

    #[test]
    fn test_shear_capacity() {
        let r = beam(603.0, 20.0);
        // k = 1.659, ρl = 0.00437, vRd,c = 0.4418 MPa
        assert_relative_eq!(r.shear_resistance_n / 1_000.0, 60.972, epsilon = 1e-3);
        assert_relative_eq!(r.design_shear_n, 50_000.0);
    }

    #[test]
    fn test_shear_minimum_governs_for_light_reinforcement() {
        let v = shear_stress_resistance_mpa(0.46, 0.0005, 25.0);
        let k: f64 = 1.0 + (0.2f64 / 0.46).sqrt();
        assert_relative_eq!(v, 0.035 * k.powf(1.5) * 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_span_depth_limit() {
        // ρ = 0.00437 < ρ0 = 0.005
        let r = beam(603.0, 20.0);
        assert_relative_eq!(r.span_depth_limit, 20.459, epsilon = 1e-3);
        assert_relative_eq!(r.deflection_utilization_percentage, 53.13, epsilon = 1e-2);
        // Above ρ0 only the linear term remains
        assert_relative_eq!(span_depth_limit(0.01, 25.0), 11.0 + 1.5 * 5.0 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_default_beam_passes() {
        let r = calculate(&BeamVerificationInput::default()).unwrap();
        assert_relative_eq!(r.bending_utilization_percentage, 61.28, epsilon = 1e-2);
        assert_relative_eq!(r.shear_utilization_percentage, 82.00, epsilon = 1e-2);
        assert_relative_eq!(r.min_reinforcement_m2 * 1.0e6, 204.5, epsilon = 0.1);
        assert!(generate_warnings(RULES, &r).is_empty());
    }

    #[test]
    fn test_overloaded_beam_warnings() {
        let r = beam(603.0, 60.0);
        let warnings = generate_warnings(RULES, &r);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Verifica a flessione"));
        assert!(warnings[1].starts_with("Verifica a taglio"));
    }

    #[test]
    fn test_over_reinforced_section() {
        let r = beam(3_000.0, 20.0);
        assert!(r.neutral_axis_ratio > MAX_NEUTRAL_AXIS_RATIO);
        let warnings = generate_warnings(RULES, &r);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("x/d"));

        let r = beam(6_500.0, 20.0);
        let warnings = generate_warnings(RULES, &r);
        assert!(warnings.last().unwrap().contains("massimo"));
    }

    #[test]
    fn test_under_reinforced_section() {
        let r = beam(150.0, 10.0);
        let warnings = generate_warnings(RULES, &r);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Verifica a flessione"));
        assert!(warnings[1].contains("minimo"));
    }

    #[test]
    fn test_section_without_lever_arm_is_rejected() {
        // x = 1.38 m: the stress block leaves no lever arm, MRd would be ≤ 0
        let input = BeamVerificationInput {
            reinforcement_m2: 12_000.0e-6,
            ..BeamVerificationInput::default()
        };
        assert!(calculate(&input).is_none());

        // Still a lever arm left at 9000 mm²
        let r = beam(9_000.0, 20.0);
        assert!(r.moment_resistance_nm > 0.0);
        assert!(r.bending_utilization_percentage > 0.0);
    }

    #[test]
    fn test_bending_utilization_grows_with_load() {
        let mut previous = 0.0;
        for load in (1..=80).map(f64::from) {
            let r = beam(603.0, load);
            assert!(r.bending_utilization_percentage > previous);
            previous = r.bending_utilization_percentage;
            let warns = generate_warnings(RULES, &r)
                .iter()
                .any(|w| w.starts_with("Verifica a flessione"));
            assert_eq!(warns, r.bending_utilization_percentage > 100.0, "at {} kN/m", load);
        }
        assert!(previous > 100.0);
    }

    #[test]
    fn test_invalid_geometry() {
        let raw = RawInputs::new().with("cover", "500");
        assert!(calculate(&BeamVerificationInput::from_raw(&raw).unwrap()).is_none());
        let raw = RawInputs::new().with("span", "0");
        assert!(calculate(&BeamVerificationInput::from_raw(&raw).unwrap()).is_none());
        let raw = RawInputs::new().with("fck", "-25");
        assert!(calculate(&BeamVerificationInput::from_raw(&raw).unwrap()).is_none());
    }

    #[test]
    fn test_units_on_inputs() {
        let raw = RawInputs::new().with("b", "30").with("b_unit", "cm").with("span", "500").with("span_unit", "cm");
        let input = BeamVerificationInput::from_raw(&raw).unwrap();
        assert_relative_eq!(input.width_m, 0.3, epsilon = 1e-12);
        assert_relative_eq!(input.span_m, 5.0, epsilon = 1e-12);
    }
}
