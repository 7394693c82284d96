//! # Bearing Capacity
//!
//! Ultimate and allowable bearing pressure of a shallow footing with
//! Terzaghi's superposition:
//!
//! ```text
//! q_ult = sc · c · Nc + γ · Df · Nq + sγ · γ · B · Nγ
//! ```
//!
//! ## Bearing Capacity Factors
//!
//! - `Nq = e^((3π/2 − φ) tan φ) / (2 cos²(45° + φ/2))`
//! - `Nc = (Nq − 1) cot φ`, and 5.7 for φ = 0
//! - `Nγ = 2 (Nq + 1) tan φ / (1 + 0.4 sin 4φ)`
//!
//! Valid for `0 ≤ φ < 45°`. General shear failure is assumed.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::bearing_capacity::{calculate, BearingCapacityInput, FootingShape};
//!
//! // 1.5 m square footing at 1 m depth, c = 10 kPa, φ = 30°, 500 kN
//! let result = calculate(&BearingCapacityInput::default()).unwrap();
//! assert!((result.ultimate_pa / 1_000.0 - 1_104.6).abs() < 0.1);
//! assert!(result.utilization_percentage < 100.0);
//!
//! let strip = BearingCapacityInput { shape: FootingShape::Strip, ..BearingCapacityInput::default() };
//! assert!(calculate(&strip).unwrap().ultimate_pa < result.ultimate_pa);
//! ```

use serde::{Deserialize, Serialize};

use super::{Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, FormatSettings, SummaryRow};
use crate::parse::{FormOption, RawInputs};
use crate::units::tables::{FORCE, LENGTH, PRESSURE};
use crate::warnings::WarningRule;

/// Terzaghi Nc for a purely cohesive soil
pub const NC_UNDRAINED: f64 = 5.7;

/// Friction angle upper limit (exclusive), degrees
pub const MAX_FRICTION_ANGLE_DEG: f64 = 45.0;

/// Below this safety factor a warning is issued
const MIN_RECOMMENDED_SAFETY_FACTOR: f64 = 2.5;

/// Footing plan shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FootingShape {
    /// Continuous footing; loads per metre run
    Strip,
    Square,
    Circular,
}

impl FormOption for FootingShape {
    const OPTIONS: &'static [(&'static str, Self)] = &[
        ("strip", FootingShape::Strip),
        ("square", FootingShape::Square),
        ("circular", FootingShape::Circular),
    ];
}

impl FootingShape {
    /// Shape factor on the cohesion term
    pub fn sc(self) -> f64 {
        match self {
            FootingShape::Strip => 1.0,
            FootingShape::Square | FootingShape::Circular => 1.3,
        }
    }

    /// Shape factor on the self-weight term
    pub fn s_gamma(self) -> f64 {
        match self {
            FootingShape::Strip => 0.5,
            FootingShape::Square => 0.4,
            FootingShape::Circular => 0.3,
        }
    }

    /// Loaded area (m²); one metre run for strips
    pub fn area(self, width_m: f64) -> f64 {
        match self {
            FootingShape::Strip => width_m,
            FootingShape::Square => width_m * width_m,
            FootingShape::Circular => std::f64::consts::PI * width_m * width_m / 4.0,
        }
    }
}

/// Terzaghi bearing capacity factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingFactors {
    pub nc: f64,
    pub nq: f64,
    pub n_gamma: f64,
}

impl BearingFactors {
    /// Factors for a friction angle in degrees; `None` outside `[0, 45)`.
    pub fn from_friction_angle(phi_deg: f64) -> Option<Self> {
        if !(0.0..MAX_FRICTION_ANGLE_DEG).contains(&phi_deg) {
            return None;
        }
        let phi = phi_deg.to_radians();
        let tan_phi = phi.tan();
        let cos_term = (45.0 + phi_deg / 2.0).to_radians().cos();
        let nq = ((1.5 * std::f64::consts::PI - phi) * tan_phi).exp() / (2.0 * cos_term * cos_term);
        let nc = if phi_deg == 0.0 {
            NC_UNDRAINED
        } else {
            (nq - 1.0) / tan_phi
        };
        let n_gamma = 2.0 * (nq + 1.0) * tan_phi / (1.0 + 0.4 * (4.0 * phi).sin());
        Some(BearingFactors { nc, nq, n_gamma })
    }
}

/// Footing and soil inputs (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingCapacityInput {
    /// Cohesion c (Pa)
    pub cohesion_pa: f64,
    /// Friction angle φ (degrees)
    pub friction_angle_deg: f64,
    /// Soil unit weight γ (N/m³)
    pub unit_weight_n_m3: f64,
    /// Embedment depth Df (m)
    pub depth_m: f64,
    /// Width or diameter B (m)
    pub width_m: f64,
    pub shape: FootingShape,
    pub safety_factor: f64,
    /// Applied vertical load (N; N/m for strips)
    pub load_n: f64,
}

impl Default for BearingCapacityInput {
    fn default() -> Self {
        BearingCapacityInput {
            cohesion_pa: 10_000.0,
            friction_angle_deg: 30.0,
            unit_weight_n_m3: 18_000.0,
            depth_m: 1.0,
            width_m: 1.5,
            shape: FootingShape::Square,
            safety_factor: 3.0,
            load_n: 500_000.0,
        }
    }
}

impl BearingCapacityInput {
    /// Build from form fields: `cohesion` + `cohesion_unit` (kPa), `phi`
    /// (deg), `gamma` (kN/m³), `depth`, `width`, `shape`, `safety_factor`,
    /// `load` + `load_unit` (kN).
    pub fn from_raw(raw: &RawInputs) -> CalcResult<Self> {
        let d = BearingCapacityInput::default();
        Ok(BearingCapacityInput {
            cohesion_pa: raw.measure("cohesion", 10.0, "cohesion_unit", &PRESSURE, "kpa")?.max(0.0),
            friction_angle_deg: raw.number("phi", d.friction_angle_deg),
            unit_weight_n_m3: raw.number("gamma", 18.0) * 1_000.0,
            depth_m: raw.measure("depth", d.depth_m, "depth_unit", &LENGTH, "m")?.max(0.0),
            width_m: raw.measure("width", d.width_m, "width_unit", &LENGTH, "m")?,
            shape: raw.option("shape", d.shape)?,
            safety_factor: raw.number("safety_factor", d.safety_factor),
            load_n: raw.measure("load", 500.0, "load_unit", &FORCE, "kn")?,
        })
    }
}

/// Bearing capacity results (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingCapacityResult {
    pub factors: BearingFactors,
    pub shape: FootingShape,
    /// Overburden at footing level γ·Df (Pa)
    pub overburden_pa: f64,
    /// Ultimate bearing pressure (Pa)
    pub ultimate_pa: f64,
    /// Allowable bearing pressure (Pa)
    pub allowable_pa: f64,
    /// Applied contact pressure (Pa)
    pub applied_pa: f64,
    /// Allowable load on the footing (N; N/m for strips)
    pub allowable_load_n: f64,
    /// Applied / allowable × 100
    pub utilization_percentage: f64,
    pub safety_factor: f64,
    pub depth_m: f64,
    pub width_m: f64,
}

/// Compute capacity; `None` when B, γ or FS is not positive, φ is out
/// of range, or the soil has no bearing capacity at all (c = 0, φ = 0 at
/// the surface).
pub fn calculate(input: &BearingCapacityInput) -> Option<BearingCapacityResult> {
    if input.width_m <= 0.0 || input.unit_weight_n_m3 <= 0.0 || input.safety_factor <= 0.0 {
        return None;
    }
    let factors = BearingFactors::from_friction_angle(input.friction_angle_deg)?;

    let shape = input.shape;
    let overburden_pa = input.unit_weight_n_m3 * input.depth_m;
    let ultimate_pa = shape.sc() * input.cohesion_pa * factors.nc
        + overburden_pa * factors.nq
        + shape.s_gamma() * input.unit_weight_n_m3 * input.width_m * factors.n_gamma;
    if ultimate_pa <= 0.0 {
        return None;
    }
    let allowable_pa = ultimate_pa / input.safety_factor;
    let area = shape.area(input.width_m);
    let applied_pa = input.load_n / area;
    let utilization_percentage = applied_pa / allowable_pa * 100.0;

    Some(BearingCapacityResult {
        factors,
        shape,
        overburden_pa,
        ultimate_pa,
        allowable_pa,
        applied_pa,
        allowable_load_n: allowable_pa * area,
        utilization_percentage,
        safety_factor: input.safety_factor,
        depth_m: input.depth_m,
        width_m: input.width_m,
    })
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<BearingCapacityResult>] = &[
    WarningRule::new(
        |r: &BearingCapacityResult| r.utilization_percentage > 100.0,
        |r: &BearingCapacityResult| {
            format!(
                "Pressione di contatto superiore a quella ammissibile (utilizzo {:.0}%): aumentare le dimensioni della fondazione.",
                r.utilization_percentage
            )
        },
    ),
    WarningRule::new(
        |r: &BearingCapacityResult| r.safety_factor < MIN_RECOMMENDED_SAFETY_FACTOR,
        |r: &BearingCapacityResult| {
            format!(
                "Fattore di sicurezza {:.2} inferiore a 2,5: valore basso per il metodo delle tensioni ammissibili.",
                r.safety_factor
            )
        },
    ),
    WarningRule::new(
        |r: &BearingCapacityResult| r.depth_m > r.width_m,
        |_: &BearingCapacityResult| {
            "Profondità di posa maggiore della larghezza: la formula di Terzaghi per fondazioni superficiali non è più rappresentativa."
                .to_string()
        },
    ),
];

/// Pipeline adapter for [`Domain::BearingCapacity`]
pub struct BearingCapacityCalculator;

impl Calculator for BearingCapacityCalculator {
    const DOMAIN: Domain = Domain::BearingCapacity;
    type Input = BearingCapacityInput;
    type Output = BearingCapacityResult;

    fn normalize(raw: &RawInputs) -> CalcResult<BearingCapacityInput> {
        BearingCapacityInput::from_raw(raw)
    }

    fn evaluate(input: &BearingCapacityInput) -> Option<BearingCapacityResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<BearingCapacityResult>] {
        RULES
    }

    fn summary(r: &BearingCapacityResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let d = format.decimals();
        let l = format.locale;
        let kpa = |pa: f64| PRESSURE.from_canonical(pa, "kpa").unwrap_or(pa / 1_000.0);
        let load_suffix = match r.shape {
            FootingShape::Strip => "kN/m",
            _ => "kN",
        };
        vec![
            format_row("Nc", r.factors.nc, "", d, l),
            format_row("Nq", r.factors.nq, "", d, l),
            format_row("Nγ", r.factors.n_gamma, "", d, l),
            format_row("Carico limite q_ult", kpa(r.ultimate_pa), "kPa", d, l),
            format_row("Pressione ammissibile", kpa(r.allowable_pa), "kPa", d, l),
            format_row("Pressione di contatto", kpa(r.applied_pa), "kPa", d, l),
            format_row("Carico ammissibile", r.allowable_load_n / 1_000.0, load_suffix, d, l),
            format_row("Utilizzo", r.utilization_percentage, "%", 1, l),
        ]
    }

    fn quantities(r: &BearingCapacityResult) -> std::collections::BTreeMap<String, f64> {
        let mut map = super::numeric_fields(r);
        map.insert("nc".to_string(), r.factors.nc);
        map.insert("nq".to_string(), r.factors.nq);
        map.insert("n_gamma".to_string(), r.factors.n_gamma);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::generate_warnings;
    use approx::assert_relative_eq;

    #[test]
    fn test_factors_at_30_degrees() {
        let f = BearingFactors::from_friction_angle(30.0).unwrap();
        // Terzaghi's tabulated values: Nc 37.16, Nq 22.46
        assert_relative_eq!(f.nc, 37.16, epsilon = 0.01);
        assert_relative_eq!(f.nq, 22.46, epsilon = 0.01);
        assert_relative_eq!(f.n_gamma, 20.12, epsilon = 0.01);
    }

    #[test]
    fn test_factors_undrained() {
        let f = BearingFactors::from_friction_angle(0.0).unwrap();
        assert_eq!(f.nc, NC_UNDRAINED);
        assert_relative_eq!(f.nq, 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.n_gamma, 0.0);
    }

    #[test]
    fn test_friction_angle_range() {
        assert!(BearingFactors::from_friction_angle(-1.0).is_none());
        assert!(BearingFactors::from_friction_angle(45.0).is_none());
        assert!(BearingFactors::from_friction_angle(44.9).is_some());
        let raw = RawInputs::new().with("phi", "50");
        assert!(calculate(&BearingCapacityInput::from_raw(&raw).unwrap()).is_none());
    }

    #[test]
    fn test_default_square_footing() {
        let result = calculate(&BearingCapacityInput::default()).unwrap();
        assert_relative_eq!(result.ultimate_pa, 1_104_567.6, epsilon = 1.0);
        assert_relative_eq!(result.allowable_pa, result.ultimate_pa / 3.0);
        assert_relative_eq!(result.applied_pa, 500_000.0 / 2.25);
        assert_relative_eq!(result.utilization_percentage, 60.36, epsilon = 0.01);
        assert!(generate_warnings(RULES, &result).is_empty());
    }

    #[test]
    fn test_strip_on_clay() {
        let raw = RawInputs::new()
            .with("cohesion", "25")
            .with("phi", "0")
            .with("shape", "strip")
            .with("load", "100");
        let result = calculate(&BearingCapacityInput::from_raw(&raw).unwrap()).unwrap();
        // 1.0 · 25 · 5.7 + 18 · 1 · 1 = 160.5 kPa
        assert_relative_eq!(result.ultimate_pa, 160_500.0, epsilon = 1e-6);
        assert_relative_eq!(result.applied_pa, 100_000.0 / 1.5);
    }

    #[test]
    fn test_shape_factors_order_capacity() {
        let square = calculate(&BearingCapacityInput::default()).unwrap();
        let circular = calculate(&BearingCapacityInput {
            shape: FootingShape::Circular,
            ..BearingCapacityInput::default()
        })
        .unwrap();
        assert!(circular.ultimate_pa < square.ultimate_pa);
        assert!(circular.applied_pa > square.applied_pa);
    }

    #[test]
    fn test_all_warnings_in_order() {
        let raw = RawInputs::new()
            .with("width", "0,8")
            .with("depth", "1,2")
            .with("safety_factor", "2")
            .with("load", "2000");
        let result = calculate(&BearingCapacityInput::from_raw(&raw).unwrap()).unwrap();
        let warnings = generate_warnings(RULES, &result);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].starts_with("Pressione di contatto"));
        assert!(warnings[1].starts_with("Fattore di sicurezza"));
        assert!(warnings[2].starts_with("Profondità di posa"));
    }

    #[test]
    fn test_soil_without_strength_is_rejected() {
        let raw = RawInputs::new().with("cohesion", "0").with("phi", "0").with("depth", "0");
        assert!(calculate(&BearingCapacityInput::from_raw(&raw).unwrap()).is_none());

        // Any strength left gives a finite, warned utilization
        let raw = raw.with("phi", "1");
        let result = calculate(&BearingCapacityInput::from_raw(&raw).unwrap()).unwrap();
        assert!(result.ultimate_pa > 0.0);
        assert!(result.utilization_percentage.is_finite());
        assert!(generate_warnings(RULES, &result)[0].starts_with("Pressione di contatto"));
    }

    #[test]
    fn test_utilization_grows_with_load() {
        let mut previous = 0.0;
        for kn in (1..=40).map(|i| f64::from(i) * 50.0) {
            let input = BearingCapacityInput { load_n: kn * 1_000.0, ..BearingCapacityInput::default() };
            let result = calculate(&input).unwrap();
            assert!(result.utilization_percentage > previous);
            previous = result.utilization_percentage;
            let warns = generate_warnings(RULES, &result)
                .iter()
                .any(|w| w.starts_with("Pressione di contatto"));
            assert_eq!(warns, result.utilization_percentage > 100.0, "at {} kN", kn);
        }
        assert!(previous > 100.0);
    }

    #[test]
    fn test_invalid_geometry() {
        let zero_width = BearingCapacityInput { width_m: 0.0, ..BearingCapacityInput::default() };
        assert!(calculate(&zero_width).is_none());
        let zero_fs = BearingCapacityInput { safety_factor: 0.0, ..BearingCapacityInput::default() };
        assert!(calculate(&zero_fs).is_none());
    }
}
