//! # Seismic Base Shear
//!
//! Linear static analysis per NTC 2018 §7.3.3.2: fundamental period,
//! design spectrum ordinate, base shear, and its distribution over the
//! floors.
//!
//! ## Method
//!
//! - `T1 = C1 · H^0.75`
//! - Soil amplification `S = Ss · St`, corner periods
//!   `Tc = Cc · Tc*`, `Tb = Tc / 3`, `Td = 4 ag/g + 1.6`
//! - Design spectrum `Sd(T)` with `η = 1/q`, never below `0.2 ag`
//! - `Fh = Sd(T1) · W · λ`, `λ = 0.85` for three or more floors with
//!   `T1 < 2 Tc`
//! - `Fi = Fh · zi Wi / Σ zj Wj` with equal storey weights and heights
//!
//! ## Assumptions
//!
//! - Regular building in elevation
//! - Spectral accelerations in g; `W` is the seismic weight
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::seismic::{calculate, SeismicInput};
//!
//! let result = calculate(&SeismicInput::default()).unwrap();
//! assert_eq!(result.floor_forces_n.len(), 4);
//! let total: f64 = result.floor_forces_n.iter().sum();
//! assert!((total - result.base_shear_n).abs() < 1e-6);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{numeric_fields, Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, text_row, FormatSettings, SummaryRow};
use crate::parse::{FormOption, RawInputs};
use crate::units::tables::{FORCE, LENGTH};
use crate::warnings::WarningRule;

/// Storey count bounds
pub const MIN_FLOORS: u32 = 1;
pub const MAX_FLOORS: u32 = 50;

/// Base shear above this fraction of W is flagged
const BASE_SHEAR_RATIO_LIMIT: f64 = 0.30;

/// Subsoil category (NTC 2018 Tab. 3.2.II).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilCategory {
    A,
    B,
    C,
    D,
    E,
}

impl FormOption for SoilCategory {
    const OPTIONS: &'static [(&'static str, Self)] = &[
        ("a", SoilCategory::A),
        ("b", SoilCategory::B),
        ("c", SoilCategory::C),
        ("d", SoilCategory::D),
        ("e", SoilCategory::E),
    ];
}

impl SoilCategory {
    /// Stratigraphic amplification Ss (Tab. 3.2.IV)
    pub fn ss(self, ag: f64, f0: f64) -> f64 {
        let x = f0 * ag;
        match self {
            SoilCategory::A => 1.0,
            SoilCategory::B => (1.40 - 0.40 * x).clamp(1.00, 1.20),
            SoilCategory::C => (1.70 - 0.60 * x).clamp(1.00, 1.50),
            SoilCategory::D => (2.40 - 1.50 * x).clamp(0.90, 1.80),
            SoilCategory::E => (2.00 - 1.10 * x).clamp(1.00, 1.60),
        }
    }

    /// Corner period coefficient Cc (Tab. 3.2.IV)
    pub fn cc(self, tc_star: f64) -> f64 {
        match self {
            SoilCategory::A => 1.0,
            SoilCategory::B => 1.10 * tc_star.powf(-0.20),
            SoilCategory::C => 1.05 * tc_star.powf(-0.33),
            SoilCategory::D => 1.25 * tc_star.powf(-0.50),
            SoilCategory::E => 1.15 * tc_star.powf(-0.40),
        }
    }

    fn letter(self) -> &'static str {
        match self {
            SoilCategory::A => "A",
            SoilCategory::B => "B",
            SoilCategory::C => "C",
            SoilCategory::D => "D",
            SoilCategory::E => "E",
        }
    }
}

/// Topographic category (Tab. 3.2.III).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topography {
    T1,
    T2,
    T3,
    T4,
}

impl FormOption for Topography {
    const OPTIONS: &'static [(&'static str, Self)] = &[
        ("t1", Topography::T1),
        ("t2", Topography::T2),
        ("t3", Topography::T3),
        ("t4", Topography::T4),
    ];
}

impl Topography {
    /// Topographic amplification St (Tab. 3.2.V, top of relief)
    pub fn st(self) -> f64 {
        match self {
            Topography::T1 => 1.0,
            Topography::T2 | Topography::T3 => 1.2,
            Topography::T4 => 1.4,
        }
    }
}

/// Lateral system, for the period coefficient C1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    /// Steel moment frames
    Steel,
    /// Reinforced concrete frames
    Concrete,
    /// Any other structure (masonry, walls, ...)
    Other,
}

impl FormOption for StructureType {
    const OPTIONS: &'static [(&'static str, Self)] = &[
        ("steel", StructureType::Steel),
        ("concrete", StructureType::Concrete),
        ("other", StructureType::Other),
    ];
}

impl StructureType {
    /// C1 in `T1 = C1 H^0.75`
    pub fn c1(self) -> f64 {
        match self {
            StructureType::Steel => 0.085,
            StructureType::Concrete => 0.075,
            StructureType::Other => 0.050,
        }
    }

    fn label(self) -> &'static str {
        match self {
            StructureType::Steel => "Telaio in acciaio",
            StructureType::Concrete => "Telaio in c.a.",
            StructureType::Other => "Altra struttura",
        }
    }
}

/// Inputs for the linear static analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeismicInput {
    /// Peak ground acceleration on rock (g)
    pub ag: f64,
    /// Maximum spectral amplification F0
    pub f0: f64,
    /// Reference corner period Tc* (s)
    pub tc_star_s: f64,
    pub soil: SoilCategory,
    pub topography: Topography,
    /// Behaviour factor q, at least 1
    pub behaviour_factor: f64,
    /// Building height above foundation (m)
    pub height_m: f64,
    pub structure: StructureType,
    /// Total seismic weight W (N)
    pub weight_n: f64,
    /// Number of storeys, 1 to 50
    pub floors: u32,
}

impl Default for SeismicInput {
    fn default() -> Self {
        SeismicInput {
            ag: 0.15,
            f0: 2.5,
            tc_star_s: 0.3,
            soil: SoilCategory::C,
            topography: Topography::T1,
            behaviour_factor: 3.0,
            height_m: 12.0,
            structure: StructureType::Concrete,
            weight_n: 5_000_000.0,
            floors: 4,
        }
    }
}

impl SeismicInput {
    /// Build from form fields: `ag`, `f0`, `tc_star`, `soil`, `topography`,
    /// `q`, `height` + `height_unit`, `structure`, `weight` + `weight_unit`
    /// (default kN), `floors`.
    pub fn from_raw(raw: &RawInputs) -> CalcResult<Self> {
        let d = SeismicInput::default();
        Ok(SeismicInput {
            ag: raw.number("ag", d.ag),
            f0: raw.bounded("f0", d.f0, 1.5, 3.5),
            tc_star_s: raw.bounded("tc_star", d.tc_star_s, 0.1, 1.0),
            soil: raw.option("soil", d.soil)?,
            topography: raw.option("topography", d.topography)?,
            behaviour_factor: raw.number("q", d.behaviour_factor).max(1.0),
            height_m: raw.measure("height", d.height_m, "height_unit", &LENGTH, "m")?,
            structure: raw.option("structure", d.structure)?,
            weight_n: raw.measure("weight", 5_000.0, "weight_unit", &FORCE, "kn")?,
            floors: raw
                .bounded("floors", f64::from(d.floors), f64::from(MIN_FLOORS), f64::from(MAX_FLOORS))
                .round() as u32,
        })
    }
}

/// Spectrum parameters for one site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumParameters {
    /// Peak ground acceleration (g)
    pub ag: f64,
    pub f0: f64,
    /// Soil and topography amplification S = Ss · St
    pub s: f64,
    /// Damping correction η = 1/q
    pub eta: f64,
    pub tb_s: f64,
    pub tc_s: f64,
    pub td_s: f64,
}

impl SpectrumParameters {
    /// Design spectral acceleration Sd(T) (g), with the 0.2 ag floor
    pub fn design_acceleration(&self, period_s: f64) -> f64 {
        let plateau = self.ag * self.s * self.eta * self.f0;
        let t = period_s.max(0.0);
        let sd = if t < self.tb_s {
            let ratio = t / self.tb_s;
            plateau * (ratio + (1.0 - ratio) / (self.eta * self.f0))
        } else if t < self.tc_s {
            plateau
        } else if t < self.td_s {
            plateau * self.tc_s / t
        } else {
            plateau * self.tc_s * self.td_s / (t * t)
        };
        sd.max(0.2 * self.ag)
    }
}

/// Linear static analysis results (SI units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicResult {
    pub soil: SoilCategory,
    pub structure: StructureType,
    /// Stratigraphic amplification
    pub ss: f64,
    /// Corner period coefficient
    pub cc: f64,
    /// Topographic amplification
    pub st: f64,
    pub spectrum: SpectrumParameters,
    /// Fundamental period T1 (s)
    pub period_s: f64,
    /// Sd(T1) (g)
    pub design_acceleration_g: f64,
    /// Mass participation correction λ
    pub lambda: f64,
    /// Total base shear Fh (N)
    pub base_shear_n: f64,
    /// Fh / W
    pub base_shear_ratio: f64,
    pub weight_n: f64,
    pub floors: u32,
    /// Storey heights above foundation (m), bottom up
    pub floor_heights_m: Vec<f64>,
    /// Lateral force at each storey (N), bottom up
    pub floor_forces_n: Vec<f64>,
}

impl SeismicResult {
    /// NTC 2018 admissibility of the linear static method
    pub fn linear_static_admissible(&self) -> bool {
        self.period_s <= 2.5 * self.spectrum.tc_s && self.period_s <= self.spectrum.td_s
    }
}

/// Run the analysis; `None` when ag, H or W is not positive.
pub fn calculate(input: &SeismicInput) -> Option<SeismicResult> {
    if input.ag <= 0.0 || input.height_m <= 0.0 || input.weight_n <= 0.0 {
        return None;
    }

    let ss = input.soil.ss(input.ag, input.f0);
    let cc = input.soil.cc(input.tc_star_s);
    let st = input.topography.st();
    let tc_s = cc * input.tc_star_s;
    let spectrum = SpectrumParameters {
        ag: input.ag,
        f0: input.f0,
        s: ss * st,
        eta: 1.0 / input.behaviour_factor.max(1.0),
        tb_s: tc_s / 3.0,
        tc_s,
        td_s: 4.0 * input.ag + 1.6,
    };

    let period_s = input.structure.c1() * input.height_m.powf(0.75);
    let design_acceleration_g = spectrum.design_acceleration(period_s);
    let floors = input.floors.clamp(MIN_FLOORS, MAX_FLOORS);
    let lambda = if floors >= 3 && period_s < 2.0 * tc_s { 0.85 } else { 1.0 };
    let base_shear_n = design_acceleration_g * input.weight_n * lambda;

    // Equal storey weights: Fi ∝ zi
    let storey_height = input.height_m / f64::from(floors);
    let floor_heights_m: Vec<f64> = (1..=floors).map(|i| f64::from(i) * storey_height).collect();
    let sum_z: f64 = floor_heights_m.iter().sum();
    let floor_forces_n = floor_heights_m.iter().map(|z| base_shear_n * z / sum_z).collect();

    Some(SeismicResult {
        soil: input.soil,
        structure: input.structure,
        ss,
        cc,
        st,
        spectrum,
        period_s,
        design_acceleration_g,
        lambda,
        base_shear_n,
        base_shear_ratio: base_shear_n / input.weight_n,
        weight_n: input.weight_n,
        floors,
        floor_heights_m,
        floor_forces_n,
    })
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<SeismicResult>] = &[
    WarningRule::new(
        |r: &SeismicResult| !r.linear_static_admissible(),
        |r: &SeismicResult| {
            format!(
                "Periodo T1 = {:.2} s oltre i limiti dell'analisi statica lineare (2,5·Tc = {:.2} s, Td = {:.2} s): usare l'analisi dinamica.",
                r.period_s,
                2.5 * r.spectrum.tc_s,
                r.spectrum.td_s
            )
        },
    ),
    WarningRule::new(
        |r: &SeismicResult| r.base_shear_ratio > BASE_SHEAR_RATIO_LIMIT,
        |r: &SeismicResult| {
            format!(
                "Taglio alla base pari al {:.0}% del peso sismico: verificare il fattore di comportamento.",
                r.base_shear_ratio * 100.0
            )
        },
    ),
];

/// Pipeline adapter for [`Domain::Seismic`]
pub struct SeismicCalculator;

impl Calculator for SeismicCalculator {
    const DOMAIN: Domain = Domain::Seismic;
    type Input = SeismicInput;
    type Output = SeismicResult;

    fn normalize(raw: &RawInputs) -> CalcResult<SeismicInput> {
        SeismicInput::from_raw(raw)
    }

    fn evaluate(input: &SeismicInput) -> Option<SeismicResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<SeismicResult>] {
        RULES
    }

    fn summary(r: &SeismicResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let d = format.decimals();
        let l = format.locale;
        let kn = |n: f64| FORCE.from_canonical(n, "kn").unwrap_or(n / 1_000.0);
        let mut rows = vec![
            text_row("Sottosuolo", r.soil.letter()),
            text_row("Struttura", r.structure.label()),
            format_row("Periodo T1", r.period_s, "s", 3, l),
            format_row("Fattore S", r.spectrum.s, "", 3, l),
            format_row("Tc", r.spectrum.tc_s, "s", 3, l),
            format_row("Sd(T1)", r.design_acceleration_g, "g", 4, l),
            format_row("λ", r.lambda, "", 2, l),
            format_row("Taglio alla base Fh", kn(r.base_shear_n), "kN", d, l),
            format_row("Fh / W", r.base_shear_ratio * 100.0, "%", d, l),
        ];
        rows.extend(
            r.floor_forces_n
                .iter()
                .enumerate()
                .map(|(i, f)| format_row(format!("Forza piano {}", i + 1), kn(*f), "kN", d, l)),
        );
        rows
    }

    fn quantities(r: &SeismicResult) -> BTreeMap<String, f64> {
        let mut map = numeric_fields(r);
        map.extend(numeric_fields(&r.spectrum).into_iter().map(|(k, v)| (format!("spectrum_{}", k), v)));
        map.extend(
            r.floor_forces_n
                .iter()
                .enumerate()
                .map(|(i, f)| (format!("floor_{}_force_n", i + 1), *f)),
        );
        map
    }
}
