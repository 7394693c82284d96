//! # Domain Calculations
//!
//! Every calculator follows the same pipeline:
//!
//! ```text
//! RawInputs ──normalize──▶ *Input (SI) ──calculate──▶ Option<*Result (SI)>
//!                                                       │
//!                                    rules ◀────────────┤
//!                                    summary rows ◀─────┘
//! ```
//!
//! and each module exposes the same three pieces:
//!
//! - `*Input` - typed inputs in SI units, built from raw form text
//! - `*Result` - derived quantities in SI units (JSON-serializable)
//! - `calculate(&input) -> Option<*Result>` - pure formula chain; `None`
//!   means the inputs are outside the physically valid domain
//!
//! The [`Calculator`] trait ties those together so [`run`] can drive any
//! domain, and [`evaluate_domain`] dispatches by [`Domain`].
//!
//! ## Error Handling
//!
//! - malformed numbers: replaced by the field's default during normalization
//! - physically invalid inputs: `Ok(None)`
//! - design concerns: warning strings on `Ok(Some(result))`
//! - unknown unit / option ids: `Err(CalcError)`
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::{evaluate_domain, Domain};
//! use calcolo_core::parse::RawInputs;
//! use calcolo_core::settings::EngineSettings;
//!
//! let raw: RawInputs = [("investment", "10000"), ("revenue", "15000"), ("costs", "3000")]
//!     .into_iter()
//!     .collect();
//!
//! let result = evaluate_domain(Domain::Roi, &raw, &EngineSettings::default())
//!     .unwrap()
//!     .expect("valid inputs");
//! assert_eq!(result.quantity("roi_percentage"), Some(20.0));
//! ```

pub mod bearing_capacity;
pub mod beam_verification;
pub mod cable_sizing;
pub mod conductors;
pub mod power;
pub mod power_factor;
pub mod pressure;
pub mod roi;
pub mod seismic;
pub mod short_circuit;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::{FormatSettings, SummaryRow};
use crate::parse::RawInputs;
use crate::settings::EngineSettings;
use crate::warnings::{generate_warnings, WarningRule};

pub use bearing_capacity::{BearingCapacityInput, BearingCapacityResult};
pub use beam_verification::{BeamVerificationInput, BeamVerificationResult};
pub use cable_sizing::{CableSizingInput, CableSizingResult};
pub use power::{PowerInput, PowerResult};
pub use power_factor::{PowerFactorInput, PowerFactorResult};
pub use pressure::{PressureInput, PressureResult};
pub use roi::{RoiInput, RoiResult};
pub use seismic::{SeismicInput, SeismicResult};
pub use short_circuit::{ShortCircuitInput, ShortCircuitResult};

/// One calculator domain, expressed as the four pipeline stages.
pub trait Calculator {
    /// Domain this calculator implements
    const DOMAIN: Domain;

    /// Normalized SI inputs
    type Input: fmt::Debug;

    /// Derived quantities in SI units
    type Output: Serialize + 'static;

    /// Parse, clamp and convert raw form fields.
    ///
    /// Fails only for programming errors such as an unknown unit id.
    fn normalize(raw: &RawInputs) -> CalcResult<Self::Input>;

    /// Apply the domain formula; `None` when inputs are physically invalid.
    fn evaluate(input: &Self::Input) -> Option<Self::Output>;

    /// Ordered advisory rules over the derived quantities
    fn rules() -> &'static [WarningRule<Self::Output>];

    /// Display rows, in the domain's fixed order
    fn summary(output: &Self::Output, format: &FormatSettings) -> Vec<SummaryRow>;

    /// Named numeric quantities (every numeric field of `Output`)
    fn quantities(output: &Self::Output) -> BTreeMap<String, f64> {
        numeric_fields(output)
    }
}

/// Top-level numeric fields of a serializable struct, by field name.
/// Booleans, strings and sequences are skipped.
///
/// serde_json writes non-finite floats as `null`; those come back as NaN
/// so [`run`] can see them. Output structs carry no `Option` fields.
pub(crate) fn numeric_fields<T: Serialize>(value: &T) -> BTreeMap<String, f64> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::Null => Some((name, f64::NAN)),
                other => other.as_f64().map(|n| (name, n)),
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Outcome of one pipeline run. Owned by the caller, never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    derived_quantities: BTreeMap<String, f64>,
    summary_rows: Vec<SummaryRow>,
    warnings: Vec<String>,
}

impl CalculationResult {
    /// Derived quantities in SI units, keyed by name
    pub fn derived_quantities(&self) -> &BTreeMap<String, f64> {
        &self.derived_quantities
    }

    /// A single derived quantity
    pub fn quantity(&self, name: &str) -> Option<f64> {
        self.derived_quantities.get(name).copied()
    }

    /// Presentation rows in fixed domain order
    pub fn summary_rows(&self) -> &[SummaryRow] {
        &self.summary_rows
    }

    /// Advisory messages; empty when nothing fired
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// True if at least one advisory fired
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Pretty JSON for API consumers
    pub fn to_json(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run the full pipeline for calculator `C`.
pub fn run<C: Calculator>(
    raw: &RawInputs,
    settings: &EngineSettings,
) -> CalcResult<Option<CalculationResult>> {
    let input = C::normalize(raw)?;
    debug!("{}: normalized {} raw fields into {:?}", C::DOMAIN, raw.len(), input);

    let Some(output) = C::evaluate(&input) else {
        debug!("{}: inputs outside the valid domain", C::DOMAIN);
        return Ok(None);
    };

    let derived_quantities = C::quantities(&output);
    if let Some((name, value)) = derived_quantities.iter().find(|(_, v)| !v.is_finite()) {
        debug!("{}: {} = {} overflows, inputs outside the valid domain", C::DOMAIN, name, value);
        return Ok(None);
    }

    Ok(Some(CalculationResult {
        derived_quantities,
        summary_rows: C::summary(&output, &settings.format),
        warnings: generate_warnings(C::rules(), &output),
    }))
}

/// All calculator domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Roi,
    Pressure,
    Power,
    CableSizing,
    ShortCircuit,
    Seismic,
    BearingCapacity,
    BeamVerification,
    PowerFactor,
}

impl Domain {
    /// Every domain, in catalog order
    pub const ALL: [Domain; 9] = [
        Domain::Roi,
        Domain::Pressure,
        Domain::Power,
        Domain::CableSizing,
        Domain::ShortCircuit,
        Domain::Seismic,
        Domain::BearingCapacity,
        Domain::BeamVerification,
        Domain::PowerFactor,
    ];

    /// Machine name (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Roi => "roi",
            Domain::Pressure => "pressure",
            Domain::Power => "power",
            Domain::CableSizing => "cable_sizing",
            Domain::ShortCircuit => "short_circuit",
            Domain::Seismic => "seismic",
            Domain::BearingCapacity => "bearing_capacity",
            Domain::BeamVerification => "beam_verification",
            Domain::PowerFactor => "power_factor",
        }
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            Domain::Roi => "Calcolo ROI",
            Domain::Pressure => "Conversione unità di pressione",
            Domain::Power => "Conversione unità di potenza",
            Domain::CableSizing => "Dimensionamento cavi elettrici",
            Domain::ShortCircuit => "Corrente di cortocircuito",
            Domain::Seismic => "Taglio sismico alla base (NTC 2018)",
            Domain::BearingCapacity => "Capacità portante fondazioni (Terzaghi)",
            Domain::BeamVerification => "Verifica trave in c.a. (EC2)",
            Domain::PowerFactor => "Rifasamento",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| CalcError::unknown_domain(s))
    }
}

/// Evaluate one domain from raw form inputs.
pub fn evaluate_domain(
    domain: Domain,
    raw: &RawInputs,
    settings: &EngineSettings,
) -> CalcResult<Option<CalculationResult>> {
    match domain {
        Domain::Roi => run::<roi::RoiCalculator>(raw, settings),
        Domain::Pressure => run::<pressure::PressureCalculator>(raw, settings),
        Domain::Power => run::<power::PowerCalculator>(raw, settings),
        Domain::CableSizing => run::<cable_sizing::CableSizingCalculator>(raw, settings),
        Domain::ShortCircuit => run::<short_circuit::ShortCircuitCalculator>(raw, settings),
        Domain::Seismic => run::<seismic::SeismicCalculator>(raw, settings),
        Domain::BearingCapacity => run::<bearing_capacity::BearingCapacityCalculator>(raw, settings),
        Domain::BeamVerification => run::<beam_verification::BeamVerificationCalculator>(raw, settings),
        Domain::PowerFactor => run::<power_factor::PowerFactorCalculator>(raw, settings),
    }
}

/// Evaluate a domain given by name (e.g. `"cable-sizing"`).
pub fn evaluate_named(
    name: &str,
    raw: &RawInputs,
    settings: &EngineSettings,
) -> CalcResult<Option<CalculationResult>> {
    evaluate_domain(name.parse()?, raw, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_names_roundtrip() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
            let json = serde_json::to_string(&domain).unwrap();
            assert_eq!(json, format!("\"{}\"", domain.as_str()));
        }
        assert_eq!("Cable-Sizing".parse::<Domain>().unwrap(), Domain::CableSizing);
    }

    #[test]
    fn test_unknown_domain() {
        let err = evaluate_named("astrology", &RawInputs::new(), &EngineSettings::default()).unwrap_err();
        assert_eq!(err, CalcError::unknown_domain("astrology"));
    }

    #[test]
    fn test_every_domain_runs_on_defaults() {
        // Each domain's defaults describe a valid, computable case.
        for domain in Domain::ALL {
            let result = evaluate_domain(domain, &RawInputs::new(), &EngineSettings::default())
                .unwrap()
                .unwrap_or_else(|| panic!("{} rejected its own defaults", domain));
            assert!(!result.summary_rows().is_empty(), "{} has no rows", domain);
            assert!(result.derived_quantities().values().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_overflowing_quantity_is_rejected() {
        // 12000 / 1e-310 overflows to infinity
        let raw = RawInputs::new().with("investment", "1e-310");
        let outcome = evaluate_domain(Domain::Roi, &raw, &EngineSettings::default()).unwrap();
        assert_eq!(outcome, None);
    }

    #[test]
    fn test_numeric_fields_keep_non_finite() {
        #[derive(Serialize)]
        struct Sample {
            finite: f64,
            infinite: f64,
            flag: bool,
        }
        let map = numeric_fields(&Sample { finite: 2.0, infinite: f64::INFINITY, flag: true });
        assert_eq!(map.len(), 2);
        assert_eq!(map["finite"], 2.0);
        assert!(map["infinite"].is_nan());
    }

    #[test]
    fn test_result_json() {
        let raw = RawInputs::new().with("investment", "10000");
        let result = evaluate_domain(Domain::Roi, &raw, &EngineSettings::default())
            .unwrap()
            .unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("derived_quantities"));
        let roundtrip: CalculationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, result);
    }
}
