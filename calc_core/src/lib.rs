//! # calcolo_core - Unit-Aware Engineering Calculation Engine
//!
//! `calcolo_core` evaluates the calculators of Calcolo: electrical (cable
//! sizing, short-circuit, power factor), structural and geotechnical
//! (seismic base shear, bearing capacity, RC beams), unit conversion, and
//! ROI. Every calculator is a stateless pipeline over raw form text:
//!
//! ```text
//! raw inputs → parse/normalize → SI units → formula → warnings → summary rows
//! ```
//!
//! ## Design Philosophy
//!
//! - **Stateless**: pure functions from inputs to a fresh result
//! - **SI inside**: all derived quantities are SI; display units are a
//!   formatting concern
//! - **JSON-First**: inputs, results, and errors implement Serialize
//! - **Tolerant inputs, strict ids**: malformed numbers fall back to
//!   defaults, unknown unit or option ids are errors
//!
//! ## Quick Start
//!
//! ```rust
//! use calcolo_core::{evaluate_named, EngineSettings, RawInputs};
//!
//! let raw = RawInputs::new()
//!     .with("value", "1")
//!     .with("unit", "bar")
//!     .with("target", "psi");
//!
//! let result = evaluate_named("pressure", &raw, &EngineSettings::default())
//!     .unwrap()
//!     .expect("1 bar is a valid pressure");
//! assert_eq!(result.quantity("pressure_pa"), Some(100_000.0));
//! assert_eq!(result.summary_rows()[0].value, "14,5038 psi");
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - domain calculators and the evaluation pipeline
//! - [`parse`] - decimal-comma parsing and raw input normalization
//! - [`units`] - unit tables and conversion through a canonical unit
//! - [`warnings`] - ordered advisory rules
//! - [`format`] - rounding and locale-aware display rows
//! - [`settings`] - engine settings loaded from TOML
//! - [`errors`] - structured error types

pub mod calculations;
pub mod errors;
pub mod format;
pub mod parse;
pub mod settings;
pub mod units;
pub mod warnings;

// Re-export commonly used types at crate root for convenience
pub use calculations::{evaluate_domain, evaluate_named, CalculationResult, Calculator, Domain};
pub use errors::{CalcError, CalcResult};
pub use format::{FormatSettings, NumberLocale, SummaryRow};
pub use parse::RawInputs;
pub use settings::EngineSettings;
pub use units::{UnitDefinition, UnitTable};
