//! # Pressure Conversion
//!
//! Converts a pressure between the units of [`PRESSURE`], optionally
//! switching between absolute and gauge reference (standard atmosphere,
//! 101 325 Pa).
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::pressure::{calculate, PressureInput};
//!
//! let input = PressureInput::default(); // 1 bar absolute -> psi
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.pressure_pa, 100_000.0);
//! assert!((result.target_value - 14.5038).abs() < 1e-4);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, FormatSettings, SummaryRow};
use crate::parse::{FormOption, RawInputs};
use crate::units::tables::PRESSURE;
use crate::units::{convert_between, to_canonical, UnitValue};
use crate::warnings::WarningRule;

/// Standard atmosphere (Pa)
pub const STANDARD_ATMOSPHERE_PA: f64 = 101_325.0;

/// Decimals used for the per-unit rows
const CONVERSION_DECIMALS: u8 = 4;

/// Whether a pressure is measured from vacuum or from the atmosphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureReference {
    Absolute,
    Gauge,
}

impl FormOption for PressureReference {
    const OPTIONS: &'static [(&'static str, Self)] = &[
        ("absolute", PressureReference::Absolute),
        ("gauge", PressureReference::Gauge),
    ];
}

/// Inputs for a pressure conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureInput {
    /// Entered pressure, in `unit` and in the entered reference
    pub value: f64,
    /// Unit id of `value`
    pub unit: String,
    /// Reference of the entered value
    pub reference: PressureReference,
    /// Unit id to convert to
    pub target_unit: String,
}

impl Default for PressureInput {
    fn default() -> Self {
        PressureInput {
            value: 1.0,
            unit: "bar".to_string(),
            reference: PressureReference::Absolute,
            target_unit: "psi".to_string(),
        }
    }
}

impl PressureInput {
    /// Build from `value` + `unit` (default 1 bar), `target` (default psi)
    /// and `reference` (default absolute).
    pub fn from_raw(raw: &RawInputs) -> CalcResult<Self> {
        let d = PressureInput::default();
        let (value, unit) = raw.entered("value", d.value, "unit", &PRESSURE, &d.unit)?;
        Ok(PressureInput {
            value,
            unit,
            reference: raw.option("reference", d.reference)?,
            target_unit: raw.unit_id("target", &PRESSURE, &d.target_unit)?,
        })
    }
}

/// Converted pressure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureResult {
    /// Entered pressure in Pa (same reference as entered)
    pub pressure_pa: f64,
    /// Reference of the entered value
    pub reference: PressureReference,
    /// Absolute pressure (Pa)
    pub absolute_pa: f64,
    /// Gauge pressure (Pa)
    pub gauge_pa: f64,
    /// Entered pressure in the target unit
    pub target_value: f64,
    /// Target unit id
    pub target_unit: String,
    /// Entered pressure in every unit of the table
    pub conversions: Vec<UnitValue>,
}

/// Convert; `None` for a unit id missing from [`PRESSURE`].
pub fn calculate(input: &PressureInput) -> Option<PressureResult> {
    let unit = PRESSURE.get(&input.unit).ok()?;
    let target = PRESSURE.get(&input.target_unit).ok()?;
    let pressure_pa = to_canonical(input.value, unit);
    let (absolute_pa, gauge_pa) = match input.reference {
        PressureReference::Absolute => (pressure_pa, pressure_pa - STANDARD_ATMOSPHERE_PA),
        PressureReference::Gauge => (pressure_pa + STANDARD_ATMOSPHERE_PA, pressure_pa),
    };

    Some(PressureResult {
        pressure_pa,
        reference: input.reference,
        absolute_pa,
        gauge_pa,
        target_value: convert_between(input.value, unit, target),
        target_unit: target.id.clone(),
        conversions: PRESSURE.express_from(input.value, unit),
    })
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<PressureResult>] = &[
    WarningRule::new(
        |r: &PressureResult| r.absolute_pa < 0.0,
        |r: &PressureResult| {
            format!(
                "Pressione assoluta negativa ({:.0} Pa): valore fisicamente impossibile.",
                r.absolute_pa
            )
        },
    ),
    WarningRule::new(
        |r: &PressureResult| {
            r.reference == PressureReference::Gauge && r.gauge_pa < 0.0 && r.absolute_pa >= 0.0
        },
        |_: &PressureResult| {
            "Pressione inferiore a quella atmosferica: il valore relativo indica una depressione."
                .to_string()
        },
    ),
];

/// Pipeline adapter for [`Domain::Pressure`]
pub struct PressureCalculator;

impl Calculator for PressureCalculator {
    const DOMAIN: Domain = Domain::Pressure;
    type Input = PressureInput;
    type Output = PressureResult;

    fn normalize(raw: &RawInputs) -> CalcResult<PressureInput> {
        PressureInput::from_raw(raw)
    }

    fn evaluate(input: &PressureInput) -> Option<PressureResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<PressureResult>] {
        RULES
    }

    fn summary(r: &PressureResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let l = format.locale;
        let target_symbol = PRESSURE
            .get(&r.target_unit)
            .map(|u| u.symbol.as_str())
            .unwrap_or("");
        let mut rows = vec![
            format_row("Risultato", r.target_value, target_symbol, CONVERSION_DECIMALS, l),
            format_row("Pressione assoluta", r.absolute_pa, "Pa", 0, l),
            format_row("Pressione relativa", r.gauge_pa, "Pa", 0, l),
        ];
        rows.extend(r.conversions.iter().map(|c| {
            let label = PRESSURE.get(&c.unit).map(|u| u.label.clone()).unwrap_or_else(|_| c.unit.clone());
            format_row(label, c.value, &c.symbol, CONVERSION_DECIMALS, l)
        }));
        rows
    }

    fn quantities(r: &PressureResult) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::from([
            ("pressure_pa".to_string(), r.pressure_pa),
            ("absolute_pa".to_string(), r.absolute_pa),
            ("gauge_pa".to_string(), r.gauge_pa),
            ("target_value".to_string(), r.target_value),
        ]);
        map.extend(r.conversions.iter().map(|c| (format!("in_{}", c.unit), c.value)));
        map
    }
}
