//! # Power Conversion
//!
//! Converts a power between the units of [`POWER`] and, given an
//! efficiency, reports the input power a machine absorbs to deliver it.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::power::{calculate, PowerInput};
//!
//! let result = calculate(&PowerInput::default()).unwrap(); // 15 kW -> HP
//! assert_eq!(result.power_w, 15_000.0);
//! assert!((result.target_value - 20.1153).abs() < 1e-4);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, FormatSettings, SummaryRow};
use crate::parse::RawInputs;
use crate::units::tables::POWER;
use crate::units::{convert_between, to_canonical, UnitValue};
use crate::warnings::WarningRule;

const CONVERSION_DECIMALS: u8 = 4;

/// Inputs for a power conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerInput {
    /// Delivered power, in `unit`
    pub value: f64,
    /// Unit id of `value`
    pub unit: String,
    /// Unit id to convert to
    pub target_unit: String,
    /// Efficiency as a fraction, 0.01 to 1
    pub efficiency: f64,
}

impl Default for PowerInput {
    fn default() -> Self {
        PowerInput {
            value: 15.0,
            unit: "kw".to_string(),
            target_unit: "hp".to_string(),
            efficiency: 1.0,
        }
    }
}

impl PowerInput {
    /// Build from `value` + `unit` (default 15 kW), `target` (default hp)
    /// and `efficiency` in percent (default 100, clamped 1–100).
    pub fn from_raw(raw: &RawInputs) -> CalcResult<Self> {
        let d = PowerInput::default();
        let (value, unit) = raw.entered("value", d.value, "unit", &POWER, &d.unit)?;
        Ok(PowerInput {
            value,
            unit,
            target_unit: raw.unit_id("target", &POWER, &d.target_unit)?,
            efficiency: raw.bounded("efficiency", 100.0, 1.0, 100.0) / 100.0,
        })
    }
}

/// Converted power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerResult {
    /// Delivered power (W)
    pub power_w: f64,
    /// Delivered power in the target unit
    pub target_value: f64,
    /// Target unit id
    pub target_unit: String,
    /// Efficiency as a fraction
    pub efficiency: f64,
    /// Power absorbed to deliver `power_w` (W)
    pub absorbed_power_w: f64,
    /// Losses (W)
    pub losses_w: f64,
    /// Delivered power in every unit of the table
    pub conversions: Vec<UnitValue>,
}

/// Convert; `None` for a unit id missing from [`POWER`] or a
/// non-positive efficiency.
pub fn calculate(input: &PowerInput) -> Option<PowerResult> {
    let unit = POWER.get(&input.unit).ok()?;
    let target = POWER.get(&input.target_unit).ok()?;
    if input.efficiency <= 0.0 {
        return None;
    }
    let power_w = to_canonical(input.value, unit);
    let absorbed_power_w = power_w / input.efficiency;

    Some(PowerResult {
        power_w,
        target_value: convert_between(input.value, unit, target),
        target_unit: target.id.clone(),
        efficiency: input.efficiency,
        absorbed_power_w,
        losses_w: absorbed_power_w - power_w,
        conversions: POWER.express_from(input.value, unit),
    })
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<PowerResult>] = &[
    WarningRule::new(
        |r: &PowerResult| r.power_w < 0.0,
        |_: &PowerResult| {
            "Potenza negativa: verificare il segno del valore inserito.".to_string()
        },
    ),
    WarningRule::new(
        |r: &PowerResult| r.efficiency < 0.5,
        |r: &PowerResult| {
            format!(
                "Rendimento del {:.0}%: oltre metà della potenza assorbita è dissipata.",
                r.efficiency * 100.0
            )
        },
    ),
];

/// Pipeline adapter for [`Domain::Power`]
pub struct PowerCalculator;

impl Calculator for PowerCalculator {
    const DOMAIN: Domain = Domain::Power;
    type Input = PowerInput;
    type Output = PowerResult;

    fn normalize(raw: &RawInputs) -> CalcResult<PowerInput> {
        PowerInput::from_raw(raw)
    }

    fn evaluate(input: &PowerInput) -> Option<PowerResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<PowerResult>] {
        RULES
    }

    fn summary(r: &PowerResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let l = format.locale;
        let d = format.decimals();
        let symbol = POWER.get(&r.target_unit).map(|u| u.symbol.as_str()).unwrap_or("");
        let mut rows = vec![
            format_row("Risultato", r.target_value, symbol, CONVERSION_DECIMALS, l),
            format_row("Potenza assorbita", r.absorbed_power_w, "W", d, l),
            format_row("Perdite", r.losses_w, "W", d, l),
        ];
        rows.extend(r.conversions.iter().map(|c| {
            let label = POWER.get(&c.unit).map(|u| u.label.clone()).unwrap_or_else(|_| c.unit.clone());
            format_row(label, c.value, &c.symbol, CONVERSION_DECIMALS, l)
        }));
        rows
    }

    fn quantities(r: &PowerResult) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::from([
            ("power_w".to_string(), r.power_w),
            ("target_value".to_string(), r.target_value),
            ("efficiency".to_string(), r.efficiency),
            ("absorbed_power_w".to_string(), r.absorbed_power_w),
            ("losses_w".to_string(), r.losses_w),
        ]);
        map.extend(r.conversions.iter().map(|c| (format!("in_{}", c.unit), c.value)));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::generate_warnings;
    use approx::assert_relative_eq;

    #[test]
    fn test_kw_to_hp() {
        let raw = RawInputs::new().with("value", "15").with("unit", "kw").with("target", "hp");
        let result = calculate(&PowerInput::from_raw(&raw).unwrap()).unwrap();
        assert_eq!(result.power_w, 15_000.0);
        assert_relative_eq!(result.target_value, 15_000.0 / 745.699_871_582_270_2);
        assert_relative_eq!(result.target_value, 20.1153, epsilon = 1e-4);
        assert_eq!(result.losses_w, 0.0);
        assert!(generate_warnings(RULES, &result).is_empty());
    }

    #[test]
    fn test_efficiency() {
        let raw = RawInputs::new().with("value", "7,5").with("efficiency", "90");
        let result = calculate(&PowerInput::from_raw(&raw).unwrap()).unwrap();
        assert_relative_eq!(result.absorbed_power_w, 7_500.0 / 0.9, epsilon = 1e-9);
        assert_relative_eq!(result.losses_w, 7_500.0 / 0.9 - 7_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_efficiency_is_clamped() {
        let raw = RawInputs::new().with("efficiency", "0");
        let input = PowerInput::from_raw(&raw).unwrap();
        assert_eq!(input.efficiency, 0.01);
        let result = calculate(&input).unwrap();
        let warnings = generate_warnings(RULES, &result);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Rendimento del 1%"));
    }

    #[test]
    fn test_negative_power_warns() {
        let raw = RawInputs::new().with("value", "-3");
        let result = calculate(&PowerInput::from_raw(&raw).unwrap()).unwrap();
        assert_eq!(generate_warnings(RULES, &result).len(), 1);
    }

    #[test]
    fn test_same_unit_conversion_is_exact() {
        let raw = RawInputs::new().with("value", "0,308").with("unit", "hp").with("target", "hp");
        let result = calculate(&PowerInput::from_raw(&raw).unwrap()).unwrap();
        assert_eq!(result.target_value, 0.308);
        let in_hp = result.conversions.iter().find(|c| c.unit == "hp").unwrap();
        assert_eq!(in_hp.value, 0.308);
    }

    #[test]
    fn test_cv_to_watt() {
        let raw = RawInputs::new().with("value", "1").with("unit", "cv").with("target", "w");
        let result = calculate(&PowerInput::from_raw(&raw).unwrap()).unwrap();
        assert_relative_eq!(result.target_value, 735.498_75);
    }
}
