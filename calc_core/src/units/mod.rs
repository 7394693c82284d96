//! # Unit Tables
//!
//! Every physical quantity the engine accepts from a form is described by a
//! [`UnitTable`]: an ordered set of [`UnitDefinition`]s, each carrying a single
//! multiplicative factor against the table's canonical SI unit.
//!
//! ## Design Philosophy
//!
//! - **Two hops only**: `a -> canonical -> b`. There is no pairwise factor
//!   table, so two units can never disagree about each other.
//! - **Immutable**: tables are built once ([`tables`]) and never mutated.
//! - **Fail closed**: an unknown unit id is a caller defect and returns
//!   [`CalcError::UnknownUnit`] instead of guessing a default.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::units::tables::{POWER, PRESSURE};
//!
//! let pa = PRESSURE.convert(1.0, "bar", "pa").unwrap();
//! assert_eq!(pa, 100_000.0);
//!
//! let hp = POWER.convert(15.0, "kw", "hp").unwrap();
//! assert!((hp - 20.1153).abs() < 1e-4);
//! ```

pub mod tables;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// One unit of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Unique id within the table (e.g. "kpa", "psi")
    pub id: String,
    /// Display label (e.g. "Kilopascal")
    pub label: String,
    /// Display symbol (e.g. "kPa")
    pub symbol: String,
    /// canonical_value = value × factor_to_canonical
    pub factor_to_canonical: f64,
}

impl UnitDefinition {
    /// Create a unit definition
    pub fn new(id: &str, label: &str, symbol: &str, factor_to_canonical: f64) -> Self {
        UnitDefinition {
            id: id.to_string(),
            label: label.to_string(),
            symbol: symbol.to_string(),
            factor_to_canonical,
        }
    }

    /// True for the table's reference unit
    pub fn is_canonical(&self) -> bool {
        self.factor_to_canonical == 1.0
    }
}

/// A value expressed in one unit of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    pub unit: String,
    pub symbol: String,
    pub value: f64,
}

/// Convert a value expressed in `unit` to the canonical unit.
pub fn to_canonical(value: f64, unit: &UnitDefinition) -> f64 {
    value * unit.factor_to_canonical
}

/// Convert a canonical value into `unit`.
pub fn from_canonical(value: f64, unit: &UnitDefinition) -> f64 {
    value / unit.factor_to_canonical
}

/// Convert between two units of the same table through the canonical unit.
///
/// Converting a unit to itself returns `value` unchanged.
pub fn convert_between(value: f64, from: &UnitDefinition, to: &UnitDefinition) -> f64 {
    if from.id == to.id {
        return value;
    }
    from_canonical(to_canonical(value, from), to)
}

/// Ordered, validated collection of units sharing one canonical unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitTable {
    name: String,
    default_unit: String,
    units: Vec<UnitDefinition>,
}

impl UnitTable {
    /// Build a table, checking its invariants:
    ///
    /// - at least one unit, ids unique
    /// - every factor finite and strictly positive
    /// - exactly one unit with factor `1.0` (the canonical unit)
    /// - `default_unit` is one of the ids
    pub fn new(
        name: impl Into<String>,
        default_unit: impl Into<String>,
        units: Vec<UnitDefinition>,
    ) -> CalcResult<Self> {
        let name = name.into();
        let default_unit = default_unit.into();

        if units.is_empty() {
            return Err(CalcError::invalid_unit_table(&name, "table has no units"));
        }

        for (i, unit) in units.iter().enumerate() {
            if !unit.factor_to_canonical.is_finite() || unit.factor_to_canonical <= 0.0 {
                return Err(CalcError::invalid_unit_table(
                    &name,
                    format!(
                        "unit '{}' has invalid factor {}",
                        unit.id, unit.factor_to_canonical
                    ),
                ));
            }
            if units[..i].iter().any(|u| u.id == unit.id) {
                return Err(CalcError::invalid_unit_table(
                    &name,
                    format!("duplicate unit id '{}'", unit.id),
                ));
            }
        }

        let canonical_count = units.iter().filter(|u| u.is_canonical()).count();
        if canonical_count != 1 {
            return Err(CalcError::invalid_unit_table(
                &name,
                format!("expected exactly one canonical unit, found {}", canonical_count),
            ));
        }

        if !units.iter().any(|u| u.id == default_unit) {
            return Err(CalcError::invalid_unit_table(
                &name,
                format!("default unit '{}' is not in the table", default_unit),
            ));
        }

        Ok(UnitTable {
            name,
            default_unit,
            units,
        })
    }

    /// Table name (e.g. "pressure")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the unit a form preselects
    pub fn default_unit(&self) -> &str {
        &self.default_unit
    }

    /// Look up a unit by id.
    pub fn get(&self, id: &str) -> CalcResult<&UnitDefinition> {
        self.units
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| CalcError::unknown_unit(&self.name, id))
    }

    /// The canonical (factor 1) unit
    pub fn canonical(&self) -> &UnitDefinition {
        // Exactly one exists, checked in `new`.
        self.units
            .iter()
            .find(|u| u.is_canonical())
            .unwrap_or(&self.units[0])
    }

    /// Convert `value` from unit `from` to unit `to`.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> CalcResult<f64> {
        let a = self.get(from)?;
        let b = self.get(to)?;
        let converted = convert_between(value, a, b);
        trace!("{}: {} {} -> {} {}", self.name, value, from, converted, to);
        Ok(converted)
    }

    /// Convert `value` in unit `from` to the canonical unit.
    pub fn to_canonical(&self, value: f64, from: &str) -> CalcResult<f64> {
        Ok(to_canonical(value, self.get(from)?))
    }

    /// Convert a canonical value into unit `to`.
    pub fn from_canonical(&self, value: f64, to: &str) -> CalcResult<f64> {
        Ok(from_canonical(value, self.get(to)?))
    }

    /// A canonical value expressed in every unit of the table, in
    /// declaration order
    pub fn express_all(&self, canonical_value: f64) -> Vec<UnitValue> {
        self.express_from(canonical_value, self.canonical())
    }

    /// A value in unit `from` expressed in every unit of the table. The
    /// entry for `from` itself is `value` unchanged.
    pub fn express_from(&self, value: f64, from: &UnitDefinition) -> Vec<UnitValue> {
        self.units
            .iter()
            .map(|u| UnitValue {
                unit: u.id.clone(),
                symbol: u.symbol.clone(),
                value: convert_between(value, from, u),
            })
            .collect()
    }

    /// Units in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &UnitDefinition> {
        self.units.iter()
    }

    /// Unit ids in declaration order
    pub fn ids(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.id.as_str()).collect()
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Always false for a validated table
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
