//! # Numeric Parsing & Normalization
//!
//! Form fields arrive as text, possibly half typed and possibly using the
//! Italian decimal comma. Parsing here never fails: anything that does not
//! produce a finite number yields the caller's fallback.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::parse::{parse_number, RawInputs};
//!
//! assert_eq!(parse_number("12,5", 0.0), 12.5);
//! assert_eq!(parse_number("12,", 0.0), 12.0);
//! assert_eq!(parse_number("abc", 7.0), 7.0);
//!
//! let raw: RawInputs = [("voltage", "400"), ("cos_phi", "0,9")].into_iter().collect();
//! assert_eq!(raw.number("voltage", 230.0), 400.0);
//! assert_eq!(raw.bounded("cos_phi", 0.9, 0.5, 1.0), 0.9);
//! assert_eq!(raw.number("length", 10.0), 10.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::{to_canonical, UnitTable};

/// Parse a decimal-comma or decimal-point number.
///
/// Returns `fallback` for empty input, unparsable text, and non-finite
/// results (`"inf"`, `"NaN"`, overflow).
pub fn parse_number(raw: &str, fallback: f64) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback;
    }
    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => fallback,
    }
}

/// Restrict `value` to `[min, max]`.
///
/// Bounds are chosen by each domain (power factor, efficiency, ...), so
/// there is no global clamp.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    debug_assert!(min <= max, "clamp called with min {} > max {}", min, max);
    value.max(min).min(max)
}

/// An enumeration selectable from a form `<select>`.
pub trait FormOption: Sized + Copy + 'static {
    /// Accepted keys (lowercase) and their values, in display order
    const OPTIONS: &'static [(&'static str, Self)];

    /// Key of a value, for display and logging
    fn key(self) -> &'static str
    where
        Self: PartialEq,
    {
        Self::OPTIONS
            .iter()
            .find(|(_, v)| *v == self)
            .map(|(k, _)| *k)
            .unwrap_or("?")
    }
}

/// Raw form inputs keyed by field name.
///
/// Every field is optional from the engine's point of view: missing or
/// malformed fields normalize to the fallback supplied at the lookup site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInputs(BTreeMap<String, String>);

impl RawInputs {
    /// Create an empty input bag
    pub fn new() -> Self {
        RawInputs(BTreeMap::new())
    }

    /// Insert or replace a field (builder pattern)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Raw text of a field, if present
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Parse a numeric field, falling back when missing or malformed
    pub fn number(&self, field: &str, fallback: f64) -> f64 {
        self.get(field)
            .map(|raw| parse_number(raw, fallback))
            .unwrap_or(fallback)
    }

    /// Parse a numeric field and clamp it to the domain bounds
    pub fn bounded(&self, field: &str, fallback: f64, min: f64, max: f64) -> f64 {
        clamp(self.number(field, fallback), min, max)
    }

    /// Enumeration key: trimmed and lowercased, `default` when blank or missing
    pub fn key(&self, field: &str, default: &str) -> String {
        match self.get(field).map(str::trim) {
            Some(value) if !value.is_empty() => value.to_lowercase(),
            _ => default.to_string(),
        }
    }

    /// Selected enumeration value.
    ///
    /// Missing or blank selects `default`; an unrecognised key is an
    /// [`CalcError::UnknownOption`].
    pub fn option<T: FormOption>(&self, field: &str, default: T) -> CalcResult<T> {
        let raw = match self.get(field).map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(default),
        };
        let wanted = raw.to_lowercase();
        T::OPTIONS
            .iter()
            .find(|(key, _)| *key == wanted)
            .map(|(_, value)| *value)
            .ok_or_else(|| {
                let allowed: Vec<&str> = T::OPTIONS.iter().map(|(key, _)| *key).collect();
                CalcError::unknown_option(field, raw, &allowed)
            })
    }

    /// Unit id chosen in `unit_field`, validated against `table`.
    ///
    /// Missing or blank selects `default_unit`; an unknown id is an
    /// [`CalcError::UnknownUnit`].
    pub fn unit_id(&self, unit_field: &str, table: &UnitTable, default_unit: &str) -> CalcResult<String> {
        let id = self.key(unit_field, default_unit);
        table.get(&id)?;
        Ok(id)
    }

    /// Numeric field together with the unit id it is expressed in, as
    /// entered (no conversion).
    ///
    /// `fallback` is in `default_unit`, so a blank form shows the same
    /// physical default regardless of the selected unit.
    pub fn entered(
        &self,
        field: &str,
        fallback: f64,
        unit_field: &str,
        table: &UnitTable,
        default_unit: &str,
    ) -> CalcResult<(f64, String)> {
        let unit = self.unit_id(unit_field, table, default_unit)?;
        match self.get(field).map(|raw| parse_number(raw, f64::NAN)) {
            Some(value) if value.is_finite() => Ok((value, unit)),
            _ => {
                table.get(default_unit)?;
                Ok((fallback, default_unit.to_string()))
            }
        }
    }

    /// Numeric field expressed in the unit selected by `unit_field`,
    /// converted to the table's canonical SI unit. Fallback as in
    /// [`RawInputs::entered`].
    pub fn measure(
        &self,
        field: &str,
        fallback: f64,
        unit_field: &str,
        table: &UnitTable,
        default_unit: &str,
    ) -> CalcResult<f64> {
        let (value, unit) = self.entered(field, fallback, unit_field, table, default_unit)?;
        Ok(to_canonical(value, table.get(&unit)?))
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `key=value` assignment as typed on a command line.
    ///
    /// Returns `None` when there is no `=` or the key is blank.
    pub fn parse_assignment(text: &str) -> Option<(String, String)> {
        let (key, value) = text.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.trim().to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawInputs(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_comma_and_point() {
        assert_eq!(parse_number("3,75", 0.0), 3.75);
        assert_eq!(parse_number("3.75", 0.0), 3.75);
        assert_eq!(parse_number("  -2,5 ", 0.0), -2.5);
        assert_eq!(parse_number("1e3", 0.0), 1000.0);
    }

    #[test]
    fn test_fallback_on_malformed_input() {
        assert_eq!(parse_number("", 4.0), 4.0);
        assert_eq!(parse_number("   ", 4.0), 4.0);
        assert_eq!(parse_number("-", 4.0), 4.0);
        assert_eq!(parse_number("1,2,3", 4.0), 4.0);
        assert_eq!(parse_number("dieci", 4.0), 4.0);
    }

    #[test]
    fn test_fallback_on_non_finite() {
        assert_eq!(parse_number("inf", 1.0), 1.0);
        assert_eq!(parse_number("NaN", 1.0), 1.0);
        assert_eq!(parse_number("1e400", 1.0), 1.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.3, 0.5, 1.0), 0.5);
        assert_eq!(clamp(1.2, 0.5, 1.0), 1.0);
        assert_eq!(clamp(0.85, 0.5, 1.0), 0.85);
    }

    #[test]
    fn test_raw_inputs_lookup() {
        let raw = RawInputs::new()
            .with("power", "15,5")
            .with("system", " Three ")
            .with("bad", "x");
        assert_eq!(raw.number("power", 0.0), 15.5);
        assert_eq!(raw.number("bad", 2.0), 2.0);
        assert_eq!(raw.number("missing", 9.0), 9.0);
        assert_eq!(raw.key("system", "single"), "three");
        assert_eq!(raw.key("missing", "single"), "single");
        assert_eq!(raw.len(), 3);
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Phase {
        Single,
        Three,
    }

    impl FormOption for Phase {
        const OPTIONS: &'static [(&'static str, Self)] = &[("single", Phase::Single), ("three", Phase::Three)];
    }

    #[test]
    fn test_option_lookup() {
        let raw = RawInputs::new().with("system", "THREE").with("bad", "five");
        assert_eq!(raw.option("system", Phase::Single).unwrap(), Phase::Three);
        assert_eq!(raw.option("missing", Phase::Single).unwrap(), Phase::Single);
        let err = raw.option("bad", Phase::Single).unwrap_err();
        assert_eq!(err, CalcError::unknown_option("bad", "five", &["single", "three"]));
        assert_eq!(Phase::Three.key(), "three");
    }

    #[test]
    fn test_measure_converts_to_si() {
        use crate::units::tables::LENGTH;

        let raw = RawInputs::new().with("span", "450").with("span_unit", "cm");
        assert_eq!(raw.measure("span", 5.0, "span_unit", &LENGTH, "m").unwrap(), 4.5);

        // Blank value: the fallback is in the default unit, not the selected one.
        let raw = RawInputs::new().with("span_unit", "mm");
        assert_eq!(raw.measure("span", 5.0, "span_unit", &LENGTH, "m").unwrap(), 5.0);

        let raw = RawInputs::new().with("span", "3").with("span_unit", "cubit");
        assert!(matches!(
            raw.measure("span", 5.0, "span_unit", &LENGTH, "m"),
            Err(CalcError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_entered_keeps_value_and_unit() {
        use crate::units::tables::PRESSURE;

        let raw = RawInputs::new().with("value", "0,308").with("unit", "PSI");
        assert_eq!(
            raw.entered("value", 1.0, "unit", &PRESSURE, "bar").unwrap(),
            (0.308, "psi".to_string())
        );

        // Fallback travels with the default unit, whatever was selected.
        let raw = RawInputs::new().with("value", "x").with("unit", "psi");
        assert_eq!(
            raw.entered("value", 1.0, "unit", &PRESSURE, "bar").unwrap(),
            (1.0, "bar".to_string())
        );
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            RawInputs::parse_assignment("voltage = 400"),
            Some(("voltage".to_string(), "400".to_string()))
        );
        assert_eq!(RawInputs::parse_assignment("voltage"), None);
        assert_eq!(RawInputs::parse_assignment("=400"), None);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let raw = RawInputs::new().with("span", "5");
        let json = serde_json::to_string(&raw).unwrap();
        assert_eq!(json, r#"{"span":"5"}"#);
    }
}
