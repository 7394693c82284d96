//! # Result Formatting
//!
//! Turns derived quantities into labelled display rows. Formatting works on
//! copies: the numbers stored in a result keep full precision.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::format::{format_number, format_row, round, NumberLocale};
//!
//! assert_eq!(round(2.345, 2), 2.35);
//! assert_eq!(format_number(1234567.891, 2, NumberLocale::Italian), "1.234.567,89");
//! assert_eq!(format_number(1234567.891, 2, NumberLocale::English), "1,234,567.89");
//!
//! let row = format_row("Corrente di impiego", 21.65, "A", 1, NumberLocale::Italian);
//! assert_eq!(row.value, "21,7 A");
//! ```

use serde::{Deserialize, Serialize};

/// Highest number of decimals any display row uses
pub const MAX_DECIMALS: u8 = 6;

/// Round half away from zero to `decimals` places.
pub fn round(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimals.min(MAX_DECIMALS)));
    (value * factor).round() / factor
}

/// Decimal and grouping separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberLocale {
    /// `1.234,5`
    #[default]
    Italian,
    /// `1,234.5`
    English,
}

impl NumberLocale {
    fn separators(self) -> (char, char) {
        match self {
            NumberLocale::Italian => (',', '.'),
            NumberLocale::English => ('.', ','),
        }
    }
}

/// Display settings shared by every domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    /// Separator style
    pub locale: NumberLocale,
    /// Decimals for rows that do not fix their own precision
    pub decimals: u8,
}

impl Default for FormatSettings {
    fn default() -> Self {
        FormatSettings {
            locale: NumberLocale::Italian,
            decimals: 2,
        }
    }
}

impl FormatSettings {
    /// Decimals clamped to the supported range
    pub fn decimals(&self) -> u8 {
        self.decimals.min(MAX_DECIMALS)
    }
}

/// Round, then render with locale separators and thousands grouping.
pub fn format_number(value: f64, decimals: u8, locale: NumberLocale) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let rounded = round(value, decimals);
    if !rounded.is_finite() {
        return "-".to_string();
    }

    let text = format!("{:.*}", usize::from(decimals), rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let (decimal_sep, group_sep) = locale.separators();
    let mut grouped = String::with_capacity(text.len() + text.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(group_sep);
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    // No "-0,00" for values that round to zero.
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(decimal_sep);
        out.push_str(frac);
    }
    out
}

/// One labelled line of a calculation summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

/// Build a display row, appending `unit_suffix` when non-empty.
pub fn format_row(
    label: impl Into<String>,
    value: f64,
    unit_suffix: &str,
    decimals: u8,
    locale: NumberLocale,
) -> SummaryRow {
    let number = format_number(value, decimals, locale);
    let value = if unit_suffix.is_empty() {
        number
    } else {
        format!("{} {}", number, unit_suffix)
    };
    SummaryRow {
        label: label.into(),
        value,
    }
}

/// Build a row whose value is free text (e.g. a selected section name).
pub fn text_row(label: impl Into<String>, value: impl Into<String>) -> SummaryRow {
    SummaryRow {
        label: label.into(),
        value: value.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round(0.5, 0), 1.0);
        assert_eq!(round(-0.5, 0), -1.0);
        assert_eq!(round(1.25, 1), 1.3);
        assert_eq!(round(20.115_33, 4), 20.1153);
        assert_eq!(round(7.0, 6), 7.0);
    }

    #[test]
    fn test_format_grouping() {
        assert_eq!(format_number(0.0, 2, NumberLocale::Italian), "0,00");
        assert_eq!(format_number(999.0, 0, NumberLocale::Italian), "999");
        assert_eq!(format_number(1000.0, 0, NumberLocale::Italian), "1.000");
        assert_eq!(format_number(-15000.5, 1, NumberLocale::Italian), "-15.000,5");
        assert_eq!(format_number(100000.0, 0, NumberLocale::English), "100,000");
    }

    #[test]
    fn test_format_negative_zero() {
        assert_eq!(format_number(-0.001, 2, NumberLocale::Italian), "0,00");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_number(f64::NAN, 2, NumberLocale::Italian), "-");
    }

    #[test]
    fn test_format_row_suffix() {
        let row = format_row("ROI", 20.0, "%", 2, NumberLocale::Italian);
        assert_eq!(row.label, "ROI");
        assert_eq!(row.value, "20,00 %");

        let bare = format_row("Fattore", 0.85, "", 2, NumberLocale::English);
        assert_eq!(bare.value, "0.85");
    }

    #[test]
    fn test_settings_clamp_decimals() {
        let settings = FormatSettings {
            locale: NumberLocale::English,
            decimals: 12,
        };
        assert_eq!(settings.decimals(), MAX_DECIMALS);
    }
}
