//! # Return on Investment
//!
//! Net profit, ROI and payback period for an investment over a timeframe
//! expressed in months. Monetary values are unitless (any one currency).
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::calculations::roi::{calculate, RoiInput};
//!
//! let input = RoiInput {
//!     investment: 10_000.0,
//!     revenue: 15_000.0,
//!     costs: 3_000.0,
//!     timeframe_months: 12.0,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.net_profit, 2_000.0);
//! assert_eq!(result.roi_percentage, 20.0);
//! assert_eq!(result.payback_period_months, 10.0);
//! ```

use serde::{Deserialize, Serialize};

use super::{Calculator, Domain};
use crate::errors::CalcResult;
use crate::format::{format_row, FormatSettings, SummaryRow};
use crate::parse::RawInputs;
use crate::warnings::WarningRule;

/// Inputs for the ROI calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiInput {
    /// Up-front investment
    pub investment: f64,
    /// Total revenue over the timeframe
    pub revenue: f64,
    /// Running costs over the timeframe
    pub costs: f64,
    /// Timeframe in months
    pub timeframe_months: f64,
}

impl Default for RoiInput {
    fn default() -> Self {
        RoiInput {
            investment: 10_000.0,
            revenue: 15_000.0,
            costs: 3_000.0,
            timeframe_months: 12.0,
        }
    }
}

impl RoiInput {
    /// Build from form fields `investment`, `revenue`, `costs`, `timeframe`.
    pub fn from_raw(raw: &RawInputs) -> Self {
        let d = RoiInput::default();
        RoiInput {
            investment: raw.number("investment", d.investment),
            revenue: raw.number("revenue", d.revenue),
            costs: raw.number("costs", d.costs),
            timeframe_months: raw.number("timeframe", d.timeframe_months),
        }
    }
}

/// ROI figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    /// revenue − costs − investment
    pub net_profit: f64,
    /// net_profit / investment
    pub roi: f64,
    /// roi × 100
    pub roi_percentage: f64,
    /// ROI scaled to a 12-month period
    pub annualized_roi_percentage: f64,
    /// (revenue − costs) / timeframe
    pub monthly_net_cash_flow: f64,
    /// Months to recover the investment; 0 when it is never recovered
    pub payback_period_months: f64,
    /// Timeframe the figures refer to
    pub timeframe_months: f64,
}

impl RoiResult {
    /// True when the monthly cash flow can repay the investment
    pub fn pays_back(&self) -> bool {
        self.payback_period_months > 0.0
    }
}

/// Compute ROI figures; `None` for a non-positive investment or timeframe.
pub fn calculate(input: &RoiInput) -> Option<RoiResult> {
    if input.investment <= 0.0 || input.timeframe_months <= 0.0 {
        return None;
    }

    let net_profit = input.revenue - input.costs - input.investment;
    let roi = net_profit / input.investment;
    let roi_percentage = roi * 100.0;
    let annualized_roi_percentage = roi_percentage * 12.0 / input.timeframe_months;

    let monthly_net_cash_flow = (input.revenue - input.costs) / input.timeframe_months;
    let payback_period_months = if monthly_net_cash_flow > 0.0 {
        input.investment / monthly_net_cash_flow
    } else {
        0.0
    };

    Some(RoiResult {
        net_profit,
        roi,
        roi_percentage,
        annualized_roi_percentage,
        monthly_net_cash_flow,
        payback_period_months,
        timeframe_months: input.timeframe_months,
    })
}

/// Advisory rules, in output order
pub const RULES: &[WarningRule<RoiResult>] = &[
    WarningRule::new(
        |r: &RoiResult| r.roi < 0.0,
        |r: &RoiResult| {
            format!(
                "ROI negativo ({:.1}%): l'investimento non viene recuperato nel periodo considerato.",
                r.roi_percentage
            )
        },
    ),
    WarningRule::new(
        |r: &RoiResult| !r.pays_back(),
        |_: &RoiResult| {
            "Il flusso di cassa mensile non è positivo: il periodo di recupero non è raggiungibile."
                .to_string()
        },
    ),
    WarningRule::new(
        |r: &RoiResult| r.pays_back() && r.payback_period_months > r.timeframe_months,
        |r: &RoiResult| {
            format!(
                "Il periodo di recupero ({:.1} mesi) supera l'orizzonte di {:.0} mesi.",
                r.payback_period_months, r.timeframe_months
            )
        },
    ),
];

/// Pipeline adapter for [`Domain::Roi`]
pub struct RoiCalculator;

impl Calculator for RoiCalculator {
    const DOMAIN: Domain = Domain::Roi;
    type Input = RoiInput;
    type Output = RoiResult;

    fn normalize(raw: &RawInputs) -> CalcResult<RoiInput> {
        Ok(RoiInput::from_raw(raw))
    }

    fn evaluate(input: &RoiInput) -> Option<RoiResult> {
        calculate(input)
    }

    fn rules() -> &'static [WarningRule<RoiResult>] {
        RULES
    }

    fn summary(r: &RoiResult, format: &FormatSettings) -> Vec<SummaryRow> {
        let d = format.decimals();
        let l = format.locale;
        vec![
            format_row("Profitto netto", r.net_profit, "", d, l),
            format_row("ROI", r.roi_percentage, "%", d, l),
            format_row("ROI annualizzato", r.annualized_roi_percentage, "%", d, l),
            format_row("Flusso di cassa mensile", r.monthly_net_cash_flow, "", d, l),
            format_row("Periodo di recupero", r.payback_period_months, "mesi", 1, l),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::generate_warnings;

    #[test]
    fn test_default_scenario() {
        let result = calculate(&RoiInput::default()).unwrap();
        assert_eq!(result.net_profit, 2_000.0);
        assert_eq!(result.roi, 0.2);
        assert_eq!(result.roi_percentage, 20.0);
        assert_eq!(result.payback_period_months, 10.0);
        assert_eq!(result.annualized_roi_percentage, 20.0);
        assert!(generate_warnings(RULES, &result).is_empty());
    }

    #[test]
    fn test_rejects_non_positive_investment() {
        let input = RoiInput {
            investment: 0.0,
            ..RoiInput::default()
        };
        assert!(calculate(&input).is_none());

        let input = RoiInput {
            timeframe_months: -1.0,
            ..RoiInput::default()
        };
        assert!(calculate(&input).is_none());
    }

    #[test]
    fn test_loss_making_investment() {
        let input = RoiInput {
            investment: 10_000.0,
            revenue: 2_000.0,
            costs: 3_000.0,
            timeframe_months: 12.0,
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.payback_period_months, 0.0);
        let warnings = generate_warnings(RULES, &result);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("ROI negativo"));
        assert!(warnings[1].contains("non è raggiungibile"));
    }

    #[test]
    fn test_slow_payback() {
        let input = RoiInput {
            investment: 20_000.0,
            revenue: 15_000.0,
            costs: 3_000.0,
            timeframe_months: 12.0,
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.payback_period_months, 20.0);
        let warnings = generate_warnings(RULES, &result);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[1].contains("(20.0 mesi)"));
    }

    #[test]
    fn test_from_raw_decimal_comma() {
        let raw = RawInputs::new()
            .with("investment", "12.500,")
            .with("revenue", "20000,5");
        let input = RoiInput::from_raw(&raw);
        // "12.500," -> "12.500." is not a number: falls back
        assert_eq!(input.investment, 10_000.0);
        assert_eq!(input.revenue, 20_000.5);
    }
}
