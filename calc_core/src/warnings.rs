//! # Advisory Warnings
//!
//! Each domain declares an ordered slice of [`WarningRule`]s over its derived
//! quantities. Every rule is evaluated, in slice order, and every rule that
//! fires contributes one message. The slice order is the output order.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::warnings::{generate_warnings, WarningRule};
//!
//! struct Check {
//!     utilization: f64,
//! }
//!
//! const RULES: &[WarningRule<Check>] = &[
//!     WarningRule::new(
//!         |c: &Check| c.utilization > 100.0,
//!         |c: &Check| format!("Utilization {:.0}% exceeds capacity", c.utilization),
//!     ),
//!     WarningRule::new(|c: &Check| c.utilization > 90.0, |_: &Check| "Little reserve left".to_string()),
//! ];
//!
//! let warnings = generate_warnings(RULES, &Check { utilization: 120.0 });
//! assert_eq!(warnings.len(), 2);
//! assert!(warnings[0].starts_with("Utilization 120%"));
//! ```

use log::warn;

/// A predicate over derived quantities paired with the message it produces.
pub struct WarningRule<Q> {
    predicate: fn(&Q) -> bool,
    message: fn(&Q) -> String,
}

impl<Q> WarningRule<Q> {
    /// Create a rule
    pub const fn new(predicate: fn(&Q) -> bool, message: fn(&Q) -> String) -> Self {
        WarningRule { predicate, message }
    }

    /// Message for `quantities`, if the rule fires
    pub fn check(&self, quantities: &Q) -> Option<String> {
        if (self.predicate)(quantities) {
            Some((self.message)(quantities))
        } else {
            None
        }
    }
}

/// Evaluate all rules in order; no short-circuit.
pub fn generate_warnings<Q>(rules: &[WarningRule<Q>], quantities: &Q) -> Vec<String> {
    let warnings: Vec<String> = rules.iter().filter_map(|rule| rule.check(quantities)).collect();
    for message in &warnings {
        warn!("{}", message);
    }
    warnings
}
