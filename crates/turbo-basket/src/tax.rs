//! Tax value object.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A tax percentage with its precomputed add/deduct modifiers.
///
/// Negative percentages are allowed and act as a discount. A `Tax` is
/// never mutated; changing an item's tax builds a new one.
///
/// On the wire a `Tax` is just its percentage.
///
/// ```
/// use turbo_basket::Tax;
///
/// let vat = Tax::new(25.0);
/// assert_eq!(vat.add(100.0), 125.0);
/// assert_eq!(vat.deduct(100.0), 75.0);
/// assert_eq!(vat.rate(100.0), 25.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Tax {
    percentage: f64,
    deduct_modifier: f64,
    add_modifier: f64,
}

impl Tax {
    /// Tax from a percentage, e.g. `20.0` for 20%.
    pub fn new(percentage: f64) -> Self {
        Self {
            percentage,
            deduct_modifier: 1.0 - percentage / 100.0,
            add_modifier: 1.0 + percentage / 100.0,
        }
    }

    /// Infer the percentage from a price before and after tax.
    ///
    /// A zero `before` price carries no rate information; the result is a
    /// zero rate rather than a division by zero.
    pub fn from_prices(before: f64, after: f64) -> Self {
        if before == 0.0 {
            warn!(after, "cannot infer tax rate from a zero base price, using 0%");
            return Self::zero();
        }
        Self::new((after - before) / before * 100.0)
    }

    /// No tax.
    pub fn zero() -> Self {
        Self::new(0.0)
    }

    /// The percentage this tax was built from.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// `1 - percentage / 100`.
    pub fn deduct_modifier(&self) -> f64 {
        self.deduct_modifier
    }

    /// `1 + percentage / 100`.
    pub fn add_modifier(&self) -> f64 {
        self.add_modifier
    }

    /// Add tax to a price.
    pub fn add(&self, price: f64) -> f64 {
        price * self.add_modifier
    }

    /// Deduct tax from a price.
    pub fn deduct(&self, price: f64) -> f64 {
        price * self.deduct_modifier
    }

    /// The tax portion of `price`: `price - deduct(price)`.
    pub fn rate(&self, price: f64) -> f64 {
        price - self.deduct(price)
    }
}

impl Default for Tax {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<f64> for Tax {
    fn from(percentage: f64) -> Self {
        Self::new(percentage)
    }
}

impl From<Tax> for f64 {
    fn from(tax: Tax) -> Self {
        tax.percentage
    }
}
