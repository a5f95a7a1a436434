//! Money amounts in Indian rupees.
//!
//! Prices are captured as decimal rupee amounts when an item enters the cart
//! and never re-read from the catalog afterwards. The payment gateway deals in
//! minor units (paise), so [`Rupees::to_paise`] converts for gateway calls.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Paise per rupee.
const PAISE_PER_RUPEE: i64 = 100;

/// A rupee amount with decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Rupees(Decimal);

impl Rupees {
    /// Create an amount from a decimal rupee value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Zero rupees.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The underlying decimal rupee amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a unit count (line totals).
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Convert to paise, rounding to the nearest whole paisa.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn to_paise(&self) -> Option<i64> {
        (self.0 * Decimal::from(PAISE_PER_RUPEE)).round().to_i64()
    }
}

impl From<i64> for Rupees {
    fn from(whole_rupees: i64) -> Self {
        Self(Decimal::from(whole_rupees))
    }
}

impl Add for Rupees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl std::fmt::Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_paise() {
        assert_eq!(Rupees::from(250).to_paise(), Some(25_000));
        assert_eq!(Rupees::new(Decimal::new(4999, 2)).to_paise(), Some(4_999));
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Rupees::from(250);
        let line = unit.times(2);
        assert_eq!(line.to_paise(), Some(50_000));

        let total: Rupees = [unit, line].into_iter().sum();
        assert_eq!(total.to_paise(), Some(75_000));
    }

    #[test]
    fn test_sub_rupee_amount_rounds() {
        // 0.404 rupees rounds to 40 paise
        let amount = Rupees::new(Decimal::new(404, 3));
        assert_eq!(amount.to_paise(), Some(40));
    }

    #[test]
    fn test_display() {
        assert_eq!(Rupees::from(250).to_string(), "₹250.00");
    }
}
