//! Human-readable order identifiers.
//!
//! An order identifier is the 4-digit calendar year concatenated with a
//! 3-digit zero-padded serial, e.g. `2025001`. The serial restarts at 1 for
//! the first order of each year and increments from there.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderIdError {
    /// The input is not a decimal number.
    #[error("order id must be numeric")]
    NotNumeric,
    /// The decoded year is not a plausible 4-digit year.
    #[error("order id year out of range: {0}")]
    YearOutOfRange(i64),
}

/// A year-scoped order identifier.
///
/// Displays as `{year}{serial:03}` and decodes by splitting the numeric value
/// at the thousands boundary, so `2025014` is year 2025, serial 14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId {
    year: i32,
    serial: u32,
}

impl OrderId {
    /// Create an order identifier from a year and serial.
    #[must_use]
    pub const fn new(year: i32, serial: u32) -> Self {
        Self { year, serial }
    }

    /// The calendar year component.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The per-year serial component.
    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.year, self.serial)
    }
}

impl FromStr for OrderId {
    type Err = OrderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.parse().map_err(|_| OrderIdError::NotNumeric)?;
        let year = value / 1000;
        let serial = value % 1000;
        if !(1000..=9999).contains(&year) {
            return Err(OrderIdError::YearOutOfRange(year));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self::new(year as i32, serial as u32))
    }
}

impl TryFrom<String> for OrderId {
    type Error = OrderIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zero_pads_serial() {
        assert_eq!(OrderId::new(2025, 1).to_string(), "2025001");
        assert_eq!(OrderId::new(2025, 42).to_string(), "2025042");
        assert_eq!(OrderId::new(2025, 999).to_string(), "2025999");
    }

    #[test]
    fn test_parse_splits_at_thousands() {
        let id: OrderId = "2025014".parse().expect("valid id");
        assert_eq!(id.year(), 2025);
        assert_eq!(id.serial(), 14);
    }

    #[test]
    fn test_roundtrip() {
        let id = OrderId::new(2026, 7);
        let parsed: OrderId = id.to_string().parse().expect("roundtrip");
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!("abc".parse::<OrderId>(), Err(OrderIdError::NotNumeric));
        assert!(matches!(
            "001".parse::<OrderId>(),
            Err(OrderIdError::YearOutOfRange(_))
        ));
    }
}
