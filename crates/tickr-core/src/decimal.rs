//! Precision-safe decimal price type.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Providers send prices
//! as decimal text ("0.00001200"), so parsing never goes through `f64`.

use crate::error::{CoreError, Result};
use crate::types::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Price with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Whether the absolute value is below one currency unit.
    ///
    /// Sub-unit prices are displayed with extra fractional digits.
    #[inline]
    pub fn is_sub_unit(&self) -> bool {
        self.0.abs() < Decimal::ONE
    }

    /// Parse a provider-supplied decimal text field.
    ///
    /// Empty, non-numeric and negative values are rejected; nothing is
    /// coerced to zero.
    pub fn parse_text(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidPrice("empty price text".to_string()));
        }

        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| CoreError::InvalidPrice(format!("not a decimal: {trimmed:?}")))?;

        let price = Self(value.normalize());
        if price.is_negative() {
            return Err(CoreError::InvalidPrice(format!("negative price: {trimmed}")));
        }
        Ok(price)
    }

    /// Classify `self` as a new price relative to `prior`.
    #[inline]
    pub fn direction_from(&self, prior: Price) -> Direction {
        match self.0.cmp(&prior.0) {
            Ordering::Greater => Direction::Up,
            Ordering::Less => Direction::Down,
            Ordering::Equal => Direction::Unchanged,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_text(s)
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_text_keeps_precision() {
        let price = Price::parse_text("0.00001200").unwrap();
        assert_eq!(price.inner(), dec!(0.000012));
    }

    #[test]
    fn test_parse_text_trims_whitespace() {
        let price = Price::parse_text(" 60000.00 ").unwrap();
        assert_eq!(price, Price::new(dec!(60000)));
    }

    #[test]
    fn test_parse_text_rejects_garbage() {
        assert!(Price::parse_text("").is_err());
        assert!(Price::parse_text("abc").is_err());
        assert!(Price::parse_text("12.3.4").is_err());
    }

    #[test]
    fn test_parse_text_rejects_negative() {
        assert!(matches!(
            Price::parse_text("-1.5"),
            Err(CoreError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_parse_text_accepts_scientific() {
        let price = Price::parse_text("1.2e-5").unwrap();
        assert_eq!(price.inner(), dec!(0.000012));
    }

    #[test]
    fn test_direction_from() {
        let prior = Price::new(dec!(100));
        assert_eq!(Price::new(dec!(101)).direction_from(prior), Direction::Up);
        assert_eq!(Price::new(dec!(99.99)).direction_from(prior), Direction::Down);
        // 100.00 and 100 are numerically equal.
        assert_eq!(
            Price::new(dec!(100.00)).direction_from(prior),
            Direction::Unchanged
        );
    }

    #[test]
    fn test_is_sub_unit() {
        assert!(Price::new(dec!(0.5)).is_sub_unit());
        assert!(!Price::ONE.is_sub_unit());
        assert!(!Price::new(dec!(1234.5)).is_sub_unit());
    }
}
