//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is zero or negative.
    #[error("price must be positive (got {0})")]
    NotPositive(Decimal),
}

/// A strictly positive monetary amount.
///
/// Used for a printer's hourly rate and an order's total. Amounts are kept in
/// the marketplace's single currency; there is no currency code.
///
/// ```
/// use printshare_core::Price;
/// use rust_decimal::Decimal;
///
/// assert!(Price::new(Decimal::new(1550, 2)).is_ok()); // 15.50
/// assert!(Price::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting zero and negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if `amount <= 0`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole-unit amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if `units <= 0`.
    pub fn from_units(units: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::from(units))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
