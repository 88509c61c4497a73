//! # Amount Module
//!
//! Strictly positive decimal wrapper for posted amounts.
//!
//! Every journal entry moves a positive amount; the sign of a balance change
//! comes from the leg (debit or credit), never from the amount itself.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A strictly positive amount of money.
///
/// # Invariant
/// The inner value is always > 0. Enforced by the constructor and by
/// deserialization.
///
/// # Example
/// ```
/// use premia_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount = Amount::new(Decimal::new(10050, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(10050, 2));
///
/// assert!(Amount::new(Decimal::ZERO).is_err());
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create a new Amount, rejecting zero and negative values.
    pub fn new(value: Decimal) -> CoreResult<Self> {
        if value <= Decimal::ZERO {
            Err(CoreError::InvalidAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// The amount as a balance delta for a debit leg
    #[inline]
    pub fn as_debit(&self) -> Decimal {
        -self.0
    }

    /// The amount as a balance delta for a credit leg
    #[inline]
    pub fn as_credit(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
