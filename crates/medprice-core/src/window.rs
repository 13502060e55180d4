//! Sanity window for price candidates.
//!
//! Broad text scans pick up numbers that are not prices (phone numbers,
//! discount percentages, ratings). Candidates outside the window are
//! discarded by the extractor before they can become a [`crate::PriceResult`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceWindow {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceWindow {
    /// Builds a window, rejecting non-positive or inverted bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when `min <= 0` or `min > max`.
    pub fn new(min: Decimal, max: Decimal) -> Result<Self, ConfigError> {
        if min <= Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "price window minimum must be positive, got {min}"
            )));
        }
        if min > max {
            return Err(ConfigError::Validation(format!(
                "price window minimum {min} exceeds maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Inclusive on both ends.
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceWindow {
    fn default() -> Self {
        Self {
            min: Decimal::ONE,
            max: Decimal::from(10_000),
        }
    }
}
