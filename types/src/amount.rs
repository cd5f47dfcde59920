//! Stake amounts.
//!
//! Amounts are represented as integer minor units (u64) to avoid floating-point
//! errors. Conversion to whole tokens only happens at the presentation edge.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minor units in one whole token.
pub const MINOR_UNITS_PER_TOKEN: u64 = 1_000_000;

/// A stake amount in minor units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Convert a whole-token value (possibly fractional) to minor units.
    ///
    /// Negative and non-finite inputs clamp to zero.
    pub fn from_tokens(tokens: f64) -> Self {
        if !tokens.is_finite() || tokens <= 0.0 {
            return Self::ZERO;
        }
        Self((tokens * MINOR_UNITS_PER_TOKEN as f64).round() as u64)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Whole-token value, for display only.
    pub fn as_tokens(&self) -> f64 {
        self.0 as f64 / MINOR_UNITS_PER_TOKEN as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl From<u64> for Amount {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
