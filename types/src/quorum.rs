//! Quorum rules a proposal's yes-tally must meet.

use crate::Amount;
use serde::{Deserialize, Serialize};

/// Threshold a proposal's yes-tally must reach.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum QuorumRule {
    /// Absolute stake threshold, stored in minor units.
    Absolute(Amount),
    /// Percentage (0-100, may be fractional) of the network's active stake.
    Percent(f64),
}

impl QuorumRule {
    /// Whether `yes` satisfies this rule given the network's active stake.
    ///
    /// A zero active stake never satisfies a percentage rule.
    pub fn is_met(&self, yes: Amount, total_active: Amount) -> bool {
        match *self {
            Self::Absolute(threshold) => yes >= threshold,
            Self::Percent(threshold) => {
                if total_active.is_zero() {
                    return false;
                }
                (yes.raw() as f64 / total_active.raw() as f64) * 100.0 >= threshold
            }
        }
    }
}
