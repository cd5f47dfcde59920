//! A single ballot value.
//!
//! On the wire a vote is a `u8`: `0` = no, `1` = yes, `255` = not voted.
//! Everything above the wire works with [`Vote`] instead of the raw byte.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Raw sentinel the contract uses for "no vote cast".
pub const UNVOTED_RAW: u8 = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vote {
    No,
    Yes,
    Unvoted,
}

impl Vote {
    /// Decode a raw contract value. `None` for values outside `{0, 1, 255}`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::No),
            1 => Some(Self::Yes),
            UNVOTED_RAW => Some(Self::Unvoted),
            _ => None,
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            Self::No => 0,
            Self::Yes => 1,
            Self::Unvoted => UNVOTED_RAW,
        }
    }

    /// Whether this is an actual yes/no decision.
    pub fn is_cast(&self) -> bool {
        !matches!(self, Self::Unvoted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
            Self::Unvoted => "unvoted",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Vote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.raw())
    }
}

impl<'de> Deserialize<'de> for Vote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Vote::from_raw(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid vote value {raw}")))
    }
}
