//! Epoch classification.
//!
//! [`EpochWindow`] is the single place that decides which epoch is current,
//! future or previous. Nothing else recomputes `current + 1` or filters
//! historical epochs on its own.

use ballot_types::{Epoch, ProposalRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three temporal partitions a proposal can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Current,
    Future,
    Previous,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Future => "future",
            Self::Previous => "previous",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Partition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "future" => Ok(Self::Future),
            "previous" | "prev" => Ok(Self::Previous),
            other => Err(format!("unknown partition `{other}`")),
        }
    }
}

/// Current epoch plus the historical epochs observed in proposal data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochWindow {
    current: Epoch,
    previous: Vec<Epoch>,
}

impl EpochWindow {
    /// Classify `historical` relative to `current`.
    ///
    /// Previous epochs are the distinct epochs before `current`, in
    /// first-seen order. Anything at or after `current` is not historical.
    pub fn classify<I>(current: Epoch, historical: I) -> Self
    where
        I: IntoIterator<Item = Epoch>,
    {
        let mut previous: Vec<Epoch> = Vec::new();
        for epoch in historical {
            if epoch < current && !previous.contains(&epoch) {
                previous.push(epoch);
            }
        }
        Self { current, previous }
    }

    /// Classify using the epochs of the contract's proposal enumeration.
    pub fn from_records(current: Epoch, records: &[ProposalRecord]) -> Self {
        Self::classify(current, records.iter().map(|r| r.epoch))
    }

    pub fn current(&self) -> Epoch {
        self.current
    }

    pub fn future(&self) -> Epoch {
        self.current.next()
    }

    /// Historical epochs in on-chain enumeration order.
    pub fn previous(&self) -> &[Epoch] {
        &self.previous
    }

    /// The previous epoch a history view opens on when none is selected.
    pub fn default_previous(&self) -> Option<Epoch> {
        self.previous.first().copied()
    }

    pub fn partition_of(&self, epoch: Epoch) -> Option<Partition> {
        if epoch == self.current {
            Some(Partition::Current)
        } else if epoch == self.future() {
            Some(Partition::Future)
        } else if self.previous.contains(&epoch) {
            Some(Partition::Previous)
        } else {
            None
        }
    }
}
