//! Raw record shapes returned by the voting contract.
//!
//! These mirror what the contract emits and are deserialized as-is. Nothing in
//! here interprets the data; see `ballot-governance` for normalization.

use crate::{Amount, Epoch, ProposalId, QuorumRule};
use serde::{Deserialize, Serialize};

/// Global contract parameters (`view_params`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewParams {
    pub current: CurrentEpoch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentEpoch {
    #[serde(rename = "iEpoch")]
    pub epoch: Epoch,
}

impl ViewParams {
    pub fn new(current: Epoch) -> Self {
        Self {
            current: CurrentEpoch { epoch: current },
        }
    }

    pub fn current_epoch(&self) -> Epoch {
        self.current.epoch
    }
}

/// Network-wide stake totals (`view_totals`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default)]
    pub stake_active: Amount,
    #[serde(default)]
    pub stake_passive: Amount,
}

/// The caller's own stake and current-epoch vote vector (user `view`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    #[serde(default)]
    pub stake_active: Amount,
    #[serde(default)]
    pub stake_passive: Amount,
    /// One raw vote per current-epoch proposal slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_votes: Option<Vec<u8>>,
}

/// Quorum as written into proposal metadata by its author.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum QuorumSpec {
    /// Absolute threshold in whole tokens.
    #[serde(rename = "beamx")]
    Tokens(f64),
    /// Percentage of active stake.
    #[serde(rename = "percent")]
    Percent(f64),
}

impl QuorumSpec {
    pub fn rule(&self) -> QuorumRule {
        match *self {
            Self::Tokens(tokens) => QuorumRule::Absolute(Amount::from_tokens(tokens)),
            Self::Percent(percent) => QuorumRule::Percent(percent),
        }
    }
}

/// Author-supplied proposal metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ref_link: String,
    #[serde(default)]
    pub forum_link: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum: Option<QuorumSpec>,
}

/// Aggregated tally as reported by the contract: `variants = [no, yes]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalStats {
    #[serde(default)]
    pub variants: Vec<u64>,
    #[serde(default)]
    pub total: u64,
}

/// A vote the caller cast in a past epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrevVoted {
    pub value: u8,
    pub epoch: Epoch,
}

/// One entry of the caller's historical vote list (user `view_votes`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalVote {
    pub id: ProposalId,
    pub value: u8,
    pub epoch: Epoch,
}

impl HistoricalVote {
    pub fn prev_voted(&self) -> PrevVoted {
        PrevVoted {
            value: self.value,
            epoch: self.epoch,
        }
    }
}

/// A proposal exactly as enumerated by the contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub epoch: Epoch,
    #[serde(default)]
    pub data: ProposalData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProposalStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voted: Option<u8>,
    #[serde(
        default,
        rename = "prevVoted",
        skip_serializing_if = "Option::is_none"
    )]
    pub prev_voted: Option<PrevVoted>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_passed: Option<bool>,
}

impl ProposalRecord {
    /// A bare record with empty metadata and no tally.
    pub fn new(id: ProposalId, epoch: Epoch) -> Self {
        Self {
            id,
            epoch,
            data: ProposalData::default(),
            stats: None,
            voted: None,
            prev_voted: None,
            is_passed: None,
        }
    }
}
