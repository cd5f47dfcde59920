//! The normalized, per-proposal view model.

use ballot_types::{Amount, Epoch, ProposalData, ProposalId, ProposalStats, QuorumRule, Vote};
use serde::Serialize;

use crate::epoch::Partition;

/// Stake-weighted tally. `total == no + yes` always holds; a pair whose sum
/// overflows has no tally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub no: Amount,
    pub yes: Amount,
    pub total: Amount,
}

impl Tally {
    pub fn new(no: Amount, yes: Amount) -> Option<Self> {
        Some(Self {
            no,
            yes,
            total: no.checked_add(yes)?,
        })
    }

    /// Build from the contract's `variants = [no, yes]`. Missing entries read
    /// as zero and the reported total is recomputed.
    pub fn from_stats(stats: &ProposalStats) -> Option<Self> {
        let variant = |i: usize| Amount::new(stats.variants.get(i).copied().unwrap_or(0));
        Self::new(variant(0), variant(1))
    }

    /// Share of the tally voting yes, 0-100. Zero when nobody voted.
    pub fn yes_percent(&self) -> f64 {
        percent(self.yes, self.total)
    }

    /// Share of the tally voting no, 0-100. Zero when nobody voted.
    pub fn no_percent(&self) -> f64 {
        percent(self.no, self.total)
    }
}

fn percent(part: Amount, total: Amount) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    part.raw() as f64 / total.raw() as f64 * 100.0
}

/// A vote the caller cast in a past epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PrevVote {
    pub vote: Vote,
    pub epoch: Epoch,
}

/// How the presentation layer should describe the caller's historical vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrevVoteStatus {
    /// A yes or no was recorded.
    Voted(Vote),
    /// The epoch finished and the caller never voted.
    NotVoted,
    /// No historical vote record was available.
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub epoch: Epoch,
    pub partition: Partition,
    /// Position in the current epoch's vote vector. Current proposals only.
    pub slot: Option<usize>,
    pub data: ProposalData,
    /// Absent when the contract did not report a tally.
    pub tally: Option<Tally>,
    pub quorum: Option<QuorumRule>,
    /// `None` without both a quorum rule and a tally.
    pub quorum_passed: Option<bool>,
    /// `None` when the caller's vote is unknown.
    pub voted: Option<Vote>,
    pub prev_voted: Option<PrevVote>,
    /// Contract-reported outcome for finished epochs, taken as-is.
    pub is_passed: Option<bool>,
    /// A submitted vote on this proposal is still being confirmed.
    pub vote_in_progress: bool,
}

impl Proposal {
    /// Unknown or explicitly unvoted.
    pub fn is_awaiting_vote(&self) -> bool {
        matches!(self.voted, None | Some(Vote::Unvoted))
    }

    pub fn has_voted(&self) -> bool {
        matches!(self.voted, Some(vote) if vote.is_cast())
    }

    /// Ordering key for the current-epoch list: the raw vote value, with an
    /// unknown vote ranked like an explicit "not voted".
    pub fn vote_sort_key(&self) -> u8 {
        self.voted.unwrap_or(Vote::Unvoted).raw()
    }

    pub fn prev_vote_status(&self) -> PrevVoteStatus {
        match self.prev_voted {
            Some(PrevVote { vote, .. }) if vote.is_cast() => PrevVoteStatus::Voted(vote),
            Some(_) => PrevVoteStatus::NotVoted,
            None => PrevVoteStatus::Unknown,
        }
    }

    pub fn yes_percent(&self) -> Option<f64> {
        self.tally.map(|t| t.yes_percent())
    }

    pub fn no_percent(&self) -> Option<f64> {
        self.tally.map(|t| t.no_percent())
    }
}
