//! Partitioned, filtered and ordered proposal collections.

use ballot_types::Epoch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::epoch::{EpochWindow, Partition};
use crate::proposal::Proposal;

/// Filter on the caller's vote status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteFilter {
    #[default]
    All,
    AwaitingVote,
    Voted,
}

impl VoteFilter {
    pub fn matches(&self, proposal: &Proposal) -> bool {
        match self {
            Self::All => true,
            Self::AwaitingVote => proposal.is_awaiting_vote(),
            Self::Voted => proposal.has_voted(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::AwaitingVote => "awaiting",
            Self::Voted => "voted",
        }
    }
}

impl fmt::Display for VoteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "awaiting" | "awaiting_vote" => Ok(Self::AwaitingVote),
            "voted" => Ok(Self::Voted),
            other => Err(format!("unknown vote filter `{other}`")),
        }
    }
}

/// The proposals of one epoch after filtering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProposalGroup {
    pub epoch: Epoch,
    pub items: Vec<Proposal>,
    /// Number of proposals in the epoch before filtering.
    pub total: usize,
}

impl ProposalGroup {
    fn collect<'a>(
        epoch: Epoch,
        proposals: impl Iterator<Item = &'a Proposal>,
        filter: VoteFilter,
    ) -> Self {
        let mut total = 0;
        let items = proposals
            .filter(|p| p.epoch == epoch)
            .inspect(|_| total += 1)
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Self {
            epoch,
            items,
            total,
        }
    }

    /// The epoch has no proposals at all.
    pub fn is_empty_epoch(&self) -> bool {
        self.total == 0
    }

    /// The epoch has proposals, but none pass the filter.
    pub fn is_filtered_empty(&self) -> bool {
        self.total > 0 && self.items.is_empty()
    }
}

/// Proposals split into current, future and previous epochs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProposalSet {
    pub current: ProposalGroup,
    pub future: ProposalGroup,
    /// One group per shown previous epoch, in enumeration order.
    pub previous: Vec<ProposalGroup>,
    /// The previous epoch the history view is focused on.
    pub active_epoch: Option<Epoch>,
}

impl ProposalSet {
    /// Partition, filter and order normalized proposals.
    ///
    /// `epoch_filter` narrows the previous-epoch groups to that single epoch.
    pub fn build(
        proposals: &[Proposal],
        window: &EpochWindow,
        filter: VoteFilter,
        epoch_filter: Option<Epoch>,
    ) -> Self {
        let in_partition = |partition: Partition| {
            proposals.iter().filter(move |p| p.partition == partition)
        };

        let mut current = ProposalGroup::collect(
            window.current(),
            in_partition(Partition::Current),
            filter,
        );
        // Unvoted first; ties are left in whatever order the sort produces.
        current
            .items
            .sort_unstable_by(|a, b| b.vote_sort_key().cmp(&a.vote_sort_key()));

        let future =
            ProposalGroup::collect(window.future(), in_partition(Partition::Future), filter);

        let previous = window
            .previous()
            .iter()
            .copied()
            .filter(|epoch| epoch_filter.map_or(true, |wanted| wanted == *epoch))
            .map(|epoch| ProposalGroup::collect(epoch, in_partition(Partition::Previous), filter))
            .collect();

        Self {
            current,
            future,
            previous,
            active_epoch: epoch_filter.or_else(|| window.default_previous()),
        }
    }

    /// The groups shown for a partition.
    pub fn groups(&self, partition: Partition) -> &[ProposalGroup] {
        match partition {
            Partition::Current => std::slice::from_ref(&self.current),
            Partition::Future => std::slice::from_ref(&self.future),
            Partition::Previous => &self.previous,
        }
    }
}
