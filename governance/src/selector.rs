//! Read-only queries over one published snapshot.
//!
//! A [`Snapshot`] is immutable once built. Filtered proposal sets are computed
//! on first request and memoized inside the snapshot, so they are dropped
//! together with it when the next refresh replaces it.

use ballot_types::{Epoch, ProposalId, Totals, UserView, ViewParams};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use crate::epoch::{EpochWindow, Partition};
use crate::error::GovernanceError;
use crate::proposal::Proposal;
use crate::set::{ProposalSet, VoteFilter};

type SetKey = (VoteFilter, Option<Epoch>);

/// The complete result of one refresh cycle.
#[derive(Debug)]
pub struct Snapshot {
    seq: u64,
    params: Option<ViewParams>,
    totals: Totals,
    user: UserView,
    window: EpochWindow,
    proposals: Vec<Proposal>,
    in_progress: HashSet<ProposalId>,
    memo: Mutex<HashMap<SetKey, Arc<ProposalSet>>>,
}

impl Snapshot {
    pub fn new(
        seq: u64,
        params: ViewParams,
        totals: Totals,
        user: UserView,
        window: EpochWindow,
        proposals: Vec<Proposal>,
        in_progress: HashSet<ProposalId>,
    ) -> Self {
        Self {
            seq,
            params: Some(params),
            totals,
            user,
            window,
            proposals,
            in_progress,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// The placeholder published before the first refresh completes.
    pub fn empty() -> Self {
        Self {
            seq: 0,
            params: None,
            totals: Totals::default(),
            user: UserView::default(),
            window: EpochWindow::classify(Epoch::new(0), []),
            proposals: Vec::new(),
            in_progress: HashSet::new(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Sequence number of the refresh that produced this snapshot.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether any refresh has completed yet.
    pub fn is_loaded(&self) -> bool {
        self.params.is_some()
    }

    pub fn params(&self) -> Option<&ViewParams> {
        self.params.as_ref()
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn user(&self) -> &UserView {
        &self.user
    }

    pub fn window(&self) -> &EpochWindow {
        &self.window
    }

    /// All normalized proposals in enumeration order.
    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    /// Number of slots in the current epoch's vote vector.
    pub fn current_slot_count(&self) -> usize {
        self.proposals
            .iter()
            .filter(|p| p.partition == Partition::Current)
            .count()
    }

    pub fn is_vote_in_progress(&self, id: ProposalId) -> bool {
        self.in_progress.contains(&id)
    }

    /// Look up one proposal.
    ///
    /// `index_hint` is the proposal's position within its partition, as the
    /// caller last saw it; it is checked first and otherwise ignored.
    pub fn proposal(
        &self,
        id: ProposalId,
        partition: Partition,
        index_hint: Option<usize>,
    ) -> Result<&Proposal, GovernanceError> {
        let mut candidates = self.proposals.iter().filter(|p| p.partition == partition);
        let hinted = index_hint
            .and_then(|i| candidates.clone().nth(i))
            .filter(|p| p.id == id);
        hinted
            .or_else(|| candidates.find(|p| p.id == id))
            .ok_or(GovernanceError::ProposalNotFound { id, partition })
    }

    /// The partitioned set for a filter, built once per snapshot.
    pub fn set(&self, filter: VoteFilter, epoch: Option<Epoch>) -> Arc<ProposalSet> {
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        memo.entry((filter, epoch))
            .or_insert_with(|| {
                Arc::new(ProposalSet::build(
                    &self.proposals,
                    &self.window,
                    filter,
                    epoch,
                ))
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::{Amount, ProposalData, Vote};

    fn proposal(id: u32, epoch: u32, partition: Partition, voted: Option<Vote>) -> Proposal {
        Proposal {
            id: ProposalId::new(id),
            epoch: Epoch::new(epoch),
            partition,
            slot: None,
            data: ProposalData::default(),
            tally: None,
            quorum: None,
            quorum_passed: None,
            voted,
            prev_voted: None,
            is_passed: None,
            vote_in_progress: false,
        }
    }

    fn snapshot() -> Snapshot {
        let window = EpochWindow::classify(Epoch::new(10), [Epoch::new(9)]);
        Snapshot::new(
            1,
            ViewParams::new(Epoch::new(10)),
            Totals {
                stake_active: Amount::new(100),
                stake_passive: Amount::ZERO,
            },
            UserView::default(),
            window,
            vec![
                proposal(1, 10, Partition::Current, Some(Vote::Yes)),
                proposal(2, 10, Partition::Current, None),
                proposal(3, 11, Partition::Future, None),
                proposal(4, 9, Partition::Previous, None),
            ],
            HashSet::from([ProposalId::new(2)]),
        )
    }

    #[test]
    fn finds_by_id_and_partition() {
        let snap = snapshot();
        let p = snap.proposal(ProposalId::new(2), Partition::Current, None).unwrap();
        assert_eq!(p.id, ProposalId::new(2));
    }

    #[test]
    fn wrong_partition_is_not_found() {
        let snap = snapshot();
        let err = snap
            .proposal(ProposalId::new(3), Partition::Current, None)
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::ProposalNotFound { partition: Partition::Current, .. }
        ));
    }

    #[test]
    fn stale_index_hint_falls_back_to_scan() {
        let snap = snapshot();
        let p = snap
            .proposal(ProposalId::new(1), Partition::Current, Some(1))
            .unwrap();
        assert_eq!(p.id, ProposalId::new(1));
        let p = snap
            .proposal(ProposalId::new(2), Partition::Current, Some(7))
            .unwrap();
        assert_eq!(p.id, ProposalId::new(2));
    }

    #[test]
    fn sets_are_memoized() {
        let snap = snapshot();
        let a = snap.set(VoteFilter::All, None);
        let b = snap.set(VoteFilter::All, None);
        assert!(Arc::ptr_eq(&a, &b));
        let c = snap.set(VoteFilter::Voted, None);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.current.items.len(), 1);
    }

    #[test]
    fn slot_count_and_progress() {
        let snap = snapshot();
        assert_eq!(snap.current_slot_count(), 2);
        assert!(snap.is_vote_in_progress(ProposalId::new(2)));
        assert!(!snap.is_vote_in_progress(ProposalId::new(1)));
    }

    #[test]
    fn empty_snapshot_is_not_loaded() {
        let snap = Snapshot::empty();
        assert!(!snap.is_loaded());
        assert_eq!(snap.seq(), 0);
        assert!(snap.set(VoteFilter::All, None).current.is_empty_epoch());
    }
}
