//! Locally submitted votes awaiting on-chain confirmation.
//!
//! The list lives in a [`KeyValueStore`] so it survives restarts. It is a
//! best-effort cache: unreadable contents are treated as an empty list.

use ballot_store::{KeyValueStore, StoreError};
use ballot_types::{ProposalId, TransactionRecord, TxId, Vote};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Store key holding the pending-vote list.
pub const PENDING_VOTES_KEY: &str = "votes";

/// A vote that has been submitted but not yet seen settle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingVote {
    pub id: ProposalId,
    pub vote: Vote,
    pub txid: TxId,
    /// Slot of the proposal in the current epoch's vote vector.
    pub index: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PendingVotesDoc {
    #[serde(default)]
    votes: Vec<PendingVote>,
}

/// Outcome of one [`PendingVoteTracker::reconcile`] pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Proposals whose vote transaction is still in progress.
    pub kept: Vec<ProposalId>,
    /// Proposals whose entry was dropped (settled, failed or unknown tx).
    pub dropped: Vec<ProposalId>,
}

pub struct PendingVoteTracker<S> {
    store: S,
    in_progress: HashSet<ProposalId>,
}

impl<S: KeyValueStore> PendingVoteTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            in_progress: HashSet::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the persisted list. The flag is true when the stored bytes were
    /// unusable and should be overwritten.
    fn load(&self) -> (Vec<PendingVote>, bool) {
        let bytes = match self.store.get(PENDING_VOTES_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return (Vec::new(), false),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read pending votes, assuming none");
                return (Vec::new(), false);
            }
        };
        match serde_json::from_slice::<PendingVotesDoc>(&bytes) {
            Ok(doc) => (doc.votes, false),
            Err(e) => {
                tracing::warn!(error = %e, "pending vote cache is corrupted, discarding it");
                (Vec::new(), true)
            }
        }
    }

    fn save(&self, votes: Vec<PendingVote>) -> Result<(), StoreError> {
        if votes.is_empty() {
            return self.store.remove(PENDING_VOTES_KEY);
        }
        let bytes = serde_json::to_vec(&PendingVotesDoc { votes })
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(PENDING_VOTES_KEY, &bytes)
    }

    /// The persisted pending votes.
    pub fn pending(&self) -> Vec<PendingVote> {
        self.load().0
    }

    pub fn has_pending(&self, id: ProposalId) -> bool {
        self.pending().iter().any(|v| v.id == id)
    }

    /// Remember a freshly submitted vote, replacing any earlier entry for the
    /// same proposal.
    pub fn record(&mut self, vote: PendingVote) -> Result<(), StoreError> {
        let (mut votes, _) = self.load();
        votes.retain(|v| v.id != vote.id);
        tracing::debug!(proposal = %vote.id, txid = %vote.txid, "recording pending vote");
        votes.push(vote);
        self.save(votes)
    }

    /// Match every pending vote against the wallet's transactions.
    ///
    /// Entries whose transaction is in progress are kept and flagged; all
    /// others are dropped. The in-progress set is updated even if persisting
    /// the trimmed list fails.
    pub fn reconcile(
        &mut self,
        transactions: &[TransactionRecord],
    ) -> Result<ReconcileReport, StoreError> {
        let (votes, corrupted) = self.load();
        let before = votes.len();
        let mut report = ReconcileReport::default();

        let kept: Vec<PendingVote> = votes
            .into_iter()
            .filter(|vote| {
                let in_progress = transactions
                    .iter()
                    .any(|tx| tx.tx_id == vote.txid && tx.status.is_in_progress());
                if in_progress {
                    report.kept.push(vote.id);
                } else {
                    report.dropped.push(vote.id);
                }
                in_progress
            })
            .collect();

        self.in_progress = report.kept.iter().copied().collect();

        if corrupted || kept.len() != before {
            tracing::debug!(
                kept = report.kept.len(),
                dropped = report.dropped.len(),
                "pending votes reconciled"
            );
            self.save(kept)?;
        }
        Ok(report)
    }

    /// Whether the last reconcile saw a vote on `id` still in flight.
    pub fn is_in_progress(&self, id: ProposalId) -> bool {
        self.in_progress.contains(&id)
    }

    pub fn in_progress(&self) -> &HashSet<ProposalId> {
        &self.in_progress
    }
}
