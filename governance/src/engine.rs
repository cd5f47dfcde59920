//! The governance engine: periodic refresh of contract state and vote casting.
//!
//! Every refresh fetches all contract views concurrently, reconciles the
//! pending-vote list, normalizes proposals and publishes an immutable
//! [`Snapshot`]. Refreshes are numbered; a result is only published if no
//! later refresh has been published already and no vote was recorded after
//! it started. Readers never observe a partially updated snapshot.

use ballot_client::{ContractClient, GovernanceApi};
use ballot_store::KeyValueStore;
use ballot_types::{PrevVoted, ProposalId, TxId, Vote};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::ballot::build_vote_vector;
use crate::epoch::{EpochWindow, Partition};
use crate::error::GovernanceError;
use crate::normalize::{normalize_all, NormalizeContext};
use crate::pending::{PendingVote, PendingVoteTracker};
use crate::selector::Snapshot;

/// What happened to the result of one refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot with this sequence number was published.
    Applied(u64),
    /// A newer refresh or vote superseded this one; nothing was published.
    Stale(u64),
}

struct TrackerState<S> {
    tracker: PendingVoteTracker<S>,
    /// Sequence number taken when the last vote was recorded. Refreshes that
    /// started before it may have missed that vote's transaction.
    vote_barrier: u64,
}

pub struct GovernanceEngine<C, S> {
    api: GovernanceApi<C>,
    state: Mutex<TrackerState<S>>,
    /// Held for a whole `cast_vote`, from reading the pending list to
    /// recording the new entry. Each submission replaces the full vector.
    submit: tokio::sync::Mutex<()>,
    next_seq: AtomicU64,
    snapshot: watch::Sender<Arc<Snapshot>>,
}

impl<C: ContractClient, S: KeyValueStore> GovernanceEngine<C, S> {
    pub fn new(api: GovernanceApi<C>, store: S) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::empty()));
        Self {
            api,
            state: Mutex::new(TrackerState {
                tracker: PendingVoteTracker::new(store),
                vote_barrier: 0,
            }),
            submit: tokio::sync::Mutex::new(()),
            next_seq: AtomicU64::new(0),
            snapshot,
        }
    }

    pub fn api(&self) -> &GovernanceApi<C> {
        &self.api
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified every time a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    /// Pending votes as currently persisted.
    pub fn pending_votes(&self) -> Vec<PendingVote> {
        self.lock_state().tracker.pending()
    }

    fn lock_state(&self) -> MutexGuard<'_, TrackerState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run one refresh cycle.
    ///
    /// A failed fetch leaves the published snapshot untouched and returns the
    /// error. A failure to persist the reconciled pending list is logged and
    /// otherwise ignored.
    pub async fn refresh(&self) -> Result<RefreshOutcome, GovernanceError> {
        let seq = self.take_seq();

        let fetched = tokio::try_join!(
            self.api.view_params(),
            self.api.view_totals(),
            self.api.user_view(),
            self.api.view_proposals(),
            self.api.view_votes(),
            self.api.transactions(),
        );
        let (params, totals, user, records, history, transactions) = match fetched {
            Ok(views) => views,
            Err(e) => {
                tracing::warn!(seq, error = %e, "refresh failed, keeping previous snapshot");
                return Err(e.into());
            }
        };

        let in_progress = {
            let mut state = self.lock_state();
            if seq < state.vote_barrier || seq < self.snapshot.borrow().seq() {
                tracing::debug!(seq, "discarding superseded refresh");
                return Ok(RefreshOutcome::Stale(seq));
            }
            if let Err(e) = state.tracker.reconcile(&transactions) {
                tracing::warn!(error = %e, "failed to persist reconciled pending votes");
            }
            state.tracker.in_progress().clone()
        };

        let window = EpochWindow::from_records(params.current_epoch(), &records);
        let history: HashMap<ProposalId, PrevVoted> =
            history.iter().map(|h| (h.id, h.prev_voted())).collect();
        let proposals = normalize_all(
            &records,
            &NormalizeContext {
                window: &window,
                totals: &totals,
                current_votes: user.current_votes.as_deref(),
                history: &history,
                in_progress: &in_progress,
            },
        );

        let count = proposals.len();
        let snapshot = Arc::new(Snapshot::new(
            seq,
            params,
            totals,
            user,
            window,
            proposals,
            in_progress,
        ));
        let applied = self.snapshot.send_if_modified(|current| {
            if seq > current.seq() {
                *current = snapshot;
                true
            } else {
                false
            }
        });

        if applied {
            tracing::debug!(seq, proposals = count, "snapshot published");
            Ok(RefreshOutcome::Applied(seq))
        } else {
            tracing::debug!(seq, "discarding superseded refresh");
            Ok(RefreshOutcome::Stale(seq))
        }
    }

    /// Cast (or change) the caller's vote on a current-epoch proposal.
    ///
    /// The whole current vote vector is resubmitted with the proposal's slot
    /// replaced. On success the transaction is remembered as pending until a
    /// later refresh sees it settle. Concurrent calls are submitted one at a
    /// time so each vector carries the votes recorded before it.
    pub async fn cast_vote(&self, id: ProposalId, vote: Vote) -> Result<TxId, GovernanceError> {
        if !vote.is_cast() {
            return Err(GovernanceError::NotVotable {
                id,
                reason: "only yes or no can be submitted".to_string(),
            });
        }
        let _submitting = self.submit.lock().await;

        let snapshot = self.snapshot();
        let proposal = snapshot.proposal(id, Partition::Current, None)?;
        let slot = proposal.slot.ok_or_else(|| GovernanceError::NotVotable {
            id,
            reason: "proposal has no slot in the current vote vector".to_string(),
        })?;
        let pending = self.lock_state().tracker.pending();
        if snapshot.is_vote_in_progress(id) || pending.iter().any(|p| p.id == id) {
            return Err(GovernanceError::VoteInProgress(id));
        }

        let mut votes = build_vote_vector(
            id,
            snapshot.user().current_votes.as_deref(),
            snapshot.current_slot_count(),
            slot,
            vote,
        )?;
        // Unsettled votes on other proposals are not in the on-chain vector yet.
        for other in &pending {
            let same_slot = snapshot
                .proposal(other.id, Partition::Current, Some(other.index))
                .is_ok_and(|p| p.slot == Some(other.index));
            if same_slot {
                votes[other.index] = other.vote.raw();
            }
        }
        let txid = self.api.submit_votes(&votes, id).await?;

        let mut state = self.lock_state();
        state.vote_barrier = self.take_seq();
        let pending = PendingVote {
            id,
            vote,
            txid: txid.clone(),
            index: slot,
        };
        if let Err(e) = state.tracker.record(pending) {
            tracing::warn!(proposal = %id, %txid, error = %e, "failed to persist pending vote");
        }
        tracing::info!(proposal = %id, %vote, %txid, "vote submitted");
        Ok(txid)
    }

    /// Refresh every `period` until `shutdown` flips to true or its sender is
    /// dropped. Failed refreshes are retried on the next tick.
    pub async fn run(&self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("governance refresh task shutting down");
                        break;
                    }
                }
                _ = interval.tick() => {
                    // refresh() already logs fetch failures
                    let _ = self.refresh().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_nullables::{NullContract, NullStore, TX_LIST};
    use ballot_types::{Epoch, TxStatus};
    use serde_json::json;

    type Engine = GovernanceEngine<Arc<NullContract>, Arc<NullStore>>;

    fn engine() -> (Engine, Arc<NullContract>, Arc<NullStore>) {
        let contract = Arc::new(NullContract::new());
        contract.set_current_epoch(10);
        contract.set_totals(1_000_000, 0);
        contract.set_proposals(json!([
            { "id": 1, "epoch": 10, "stats": { "variants": [10, 30], "total": 40 } },
            { "id": 2, "epoch": 10 },
            { "id": 3, "epoch": 11 },
            { "id": 4, "epoch": 9, "is_passed": true },
        ]));
        contract.set_user(500, Some(vec![255, 0]));
        let store = Arc::new(NullStore::new());
        let engine = GovernanceEngine::new(GovernanceApi::new(contract.clone(), "cid"), store.clone());
        (engine, contract, store)
    }

    #[tokio::test]
    async fn refresh_publishes_snapshot() {
        let (engine, _, _) = engine();
        assert!(!engine.snapshot().is_loaded());

        let outcome = engine.refresh().await.unwrap();

        assert_eq!(outcome, RefreshOutcome::Applied(1));
        let snap = engine.snapshot();
        assert!(snap.is_loaded());
        assert_eq!(snap.window().current(), Epoch::new(10));
        assert_eq!(snap.window().previous(), &[Epoch::new(9)]);
        assert_eq!(snap.current_slot_count(), 2);
        let p2 = snap.proposal(ProposalId::new(2), Partition::Current, None).unwrap();
        assert_eq!(p2.voted, Some(Vote::No));
    }

    #[tokio::test]
    async fn proposals_beyond_the_future_epoch_are_not_history() {
        let (engine, contract, _) = engine();
        contract.set_proposals(json!([
            { "id": 1, "epoch": 10 },
            { "id": 5, "epoch": 12 },
        ]));

        engine.refresh().await.unwrap();

        let snap = engine.snapshot();
        assert!(snap.window().previous().is_empty());
        assert_eq!(snap.window().default_previous(), None);
        assert_eq!(snap.proposals().len(), 1);
        assert!(snap
            .proposal(ProposalId::new(5), Partition::Previous, None)
            .is_err());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let (engine, contract, _) = engine();
        engine.refresh().await.unwrap();
        contract.fail("view_proposals");

        assert!(engine.refresh().await.is_err());

        let snap = engine.snapshot();
        assert_eq!(snap.seq(), 1);
        assert_eq!(snap.proposals().len(), 4);
    }

    #[tokio::test]
    async fn cast_vote_submits_full_vector_and_records_pending() {
        let (engine, contract, _) = engine();
        engine.refresh().await.unwrap();

        let txid = engine.cast_vote(ProposalId::new(1), Vote::Yes).await.unwrap();

        assert_eq!(contract.submitted_votes(), vec![vec![1, 0]]);
        let pending = engine.pending_votes();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].txid, txid);
        assert_eq!(pending[0].index, 0);
    }

    #[tokio::test]
    async fn pending_vote_is_flagged_then_cleared_when_settled() {
        let (engine, contract, store) = engine();
        engine.refresh().await.unwrap();
        let txid = engine.cast_vote(ProposalId::new(2), Vote::Yes).await.unwrap();

        engine.refresh().await.unwrap();
        let snap = engine.snapshot();
        assert!(snap.is_vote_in_progress(ProposalId::new(2)));
        assert!(
            snap.proposal(ProposalId::new(2), Partition::Current, Some(1))
                .unwrap()
                .vote_in_progress
        );

        contract.set_transaction(txid.as_str(), TxStatus::new(3));
        engine.refresh().await.unwrap();
        assert!(!engine.snapshot().is_vote_in_progress(ProposalId::new(2)));
        assert!(engine.pending_votes().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn unsettled_vote_on_another_proposal_is_carried_over() {
        let (engine, contract, _) = engine();
        engine.refresh().await.unwrap();

        engine.cast_vote(ProposalId::new(1), Vote::Yes).await.unwrap();
        engine.cast_vote(ProposalId::new(2), Vote::Yes).await.unwrap();

        assert_eq!(contract.submitted_votes(), vec![vec![1, 0], vec![1, 1]]);
    }

    #[tokio::test]
    async fn concurrent_votes_each_carry_the_other() {
        let (engine, contract, _) = engine();
        engine.refresh().await.unwrap();
        contract.delay_once("vote", Duration::from_millis(50));

        let (first, second) = tokio::join!(
            engine.cast_vote(ProposalId::new(1), Vote::Yes),
            engine.cast_vote(ProposalId::new(2), Vote::Yes),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(contract.submitted_votes(), vec![vec![1, 0], vec![1, 1]]);
        assert_eq!(engine.pending_votes().len(), 2);
    }

    #[tokio::test]
    async fn second_vote_while_in_progress_is_rejected() {
        let (engine, _, _) = engine();
        engine.refresh().await.unwrap();
        engine.cast_vote(ProposalId::new(1), Vote::Yes).await.unwrap();

        let err = engine.cast_vote(ProposalId::new(1), Vote::No).await.unwrap_err();
        assert!(matches!(err, GovernanceError::VoteInProgress(_)));
    }

    #[tokio::test]
    async fn only_current_proposals_are_votable() {
        let (engine, _, _) = engine();
        engine.refresh().await.unwrap();

        let err = engine.cast_vote(ProposalId::new(3), Vote::Yes).await.unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotFound { .. }));
        let err = engine.cast_vote(ProposalId::new(1), Vote::Unvoted).await.unwrap_err();
        assert!(matches!(err, GovernanceError::NotVotable { .. }));
    }

    #[tokio::test]
    async fn store_failure_does_not_fail_the_vote() {
        let (engine, _, store) = engine();
        engine.refresh().await.unwrap();
        store.fail_writes(true);

        assert!(engine.cast_vote(ProposalId::new(1), Vote::Yes).await.is_ok());
        assert!(engine.pending_votes().is_empty());
    }

    #[tokio::test]
    async fn refresh_started_before_vote_is_discarded() {
        let (engine, contract, _) = engine();
        engine.refresh().await.unwrap();
        contract.delay_once(TX_LIST, Duration::from_millis(200));

        let (slow, voted) = tokio::join!(engine.refresh(), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            engine.cast_vote(ProposalId::new(1), Vote::Yes).await
        });

        assert!(voted.is_ok());
        assert!(matches!(slow.unwrap(), RefreshOutcome::Stale(_)));
        assert_eq!(engine.pending_votes().len(), 1);
    }

    #[tokio::test]
    async fn older_refresh_never_replaces_newer_snapshot() {
        let (engine, contract, _) = engine();
        contract.delay_once(TX_LIST, Duration::from_millis(200));

        let (first, second) = tokio::join!(engine.refresh(), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            engine.refresh().await
        });

        assert_eq!(second.unwrap(), RefreshOutcome::Applied(2));
        assert_eq!(first.unwrap(), RefreshOutcome::Stale(1));
        assert_eq!(engine.snapshot().seq(), 2);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let (engine, _, _) = engine();
        let (tx, rx) = watch::channel(false);
        let mut updates = engine.subscribe();

        tokio::join!(engine.run(Duration::from_millis(10), rx), async {
            updates.changed().await.unwrap();
            tx.send(true).unwrap();
        });

        assert!(engine.snapshot().is_loaded());
    }
}
