//! Proposal normalization: merges the contract's proposal records, tallies,
//! the caller's current vote vector, historical votes and pending-vote state
//! into [`Proposal`] view models.

use ballot_types::{PrevVoted, ProposalId, ProposalRecord, Totals, Vote};
use std::collections::{HashMap, HashSet};

use crate::epoch::{EpochWindow, Partition};
use crate::proposal::{PrevVote, Proposal, Tally};

/// Everything outside the proposal record that normalization consults.
pub struct NormalizeContext<'a> {
    pub window: &'a EpochWindow,
    pub totals: &'a Totals,
    /// The caller's raw votes, one per current-epoch slot.
    pub current_votes: Option<&'a [u8]>,
    /// The caller's historical votes by proposal.
    pub history: &'a HashMap<ProposalId, PrevVoted>,
    /// Proposals with a vote transaction still in flight.
    pub in_progress: &'a HashSet<ProposalId>,
}

fn decode_vote(raw: u8, id: ProposalId) -> Vote {
    Vote::from_raw(raw).unwrap_or_else(|| {
        tracing::warn!(proposal = %id, raw, "vote value out of range, treating as unvoted");
        Vote::Unvoted
    })
}

/// Normalize one record. `slot` is its position in the current epoch's vote
/// vector and is only meaningful for current-epoch records.
///
/// Returns `None` for a record whose epoch falls outside the window.
pub fn normalize(
    record: &ProposalRecord,
    slot: Option<usize>,
    ctx: &NormalizeContext<'_>,
) -> Option<Proposal> {
    let Some(partition) = ctx.window.partition_of(record.epoch) else {
        tracing::debug!(proposal = %record.id, epoch = %record.epoch, "record outside epoch window");
        return None;
    };

    let tally = record.stats.as_ref().and_then(|stats| {
        let Some(tally) = Tally::from_stats(stats) else {
            tracing::warn!(proposal = %record.id, "tally variants overflow, dropping tally");
            return None;
        };
        if stats.total != tally.total.raw() {
            tracing::warn!(
                proposal = %record.id,
                reported = stats.total,
                computed = tally.total.raw(),
                "tally total does not match variants, using their sum"
            );
        }
        Some(tally)
    });

    let slot = match partition {
        Partition::Current => slot,
        _ => None,
    };

    let voted = match (partition, slot) {
        (Partition::Current, Some(slot)) => Some(
            ctx.current_votes
                .and_then(|votes| votes.get(slot))
                .map(|raw| decode_vote(*raw, record.id))
                .unwrap_or(Vote::Unvoted),
        ),
        _ => record.voted.map(|raw| decode_vote(raw, record.id)),
    };

    let prev_voted = match partition {
        Partition::Previous => ctx
            .history
            .get(&record.id)
            .or(record.prev_voted.as_ref())
            .map(|prev| PrevVote {
                vote: decode_vote(prev.value, record.id),
                epoch: prev.epoch,
            }),
        _ => None,
    };

    let quorum = record.data.quorum.map(|spec| spec.rule());
    let quorum_passed = match (quorum, tally) {
        (Some(rule), Some(tally)) => Some(rule.is_met(tally.yes, ctx.totals.stake_active)),
        _ => None,
    };

    Some(Proposal {
        id: record.id,
        epoch: record.epoch,
        partition,
        slot,
        data: record.data.clone(),
        tally,
        quorum,
        quorum_passed,
        voted,
        prev_voted,
        is_passed: record.is_passed,
        vote_in_progress: ctx.in_progress.contains(&record.id),
    })
}

/// Normalize the contract's full enumeration, assigning vote-vector slots to
/// current-epoch records in the order they were enumerated.
pub fn normalize_all(records: &[ProposalRecord], ctx: &NormalizeContext<'_>) -> Vec<Proposal> {
    let current = ctx.window.current();
    let mut next_slot = 0usize;
    records
        .iter()
        .filter_map(|record| {
            let slot = if record.epoch == current {
                let slot = next_slot;
                next_slot += 1;
                Some(slot)
            } else {
                None
            };
            normalize(record, slot, ctx)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::{Amount, Epoch, ProposalStats, QuorumSpec};

    struct Fixture {
        window: EpochWindow,
        totals: Totals,
        votes: Option<Vec<u8>>,
        history: HashMap<ProposalId, PrevVoted>,
        in_progress: HashSet<ProposalId>,
    }

    impl Fixture {
        fn new(current: u32, previous: &[u32]) -> Self {
            Self {
                window: EpochWindow::classify(
                    Epoch::new(current),
                    previous.iter().copied().map(Epoch::new),
                ),
                totals: Totals {
                    stake_active: Amount::new(1000),
                    stake_passive: Amount::ZERO,
                },
                votes: None,
                history: HashMap::new(),
                in_progress: HashSet::new(),
            }
        }

        fn ctx(&self) -> NormalizeContext<'_> {
            NormalizeContext {
                window: &self.window,
                totals: &self.totals,
                current_votes: self.votes.as_deref(),
                history: &self.history,
                in_progress: &self.in_progress,
            }
        }
    }

    fn record(id: u32, epoch: u32) -> ProposalRecord {
        ProposalRecord::new(ProposalId::new(id), Epoch::new(epoch))
    }

    fn with_stats(mut r: ProposalRecord, no: u64, yes: u64) -> ProposalRecord {
        r.stats = Some(ProposalStats {
            variants: vec![no, yes],
            total: no + yes,
        });
        r
    }

    #[test]
    fn current_vote_comes_from_vector_slot() {
        let mut fx = Fixture::new(10, &[]);
        fx.votes = Some(vec![255, 1, 0]);
        let records = vec![record(1, 10), record(2, 10), record(3, 10)];

        let out = normalize_all(&records, &fx.ctx());

        assert_eq!(out[0].voted, Some(Vote::Unvoted));
        assert_eq!(out[1].voted, Some(Vote::Yes));
        assert_eq!(out[2].voted, Some(Vote::No));
        assert_eq!(out[2].slot, Some(2));
    }

    #[test]
    fn missing_vector_or_short_vector_reads_unvoted() {
        let mut fx = Fixture::new(10, &[]);
        let records = vec![record(1, 10), record(2, 10)];
        assert_eq!(normalize_all(&records, &fx.ctx())[1].voted, Some(Vote::Unvoted));

        fx.votes = Some(vec![1]);
        let out = normalize_all(&records, &fx.ctx());
        assert_eq!(out[0].voted, Some(Vote::Yes));
        assert_eq!(out[1].voted, Some(Vote::Unvoted));
    }

    #[test]
    fn slots_skip_other_epochs() {
        let mut fx = Fixture::new(10, &[9]);
        fx.votes = Some(vec![0, 1]);
        let records = vec![record(1, 9), record(2, 10), record(3, 11), record(4, 10)];

        let out = normalize_all(&records, &fx.ctx());

        assert_eq!(out[0].slot, None);
        assert_eq!(out[1].slot, Some(0));
        assert_eq!(out[2].slot, None);
        assert_eq!(out[3].slot, Some(1));
        assert_eq!(out[3].voted, Some(Vote::Yes));
        assert_eq!(out[2].partition, Partition::Future);
    }

    #[test]
    fn future_vote_unknown_without_record_value() {
        let fx = Fixture::new(10, &[]);
        let out = normalize(&record(1, 11), None, &fx.ctx()).unwrap();
        assert_eq!(out.voted, None);
        assert!(out.is_awaiting_vote());
    }

    #[test]
    fn out_of_range_vote_value_is_unvoted() {
        let mut fx = Fixture::new(10, &[]);
        fx.votes = Some(vec![42]);
        let out = normalize(&record(1, 10), Some(0), &fx.ctx()).unwrap();
        assert_eq!(out.voted, Some(Vote::Unvoted));
    }

    #[test]
    fn missing_tally_leaves_derived_fields_unset() {
        let fx = Fixture::new(10, &[]);
        let mut r = record(1, 10);
        r.data.quorum = Some(QuorumSpec::Percent(10.0));
        let out = normalize(&r, Some(0), &fx.ctx()).unwrap();
        assert!(out.tally.is_none());
        assert!(out.quorum.is_some());
        assert_eq!(out.quorum_passed, None);
        assert_eq!(out.yes_percent(), None);
    }

    #[test]
    fn absolute_quorum_boundary_passes() {
        let fx = Fixture::new(10, &[]);
        let mut r = with_stats(record(1, 10), 0, 1_000_000_000);
        r.data.quorum = Some(QuorumSpec::Tokens(1000.0));
        let out = normalize(&r, Some(0), &fx.ctx()).unwrap();
        assert_eq!(out.quorum_passed, Some(true));
    }

    #[test]
    fn percent_quorum_with_zero_active_stake_fails() {
        let mut fx = Fixture::new(10, &[]);
        fx.totals.stake_active = Amount::ZERO;
        let mut r = with_stats(record(1, 10), 0, 500);
        r.data.quorum = Some(QuorumSpec::Percent(1.0));
        let out = normalize(&r, Some(0), &fx.ctx()).unwrap();
        assert_eq!(out.quorum_passed, Some(false));
    }

    #[test]
    fn history_overrides_record_prev_vote() {
        let mut fx = Fixture::new(10, &[8]);
        fx.history.insert(
            ProposalId::new(5),
            PrevVoted {
                value: 0,
                epoch: Epoch::new(8),
            },
        );
        let mut r = record(5, 8);
        r.prev_voted = Some(PrevVoted {
            value: 1,
            epoch: Epoch::new(8),
        });
        r.is_passed = Some(false);

        let out = normalize(&r, None, &fx.ctx()).unwrap();

        assert_eq!(out.prev_voted.unwrap().vote, Vote::No);
        assert_eq!(out.is_passed, Some(false));
    }

    #[test]
    fn in_progress_flag_is_copied() {
        let mut fx = Fixture::new(10, &[]);
        fx.in_progress.insert(ProposalId::new(1));
        let out = normalize(&record(1, 10), Some(0), &fx.ctx()).unwrap();
        assert!(out.vote_in_progress);
    }

    #[test]
    fn record_outside_window_is_skipped() {
        let fx = Fixture::new(10, &[]);
        assert!(normalize(&record(1, 3), None, &fx.ctx()).is_none());
    }

    #[test]
    fn record_after_future_epoch_is_skipped() {
        let fx = Fixture::new(10, &[9, 12]);
        assert!(normalize(&record(1, 12), None, &fx.ctx()).is_none());
        assert!(normalize(&record(2, 9), None, &fx.ctx()).is_some());
    }

    #[test]
    fn overflowing_variants_leave_tally_unset() {
        let fx = Fixture::new(10, &[]);
        let mut r = record(1, 10);
        r.stats = Some(ProposalStats {
            variants: vec![u64::MAX, 2],
            total: u64::MAX,
        });
        let out = normalize(&r, Some(0), &fx.ctx()).unwrap();
        assert!(out.tally.is_none());
        assert!(out.quorum_passed.is_none());
    }
}
