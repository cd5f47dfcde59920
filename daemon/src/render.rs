//! Plain-text rendering of the governance view model for the terminal.

use ballot_governance::{
    Partition, PendingVote, PrevVoteStatus, Proposal, ProposalGroup, ProposalSet, Snapshot,
    VoteFilter,
};
use ballot_types::{Amount, QuorumRule, Vote};
use ballot_utils::{format_percent, format_tokens, format_tokens_compact};

fn vote_label(vote: Option<Vote>) -> &'static str {
    match vote {
        Some(Vote::Yes) => "yes",
        Some(Vote::No) => "no",
        Some(Vote::Unvoted) => "not voted",
        None => "unknown",
    }
}

fn quorum_label(rule: &QuorumRule) -> String {
    match rule {
        QuorumRule::Absolute(amount) => format!("{} tokens", format_tokens(*amount)),
        QuorumRule::Percent(pct) => format!("{} of active stake", format_percent(*pct)),
    }
}

fn summary_line(p: &Proposal) -> String {
    let mut line = format!("{:>6}  {}", p.id.to_string(), p.data.title);
    if let Some(tally) = p.tally {
        line.push_str(&format!(
            "  [yes {} / no {}]",
            format_tokens_compact(tally.yes),
            format_tokens_compact(tally.no)
        ));
    }
    match p.partition {
        Partition::Previous => {
            let outcome = match p.is_passed {
                Some(true) => "passed",
                Some(false) => "failed",
                None => "outcome unknown",
            };
            line.push_str(&format!("  {outcome}"));
        }
        _ => line.push_str(&format!("  vote: {}", vote_label(p.voted))),
    }
    if p.vote_in_progress {
        line.push_str("  (vote in progress)");
    }
    line
}

fn group_lines(group: &ProposalGroup, filter: VoteFilter, lines: &mut Vec<String>) {
    lines.push(format!("{} ({} proposals)", group.epoch, group.total));
    if group.is_empty_epoch() {
        lines.push("  no proposals in this epoch".to_string());
    } else if group.is_filtered_empty() {
        lines.push(format!("  no proposals match filter `{filter}`"));
    } else {
        lines.extend(group.items.iter().map(summary_line));
    }
}

/// Render one partition of a proposal set.
pub fn render_set(set: &ProposalSet, partition: Partition, filter: VoteFilter) -> String {
    let mut lines = Vec::new();
    let groups = set.groups(partition);
    if groups.is_empty() {
        lines.push(format!("no {partition} epochs"));
    }
    for group in groups {
        group_lines(group, filter, &mut lines);
    }
    lines.join("\n")
}

/// Render every detail of one proposal.
pub fn render_proposal(p: &Proposal, snapshot: &Snapshot) -> String {
    let mut lines = vec![
        format!("Proposal {} ({}, {})", p.id, p.epoch, p.partition),
        format!("title:       {}", p.data.title),
    ];
    if !p.data.description.is_empty() {
        lines.push(format!("description: {}", p.data.description));
    }
    if !p.data.ref_link.is_empty() {
        lines.push(format!("reference:   {}", p.data.ref_link));
    }
    if !p.data.forum_link.is_empty() {
        lines.push(format!("forum:       {}", p.data.forum_link));
    }

    match p.tally {
        Some(tally) => {
            lines.push(format!(
                "yes:         {} ({})",
                format_tokens(tally.yes),
                format_percent(tally.yes_percent())
            ));
            lines.push(format!(
                "no:          {} ({})",
                format_tokens(tally.no),
                format_percent(tally.no_percent())
            ));
            lines.push(format!("total:       {}", format_tokens(tally.total)));
        }
        None => lines.push("tally:       not available".to_string()),
    }

    if let Some(rule) = &p.quorum {
        let status = match p.quorum_passed {
            Some(true) => "reached",
            Some(false) => "not reached",
            None => "unknown",
        };
        lines.push(format!("quorum:      {} ({status})", quorum_label(rule)));
    }

    match p.partition {
        Partition::Previous => {
            let mine = match p.prev_vote_status() {
                PrevVoteStatus::Voted(vote) => format!("you voted {vote}"),
                PrevVoteStatus::NotVoted => "epoch finished, you did not vote".to_string(),
                PrevVoteStatus::Unknown => "your vote is unknown".to_string(),
            };
            lines.push(format!("your vote:   {mine}"));
            if let Some(passed) = p.is_passed {
                lines.push(format!(
                    "result:      {}",
                    if passed { "passed" } else { "failed" }
                ));
            }
        }
        Partition::Current => {
            lines.push(format!("your vote:   {}", vote_label(p.voted)));
            let network = snapshot.totals().stake_active;
            lines.push(format!("network:     {} active", format_tokens(network)));
            let stake = snapshot.user().stake_active;
            lines.push(format!("your stake:  {} active", format_tokens(stake)));
        }
        Partition::Future => {
            lines.push(format!("voting opens: {}", snapshot.window().future()));
            let totals = snapshot.totals();
            let network = staked(totals.stake_active, totals.stake_passive);
            lines.push(format!("network:     {} staked", format_tokens(network)));
            let user = snapshot.user();
            let stake = staked(user.stake_active, user.stake_passive);
            lines.push(format!("your stake:  {} staked", format_tokens(stake)));
        }
    }
    if p.vote_in_progress {
        lines.push("a vote on this proposal is being confirmed".to_string());
    }
    lines.join("\n")
}

/// Active plus passive stake, for display.
fn staked(active: Amount, passive: Amount) -> Amount {
    Amount::new(active.raw().saturating_add(passive.raw()))
}

pub fn render_pending(votes: &[PendingVote]) -> String {
    if votes.is_empty() {
        return "no pending votes".to_string();
    }
    votes
        .iter()
        .map(|v| format!("{:>6}  {:<3}  slot {}  tx {}", v.id.to_string(), v.vote.as_str(), v.index, v.txid))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_governance::{EpochWindow, Tally};
    use ballot_types::{Amount, Epoch, ProposalData, ProposalId, Totals, TxId, UserView, ViewParams};
    use std::collections::HashSet;

    fn proposal(id: u32, partition: Partition, voted: Option<Vote>) -> Proposal {
        Proposal {
            id: ProposalId::new(id),
            epoch: Epoch::new(10),
            partition,
            slot: Some(0),
            data: ProposalData {
                title: format!("Proposal {id}"),
                ..Default::default()
            },
            tally: Tally::new(Amount::new(1_000_000), Amount::new(3_000_000)),
            quorum: Some(QuorumRule::Percent(10.0)),
            quorum_passed: Some(true),
            voted,
            prev_voted: None,
            is_passed: None,
            vote_in_progress: false,
        }
    }

    fn snapshot(proposals: Vec<Proposal>) -> Snapshot {
        Snapshot::new(
            1,
            ViewParams::new(Epoch::new(10)),
            Totals {
                stake_active: Amount::new(40_000_000),
                stake_passive: Amount::new(2_000_000),
            },
            UserView {
                stake_active: Amount::new(5_000_000),
                stake_passive: Amount::new(1_500_000),
                current_votes: None,
            },
            EpochWindow::classify(Epoch::new(10), []),
            proposals,
            HashSet::new(),
        )
    }

    #[test]
    fn filtered_empty_is_distinguished_from_empty() {
        let snap = snapshot(vec![proposal(1, Partition::Current, Some(Vote::Yes))]);
        let set = snap.set(VoteFilter::AwaitingVote, None);
        let current = render_set(&set, Partition::Current, VoteFilter::AwaitingVote);
        assert!(current.contains("no proposals match filter `awaiting`"));
        let future = render_set(&set, Partition::Future, VoteFilter::AwaitingVote);
        assert!(future.contains("no proposals in this epoch"));
    }

    #[test]
    fn detail_shows_tally_and_quorum() {
        let p = proposal(3, Partition::Current, None);
        let snap = snapshot(vec![p.clone()]);
        let out = render_proposal(&p, &snap);
        assert!(out.contains("yes:         3 (75.00%)"));
        assert!(out.contains("quorum:      10.00% of active stake (reached)"));
        assert!(out.contains("your vote:   unknown"));
        assert!(out.contains("network:     40 active"));
        assert!(out.contains("your stake:  5 active"));
    }

    #[test]
    fn future_detail_shows_active_plus_passive_stake() {
        let p = proposal(4, Partition::Future, None);
        let snap = snapshot(vec![p.clone()]);
        let out = render_proposal(&p, &snap);
        assert!(out.contains("voting opens: Epoch #11"));
        assert!(out.contains("network:     42 staked"));
        assert!(out.contains("your stake:  6.5 staked"));
    }

    #[test]
    fn pending_list() {
        assert_eq!(render_pending(&[]), "no pending votes");
        let out = render_pending(&[PendingVote {
            id: ProposalId::new(7),
            vote: Vote::Yes,
            txid: TxId::new("abc"),
            index: 2,
        }]);
        assert!(out.contains("tx abc"));
        assert!(out.contains("slot 2"));
    }
}
