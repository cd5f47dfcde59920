//! Building the vote vector submitted to the contract.
//!
//! The contract takes the caller's votes for every current-epoch proposal at
//! once, one raw value per slot. Changing one vote means resubmitting the
//! whole vector with that slot replaced.

use ballot_types::{ProposalId, Vote};

use crate::error::GovernanceError;

/// Produce the raw vote vector with `slot` set to `vote`.
///
/// Starts from the caller's on-chain vector when there is one, padded with
/// the unvoted sentinel up to `slot_count`; otherwise every slot is unvoted.
pub fn build_vote_vector(
    id: ProposalId,
    current_votes: Option<&[u8]>,
    slot_count: usize,
    slot: usize,
    vote: Vote,
) -> Result<Vec<u8>, GovernanceError> {
    if slot >= slot_count {
        return Err(GovernanceError::NotVotable {
            id,
            reason: format!("slot {slot} is outside the {slot_count} current proposals"),
        });
    }
    let mut votes = current_votes.map(<[u8]>::to_vec).unwrap_or_default();
    if votes.len() < slot_count {
        votes.resize(slot_count, Vote::Unvoted.raw());
    }
    votes[slot] = vote.raw();
    Ok(votes)
}
