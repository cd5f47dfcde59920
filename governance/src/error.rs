use ballot_client::ClientError;
use ballot_store::StoreError;
use ballot_types::ProposalId;
use thiserror::Error;

use crate::epoch::Partition;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {id} not found in {partition} proposals")]
    ProposalNotFound { id: ProposalId, partition: Partition },

    #[error("a vote on proposal {0} is still being confirmed")]
    VoteInProgress(ProposalId),

    #[error("proposal {id} cannot be voted on: {reason}")]
    NotVotable { id: ProposalId, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("contract error: {0}")]
    Client(#[from] ClientError),
}
