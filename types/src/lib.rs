//! Fundamental types for the ballot governance engine.
//!
//! This crate defines the vocabulary shared across every other crate in the
//! workspace: proposal ids, epochs, stake amounts, votes, quorum rules and the
//! raw record shapes the voting contract hands back.

pub mod amount;
pub mod id;
pub mod quorum;
pub mod record;
pub mod tx;
pub mod vote;

pub use amount::{Amount, MINOR_UNITS_PER_TOKEN};
pub use id::{Epoch, ProposalId};
pub use quorum::QuorumRule;
pub use record::{
    CurrentEpoch, HistoricalVote, PrevVoted, ProposalData, ProposalRecord, ProposalStats,
    QuorumSpec, Totals, UserView, ViewParams,
};
pub use tx::{TransactionRecord, TxId, TxStatus};
pub use vote::Vote;
