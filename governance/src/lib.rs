//! Proposal and vote reconciliation for staked-token governance.
//!
//! Four sources disagree with each other at any moment: the contract's
//! proposal records, its aggregated tallies, the caller's on-chain votes and
//! the votes the caller submitted locally that have not settled yet. This
//! crate merges them into one consistent view model per proposal:
//!
//! - [`epoch`]: which epoch is current, future or previous.
//! - [`pending`]: locally submitted votes awaiting confirmation.
//! - [`normalize`]: raw records to [`Proposal`]s with derived fields.
//! - [`set`]: partitioning, vote-status filtering and ordering.
//! - [`selector`]: read-only queries over the last published snapshot.
//! - [`engine`]: refresh cycles and vote submission.

pub mod ballot;
pub mod engine;
pub mod epoch;
pub mod error;
pub mod normalize;
pub mod pending;
pub mod proposal;
pub mod selector;
pub mod set;

pub use ballot::build_vote_vector;
pub use engine::{GovernanceEngine, RefreshOutcome};
pub use epoch::{EpochWindow, Partition};
pub use error::GovernanceError;
pub use normalize::{normalize, normalize_all, NormalizeContext};
pub use pending::{PendingVote, PendingVoteTracker, ReconcileReport, PENDING_VOTES_KEY};
pub use proposal::{PrevVote, PrevVoteStatus, Proposal, Tally};
pub use selector::Snapshot;
pub use set::{ProposalGroup, ProposalSet, VoteFilter};
