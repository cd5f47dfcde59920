//! Client side of the voting contract.
//!
//! - [`ContractClient`]: the opaque asynchronous boundary. Implementations
//!   invoke the contract and hand back raw JSON.
//! - [`GovernanceApi`]: typed calls on top of any `ContractClient`, shaping
//!   the raw responses into `ballot-types` records.
//! - [`WalletApiClient`]: a `ContractClient` speaking JSON-RPC to a wallet API
//!   service over HTTP.

pub mod api;
pub mod contract;
pub mod error;
pub mod wallet_api;

pub use api::GovernanceApi;
pub use contract::{ContractArgs, ContractClient, InvokeResult};
pub use error::ClientError;
pub use wallet_api::WalletApiClient;
