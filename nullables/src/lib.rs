//! Nullable infrastructure for deterministic testing.
//!
//! The voting contract and the key-value store are abstracted behind traits.
//! This crate provides test-friendly implementations that:
//! - Return scripted values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod contract;
pub mod store;

pub use contract::{NullContract, PROCESS_INVOKE_DATA, TX_LIST};
pub use store::NullStore;
