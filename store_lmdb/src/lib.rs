//! LMDB storage backend for the ballot engine.
//!
//! Implements [`ballot_store::KeyValueStore`] using the `heed` LMDB bindings.

pub mod environment;
pub mod error;
pub mod kv;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use kv::LmdbKvStore;
