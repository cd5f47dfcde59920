//! LMDB environment setup.

use std::path::Path;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::{LmdbError, LmdbKvStore};

/// Name of the single database holding client-side key-value state.
const KV_DB_NAME: &str = "kv";

/// Wraps the LMDB environment and its database handles.
pub struct LmdbEnvironment {
    env: Env,
    kv_db: Database<Str, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per directory by this process
        // and never memory-mapped elsewhere while it is alive.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };
        let mut wtxn = env.write_txn()?;
        let kv_db: Database<Str, Bytes> = env.create_database(&mut wtxn, Some(KV_DB_NAME))?;
        wtxn.commit()?;
        tracing::debug!(path = %path.display(), "opened LMDB environment");
        Ok(Self { env, kv_db })
    }

    /// A key-value store view over this environment.
    pub fn kv_store(&self) -> LmdbKvStore {
        LmdbKvStore {
            env: self.env.clone(),
            db: self.kv_db,
        }
    }
}
