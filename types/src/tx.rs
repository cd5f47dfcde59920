//! Wallet transaction records, as far as vote tracking needs them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wallet-assigned transaction identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw wallet transaction status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxStatus(i32);

impl TxStatus {
    /// The transaction is still being registered on chain.
    pub const IN_PROGRESS: Self = Self(5);

    pub fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn is_in_progress(&self) -> bool {
        *self == Self::IN_PROGRESS
    }
}

/// One entry of the wallet's transaction list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "txId")]
    pub tx_id: TxId,
    pub status: TxStatus,
}

impl TransactionRecord {
    pub fn new(tx_id: impl Into<String>, status: i32) -> Self {
        Self {
            tx_id: TxId::new(tx_id),
            status: TxStatus::new(status),
        }
    }
}
