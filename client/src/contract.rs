//! The opaque contract invocation boundary.

use async_trait::async_trait;
use ballot_types::TxId;
use serde_json::Value;
use std::fmt;

use crate::ClientError;

/// Comma-separated `key=value` argument string understood by the contract's
/// app shader, e.g. `role=manager,action=view_params,cid=<cid>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractArgs {
    pairs: Vec<(String, String)>,
}

impl ContractArgs {
    pub fn new(role: &str, action: &str) -> Self {
        Self::default().arg("role", role).arg("action", action)
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the `action` argument, for logs and error messages.
    pub fn action(&self) -> &str {
        self.get("action").unwrap_or("")
    }
}

impl fmt::Display for ContractArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

/// What one contract invocation returns.
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeResult {
    /// The shader's JSON output.
    pub output: Value,
    /// Transaction payload to hand to [`ContractClient::process_invoke_data`],
    /// present only for state-changing calls.
    pub raw_data: Option<Value>,
}

/// Asynchronous access to the voting contract and the wallet behind it.
///
/// Timeouts and retries are the implementation's business; callers treat
/// every error as "this source is unavailable for now".
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Run the contract's app shader with the given arguments.
    async fn invoke(&self, args: &ContractArgs) -> Result<InvokeResult, ClientError>;

    /// Sign and broadcast the transaction produced by a state-changing invoke.
    async fn process_invoke_data(&self, raw_data: &Value) -> Result<TxId, ClientError>;

    /// The wallet's transaction list as raw JSON.
    async fn transactions(&self) -> Result<Value, ClientError>;
}

#[async_trait]
impl<T: ContractClient + ?Sized> ContractClient for std::sync::Arc<T> {
    async fn invoke(&self, args: &ContractArgs) -> Result<InvokeResult, ClientError> {
        (**self).invoke(args).await
    }

    async fn process_invoke_data(&self, raw_data: &Value) -> Result<TxId, ClientError> {
        (**self).process_invoke_data(raw_data).await
    }

    async fn transactions(&self) -> Result<Value, ClientError> {
        (**self).transactions().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_render_in_insertion_order() {
        let args = ContractArgs::new("user", "vote")
            .arg("vote_1", 1)
            .arg("vote_2", 255)
            .arg("cid", "abc");
        assert_eq!(
            args.to_string(),
            "role=user,action=vote,vote_1=1,vote_2=255,cid=abc"
        );
        assert_eq!(args.action(), "vote");
        assert_eq!(args.get("vote_2"), Some("255"));
        assert_eq!(args.get("missing"), None);
    }
}
