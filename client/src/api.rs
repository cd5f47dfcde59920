//! Typed voting-contract calls.
//!
//! Each method issues one contract invocation and pulls the interesting field
//! out of the shader output. Shapes follow the contract's manager and user
//! roles:
//!
//! | call            | role    | action          | field    |
//! |-----------------|---------|-----------------|----------|
//! | `view_params`   | manager | `view_params`   | `params` |
//! | `view_totals`   | manager | `view_totals`   | `res`    |
//! | `view_proposals`| manager | `view_proposals`| `res`    |
//! | `user_view`     | user    | `view`          | `res`    |
//! | `view_votes`    | user    | `view_votes`    | `res`    |
//!
//! `submit_votes` and `move_funds` create transactions: the invoke result's
//! `raw_data` is handed back to the wallet to be signed and sent.

use ballot_types::{
    Amount, HistoricalVote, ProposalId, ProposalRecord, Totals, TransactionRecord, TxId, UserView,
    ViewParams,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ClientError, ContractArgs, ContractClient, InvokeResult};

/// Typed facade over a [`ContractClient`] bound to one contract id.
pub struct GovernanceApi<C> {
    client: C,
    cid: String,
}

impl<C: ContractClient> GovernanceApi<C> {
    pub fn new(client: C, cid: impl Into<String>) -> Self {
        Self {
            client,
            cid: cid.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn contract_id(&self) -> &str {
        &self.cid
    }

    fn args(&self, role: &str, action: &str) -> ContractArgs {
        ContractArgs::new(role, action)
    }

    /// Invoke with the contract id appended, turning a shader `error` into
    /// [`ClientError::Contract`].
    async fn invoke(&self, args: ContractArgs) -> Result<InvokeResult, ClientError> {
        let args = args.arg("cid", &self.cid);
        tracing::debug!(action = args.action(), "invoking contract");
        let result = self.client.invoke(&args).await?;
        if let Some(message) = result.output.get("error").and_then(Value::as_str) {
            return Err(ClientError::Contract {
                action: args.action().to_string(),
                message: message.to_string(),
            });
        }
        Ok(result)
    }

    async fn call(&self, args: ContractArgs) -> Result<Value, ClientError> {
        Ok(self.invoke(args).await?.output)
    }

    pub async fn view_params(&self) -> Result<ViewParams, ClientError> {
        let output = self.call(self.args("manager", "view_params")).await?;
        required(&output, "view_params", "params")
    }

    pub async fn view_totals(&self) -> Result<Totals, ClientError> {
        let output = self.call(self.args("manager", "view_totals")).await?;
        required(&output, "view_totals", "res")
    }

    /// Every proposal the contract knows about, in enumeration order.
    pub async fn view_proposals(&self) -> Result<Vec<ProposalRecord>, ClientError> {
        let output = self.call(self.args("manager", "view_proposals")).await?;
        optional(&output, "view_proposals", "res")
    }

    pub async fn user_view(&self) -> Result<UserView, ClientError> {
        let output = self.call(self.args("user", "view")).await?;
        optional(&output, "view", "res")
    }

    /// The caller's votes in past epochs.
    pub async fn view_votes(&self) -> Result<Vec<HistoricalVote>, ClientError> {
        let output = self.call(self.args("user", "view_votes")).await?;
        optional(&output, "view_votes", "res")
    }

    pub async fn transactions(&self) -> Result<Vec<TransactionRecord>, ClientError> {
        let raw = self.client.transactions().await?;
        decode(raw, "tx_list")
    }

    /// Submit the caller's full current-epoch vote vector.
    ///
    /// `votes[i]` is the raw vote for slot `i`; the contract numbers its
    /// arguments from 1.
    pub async fn submit_votes(
        &self,
        votes: &[u8],
        proposal: ProposalId,
    ) -> Result<TxId, ClientError> {
        let mut args = self.args("user", "vote");
        for (i, vote) in votes.iter().enumerate() {
            args = args.arg(format!("vote_{}", i + 1), vote);
        }
        tracing::debug!(%proposal, slots = votes.len(), "submitting vote vector");
        let tx_id = self.transact(args).await?;
        tracing::info!(%proposal, %tx_id, "vote transaction created");
        Ok(tx_id)
    }

    /// Move stake between passive and active. `lock` moves `amount` into
    /// active stake, which is what gives votes their weight; otherwise it
    /// is released back to passive.
    pub async fn move_funds(&self, amount: Amount, lock: bool) -> Result<TxId, ClientError> {
        let args = self
            .args("user", "move_funds")
            .arg("amount", amount.raw())
            .arg("bLock", u8::from(lock));
        let tx_id = self.transact(args).await?;
        tracing::info!(amount = amount.raw(), lock, %tx_id, "stake transaction created");
        Ok(tx_id)
    }

    /// Invoke, then have the wallet turn the returned `raw_data` into a
    /// transaction.
    async fn transact(&self, args: ContractArgs) -> Result<TxId, ClientError> {
        let action = args.action().to_string();
        let result = self.invoke(args).await?;
        let raw_data = result.raw_data.ok_or(ClientError::MissingField {
            action,
            field: "raw_data".to_string(),
        })?;
        self.client.process_invoke_data(&raw_data).await
    }
}

fn decode<T: DeserializeOwned>(value: Value, action: &str) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode {
        action: action.to_string(),
        reason: e.to_string(),
    })
}

fn required<T: DeserializeOwned>(
    output: &Value,
    action: &str,
    field: &str,
) -> Result<T, ClientError> {
    let value = output.get(field).ok_or_else(|| ClientError::MissingField {
        action: action.to_string(),
        field: field.to_string(),
    })?;
    decode(value.clone(), action)
}

/// Like [`required`], but an absent field reads as the type's default.
fn optional<T: DeserializeOwned + Default>(
    output: &Value,
    action: &str,
    field: &str,
) -> Result<T, ClientError> {
    match output.get(field) {
        Some(Value::Null) | None => Ok(T::default()),
        Some(value) => decode(value.clone(), action),
    }
}
