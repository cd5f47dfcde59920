//! Nullable contract: scripted voting-contract responses and a fake wallet
//! transaction list.

use async_trait::async_trait;
use ballot_client::{ClientError, ContractArgs, ContractClient, InvokeResult};
use ballot_types::{TxId, TxStatus};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Pseudo-action name used to fail or delay [`ContractClient::transactions`].
pub const TX_LIST: &str = "tx_list";
/// Pseudo-action name used to fail [`ContractClient::process_invoke_data`].
pub const PROCESS_INVOKE_DATA: &str = "process_invoke_data";

/// A test contract that answers from scripted outputs.
///
/// Outputs are keyed by the `action` argument. Unscripted actions answer
/// with an empty object. Every `vote` and `move_funds` invocation produces
/// raw transaction data; processing it mints a new tx id and adds it to the transaction list
/// as in progress.
pub struct NullContract {
    outputs: Mutex<HashMap<String, Value>>,
    transactions: Mutex<Vec<Value>>,
    invocations: Mutex<Vec<ContractArgs>>,
    failing: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    next_tx: AtomicU64,
}

impl NullContract {
    pub fn new() -> Self {
        Self {
            outputs: Mutex::new(HashMap::new()),
            transactions: Mutex::new(Vec::new()),
            invocations: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            delays: Mutex::new(HashMap::new()),
            next_tx: AtomicU64::new(1),
        }
    }

    /// Script the output of one action.
    pub fn set_output(&self, action: &str, output: Value) {
        self.outputs
            .lock()
            .unwrap()
            .insert(action.to_string(), output);
    }

    pub fn set_current_epoch(&self, epoch: u32) {
        self.set_output(
            "view_params",
            json!({ "params": { "current": { "iEpoch": epoch } } }),
        );
    }

    pub fn set_totals(&self, stake_active: u64, stake_passive: u64) {
        self.set_output(
            "view_totals",
            json!({ "res": { "stake_active": stake_active, "stake_passive": stake_passive } }),
        );
    }

    /// Script `view_proposals` from a JSON array of proposal records.
    pub fn set_proposals(&self, proposals: Value) {
        self.set_output("view_proposals", json!({ "res": proposals }));
    }

    /// Script the caller's stake and current-epoch vote vector.
    pub fn set_user(&self, stake_active: u64, current_votes: Option<Vec<u8>>) {
        let mut res = json!({ "stake_active": stake_active, "stake_passive": 0 });
        if let Some(votes) = current_votes {
            res["current_votes"] = json!(votes);
        }
        self.set_output("view", json!({ "res": res }));
    }

    /// Script the caller's historical votes.
    pub fn set_history(&self, votes: Value) {
        self.set_output("view_votes", json!({ "res": votes }));
    }

    /// Add or update a wallet transaction.
    pub fn set_transaction(&self, txid: &str, status: TxStatus) {
        let mut txs = self.transactions.lock().unwrap();
        txs.retain(|tx| tx.get("txId").and_then(Value::as_str) != Some(txid));
        txs.push(json!({ "txId": txid, "status": status.code() }));
    }

    pub fn clear_transactions(&self) {
        self.transactions.lock().unwrap().clear();
    }

    /// Make an action (or [`TX_LIST`], [`PROCESS_INVOKE_DATA`]) fail until
    /// [`recover`](Self::recover) is called.
    pub fn fail(&self, action: &str) {
        self.failing.lock().unwrap().insert(action.to_string());
    }

    pub fn recover(&self, action: &str) {
        self.failing.lock().unwrap().remove(action);
    }

    /// Delay the next answer to an action.
    pub fn delay_once(&self, action: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(action.to_string(), delay);
    }

    /// All invocations so far, in order.
    pub fn invocations(&self) -> Vec<ContractArgs> {
        self.invocations.lock().unwrap().clone()
    }

    /// The raw vote vectors of every `vote` invocation so far.
    pub fn submitted_votes(&self) -> Vec<Vec<u8>> {
        self.invocations()
            .iter()
            .filter(|args| args.action() == "vote")
            .map(|args| {
                (1..)
                    .map_while(|i| args.get(&format!("vote_{i}")))
                    .filter_map(|v| v.parse().ok())
                    .collect::<Vec<u8>>()
            })
            .collect()
    }

    async fn enter(&self, action: &str) -> Result<(), ClientError> {
        let delay = self.delays.lock().unwrap().remove(action);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(action) {
            return Err(ClientError::Transport(format!(
                "null contract: {action} unavailable"
            )));
        }
        Ok(())
    }
}

impl Default for NullContract {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractClient for NullContract {
    async fn invoke(&self, args: &ContractArgs) -> Result<InvokeResult, ClientError> {
        let action = args.action().to_string();
        self.invocations.lock().unwrap().push(args.clone());
        self.enter(&action).await?;
        let output = self
            .outputs
            .lock()
            .unwrap()
            .get(&action)
            .cloned()
            .unwrap_or_else(|| json!({}));
        let raw_data = matches!(action.as_str(), "vote" | "move_funds")
            .then(|| json!({ "args": args.to_string() }));
        Ok(InvokeResult { output, raw_data })
    }

    async fn process_invoke_data(&self, _raw_data: &Value) -> Result<TxId, ClientError> {
        self.enter(PROCESS_INVOKE_DATA).await?;
        let txid = format!("tx-{}", self.next_tx.fetch_add(1, Ordering::SeqCst));
        self.set_transaction(&txid, TxStatus::IN_PROGRESS);
        Ok(TxId::new(txid))
    }

    async fn transactions(&self) -> Result<Value, ClientError> {
        self.enter(TX_LIST).await?;
        Ok(Value::Array(self.transactions.lock().unwrap().clone()))
    }
}
