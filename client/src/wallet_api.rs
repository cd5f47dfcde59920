//! HTTP JSON-RPC client for a wallet API service.

use async_trait::async_trait;
use ballot_types::TxId;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::{ClientError, ContractArgs, ContractClient, InvokeResult};

/// JSON-RPC 2.0 client for a wallet API endpoint (e.g. `http://127.0.0.1:10000/api/wallet`).
///
/// Wraps `reqwest::Client` with the endpoint URL and the contract shader the
/// wallet should run for `invoke_contract`.
pub struct WalletApiClient {
    http: reqwest::Client,
    url: String,
    contract_file: Option<String>,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl WalletApiClient {
    pub fn new(url: impl Into<String>, contract_file: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            contract_file,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a JSON-RPC request and return its `result`.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("{method} request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "wallet API returned HTTP {}",
                response.status()
            )));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("invalid JSON response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(ClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        parsed.result.ok_or_else(|| ClientError::MissingField {
            action: method.to_string(),
            field: "result".to_string(),
        })
    }
}

/// The shader output arrives as a JSON document embedded in a string.
fn parse_output(result: &Value) -> Result<Value, ClientError> {
    match result.get("output") {
        Some(Value::String(text)) => {
            serde_json::from_str(text).map_err(|e| ClientError::Decode {
                action: "invoke_contract".to_string(),
                reason: format!("shader output is not JSON: {e}"),
            })
        }
        Some(other) => Ok(other.clone()),
        None => Ok(Value::Object(Default::default())),
    }
}

#[async_trait]
impl ContractClient for WalletApiClient {
    async fn invoke(&self, args: &ContractArgs) -> Result<InvokeResult, ClientError> {
        let mut params = json!({
            "args": args.to_string(),
            "create_tx": false,
        });
        if let Some(file) = &self.contract_file {
            params["contract_file"] = json!(file);
        }
        let result = self.rpc_call("invoke_contract", params).await?;
        let output = parse_output(&result)?;
        let raw_data = result.get("raw_data").filter(|v| !v.is_null()).cloned();
        Ok(InvokeResult { output, raw_data })
    }

    async fn process_invoke_data(&self, raw_data: &Value) -> Result<TxId, ClientError> {
        let result = self
            .rpc_call("process_invoke_data", json!({ "data": raw_data }))
            .await?;
        result
            .get("txid")
            .and_then(Value::as_str)
            .map(TxId::new)
            .ok_or_else(|| ClientError::MissingField {
                action: "process_invoke_data".to_string(),
                field: "txid".to_string(),
            })
    }

    async fn transactions(&self) -> Result<Value, ClientError> {
        self.rpc_call("tx_list", json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_string_is_parsed() {
        let result = json!({ "output": "{\"res\":{\"stake_active\":5}}" });
        let output = parse_output(&result).unwrap();
        assert_eq!(output["res"]["stake_active"], 5);
    }

    #[test]
    fn garbage_output_is_a_decode_error() {
        let result = json!({ "output": "not json" });
        assert!(matches!(
            parse_output(&result),
            Err(ClientError::Decode { .. })
        ));
    }

    #[test]
    fn absent_output_is_empty_object() {
        assert_eq!(parse_output(&json!({})).unwrap(), json!({}));
    }
}
