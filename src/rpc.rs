//! HTTP ledger client
//!
//! JSON-RPC over HTTP implementation of [`LedgerRpc`]. Requests rotate
//! round-robin over the configured host list; node selection policy
//! beyond that (health scoring, load balancing) is out of scope.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::errors::{ExchangeError, ExchangeResult};
use crate::ledger::{LedgerRpc, SubmitReply};

/// JSON-RPC reply envelope: every call answers under a `result` key.
#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    result: RpcResult,
}

#[derive(Debug, Default, Deserialize)]
struct RpcResult {
    status: Option<String>,
    error_message: Option<String>,
    engine_result: Option<String>,
    engine_result_message: Option<String>,
    tx_json: Option<TxJson>,
    account_data: Option<AccountData>,
}

#[derive(Debug, Deserialize)]
struct TxJson {
    hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    #[serde(rename = "Sequence")]
    sequence: u64,
}

/// HTTP client for a set of equivalent ledger nodes.
pub struct HttpLedgerClient {
    http: reqwest::Client,
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

impl HttpLedgerClient {
    /// Build a client from configuration, assembling one base URL per
    /// configured host.
    pub fn new(config: &Config) -> ExchangeResult<Self> {
        config.validate()?;
        let scheme = if config.ledger.https { "https" } else { "http" };
        let endpoints = config
            .ledger
            .hosts
            .iter()
            .map(|host| format!("{}://{}:{}", scheme, host, config.ledger.port))
            .collect();
        Self::from_base_urls(endpoints, Duration::from_secs(config.ledger.timeout_secs))
    }

    /// Build a client from ready-made base URLs.
    pub fn from_base_urls(endpoints: Vec<String>, timeout: Duration) -> ExchangeResult<Self> {
        if endpoints.is_empty() {
            return Err(ExchangeError::Configuration(
                "at least one ledger endpoint is required".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::Configuration(format!("HTTP client build failed: {}", e)))?;
        Ok(Self {
            http,
            endpoints,
            cursor: AtomicUsize::new(0),
        })
    }

    fn next_endpoint(&self) -> &str {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        &self.endpoints[index]
    }

    async fn call(&self, body: serde_json::Value) -> ExchangeResult<RpcResult> {
        let endpoint = self.next_endpoint();
        debug!(endpoint = %endpoint, method = %body["method"], "ledger RPC request");

        let response = self
            .http
            .post(endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let envelope: RpcEnvelope = response.json().await.map_err(|e| {
            ExchangeError::MalformedResponse(format!("invalid reply body: {}", e))
        })?;
        let result = envelope.result;

        if result.status.as_deref() == Some("error") {
            return Err(ExchangeError::Rpc {
                endpoint: Some(endpoint.to_string()),
                message: result
                    .error_message
                    .unwrap_or_else(|| "ledger reported an unspecified error".to_string()),
            });
        }
        Ok(result)
    }

    async fn submit_blob(&self, blob: &str) -> ExchangeResult<SubmitReply> {
        let result = self
            .call(json!({
                "method": "submit",
                "params": [{ "tx_blob": blob }],
            }))
            .await?;

        let engine_result = result.engine_result.ok_or_else(|| {
            ExchangeError::MalformedResponse("submit reply missing engine_result".to_string())
        })?;
        Ok(SubmitReply {
            engine_result,
            hash: result.tx_json.and_then(|tx| tx.hash),
            message: result.engine_result_message,
        })
    }
}

#[async_trait]
impl LedgerRpc for HttpLedgerClient {
    async fn get_sequence(&self, account: &str) -> ExchangeResult<u64> {
        let result = self
            .call(json!({
                "method": "account_info",
                "params": [{ "account": account }],
            }))
            .await?;

        result
            .account_data
            .map(|data| data.sequence)
            .ok_or_else(|| {
                ExchangeError::MalformedResponse(
                    "account_info reply missing account_data.Sequence".to_string(),
                )
            })
    }

    async fn create_order(&self, blob: &str) -> ExchangeResult<SubmitReply> {
        self.submit_blob(blob).await
    }

    async fn cancel_order(&self, blob: &str) -> ExchangeResult<SubmitReply> {
        self.submit_blob(blob).await
    }

    async fn transfer(&self, blob: &str) -> ExchangeResult<SubmitReply> {
        self.submit_blob(blob).await
    }

    async fn set_brokerage(&self, blob: &str) -> ExchangeResult<SubmitReply> {
        self.submit_blob(blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> HttpLedgerClient {
        HttpLedgerClient::from_base_urls(vec![server.url()], Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_sequence_parses_account_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":{"status":"success","account_data":{"Sequence":1234}}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.get_sequence("jX").await.unwrap(), 1234);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_sequence_rejects_missing_account_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"result":{"status":"success"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.get_sequence("jX").await,
            Err(ExchangeError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_parses_success_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                r#"{"result":{"status":"success","engine_result":"tesSUCCESS","engine_result_message":"The transaction was applied.","tx_json":{"hash":"ABC123"}}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let reply = client.create_order("deadbeef").await.unwrap();
        assert_eq!(reply.engine_result, "tesSUCCESS");
        assert_eq!(reply.hash.as_deref(), Some("ABC123"));
        assert_eq!(reply.message.as_deref(), Some("The transaction was applied."));
    }

    #[tokio::test]
    async fn test_submit_parses_conflict_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                r#"{"result":{"status":"success","engine_result":"tefPAST_SEQ","engine_result_message":"This sequence number has already past."}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let reply = client.transfer("deadbeef").await.unwrap();
        assert_eq!(reply.engine_result, "tefPAST_SEQ");
        assert!(reply.hash.is_none());
    }

    #[tokio::test]
    async fn test_ledger_error_status_becomes_rpc_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"result":{"status":"error","error_message":"Account not found."}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.get_sequence("jMissing").await {
            Err(ExchangeError::Rpc { message, .. }) => {
                assert_eq!(message, "Account not found.")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_failure_becomes_rpc_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.cancel_order("deadbeef").await,
            Err(ExchangeError::Rpc { .. })
        ));
    }

    #[tokio::test]
    async fn test_requests_rotate_over_endpoints() {
        let mut first = mockito::Server::new_async().await;
        let mut second = mockito::Server::new_async().await;
        let body = r#"{"result":{"status":"success","account_data":{"Sequence":1}}}"#;
        let first_mock = first
            .mock("POST", "/")
            .with_status(200)
            .with_body(body)
            .expect(2)
            .create_async()
            .await;
        let second_mock = second
            .mock("POST", "/")
            .with_status(200)
            .with_body(body)
            .expect(2)
            .create_async()
            .await;

        let client = HttpLedgerClient::from_base_urls(
            vec![first.url(), second.url()],
            Duration::from_secs(5),
        )
        .unwrap();
        for _ in 0..4 {
            client.get_sequence("jX").await.unwrap();
        }

        first_mock.assert_async().await;
        second_mock.assert_async().await;
    }

    #[test]
    fn test_endpoint_assembly_from_config() {
        let config = Config::single_host("node1.example.com", 5050, true);
        let client = HttpLedgerClient::new(&config).unwrap();
        assert_eq!(client.endpoints, vec!["https://node1.example.com:5050"]);

        let config = Config::single_host("localhost", 8080, false);
        let client = HttpLedgerClient::new(&config).unwrap();
        assert_eq!(client.endpoints, vec!["http://localhost:8080"]);
    }
}
