//! Ledger RPC boundary
//!
//! `LedgerRpc` is the narrow interface the submission pipeline consumes:
//! one sequence query plus one submit method per transaction type. The
//! production implementation is [`crate::rpc::HttpLedgerClient`]; tests
//! substitute scripted implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ExchangeResult;

/// Engine result code for an accepted transaction.
pub const ENGINE_SUCCESS: &str = "tesSUCCESS";

/// Engine result code: submitted sequence is ahead of the account's
/// current sequence.
pub const ENGINE_PRE_SEQ: &str = "terPRE_SEQ";

/// Engine result code: submitted sequence has already been consumed.
pub const ENGINE_PAST_SEQ: &str = "tefPAST_SEQ";

/// Whether an engine result code is one of the two sequence-conflict
/// codes the retry loop recovers from. Any other non-success code is
/// fatal, even if it might be transient in principle.
pub fn is_sequence_conflict(code: &str) -> bool {
    code == ENGINE_PRE_SEQ || code == ENGINE_PAST_SEQ
}

/// Operation selector used by the engine to dispatch a signed blob to
/// the matching submit method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOp {
    CreateOrder,
    CancelOrder,
    Transfer,
    SetBrokerage,
}

impl TxOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxOp::CreateOrder => "create_order",
            TxOp::CancelOrder => "cancel_order",
            TxOp::Transfer => "transfer",
            TxOp::SetBrokerage => "set_brokerage",
        }
    }
}

/// Structured outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReply {
    /// Ledger engine result code (e.g. `tesSUCCESS`, `tefPAST_SEQ`)
    pub engine_result: String,

    /// Transaction hash, present on success
    pub hash: Option<String>,

    /// Human-readable engine message, used for fatal error reporting
    pub message: Option<String>,
}

impl SubmitReply {
    pub fn success(hash: &str) -> Self {
        Self {
            engine_result: ENGINE_SUCCESS.to_string(),
            hash: Some(hash.to_string()),
            message: None,
        }
    }

    pub fn failure(code: &str, message: &str) -> Self {
        Self {
            engine_result: code.to_string(),
            hash: None,
            message: Some(message.to_string()),
        }
    }
}

/// Remote ledger client interface.
///
/// Every method is a suspension point; implementations must be safe to
/// share across concurrent submissions.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Current sequence number for `account` as reported by the ledger.
    async fn get_sequence(&self, account: &str) -> ExchangeResult<u64>;

    /// Submit a signed order-creation blob.
    async fn create_order(&self, blob: &str) -> ExchangeResult<SubmitReply>;

    /// Submit a signed order-cancellation blob.
    async fn cancel_order(&self, blob: &str) -> ExchangeResult<SubmitReply>;

    /// Submit a signed token-transfer blob.
    async fn transfer(&self, blob: &str) -> ExchangeResult<SubmitReply>;

    /// Submit a signed brokerage-configuration blob.
    async fn set_brokerage(&self, blob: &str) -> ExchangeResult<SubmitReply>;

    /// Dispatch a signed blob through the submit method selected by `op`.
    async fn submit_op(&self, op: TxOp, blob: &str) -> ExchangeResult<SubmitReply> {
        match op {
            TxOp::CreateOrder => self.create_order(blob).await,
            TxOp::CancelOrder => self.cancel_order(blob).await,
            TxOp::Transfer => self.transfer(blob).await,
            TxOp::SetBrokerage => self.set_brokerage(blob).await,
        }
    }
}
