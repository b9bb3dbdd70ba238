//! Submission engine
//!
//! The bounded retry loop at the heart of the client: obtain a sequence
//! number, sign, submit, classify the reply, and retry on sequence
//! conflict until the budget is spent. Every attempt works on its own
//! clone of the caller's template, and every non-success path resets the
//! account's cache entry before the loop continues or the error
//! propagates.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{ExchangeError, ExchangeResult};
use crate::ledger::{is_sequence_conflict, LedgerRpc, SubmitReply, TxOp, ENGINE_SUCCESS};
use crate::sequence_cache::SequenceCache;
use crate::signing::TxSigner;
use crate::tx::UnsignedTx;

/// Tri-state classification of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Disposition {
    /// Accepted by the ledger; carries the transaction hash.
    Accepted(String),
    /// Sequence conflict; retryable after a cache reset.
    Conflict(String),
    /// Any other rejection; terminal.
    Fatal { code: String, message: String },
}

fn classify(reply: &SubmitReply) -> ExchangeResult<Disposition> {
    let message = reply.message.clone().unwrap_or_default();
    if reply.engine_result == ENGINE_SUCCESS {
        let hash = reply.hash.clone().ok_or_else(|| {
            ExchangeError::MalformedResponse("success reply missing transaction hash".to_string())
        })?;
        Ok(Disposition::Accepted(hash))
    } else if is_sequence_conflict(&reply.engine_result) {
        Ok(Disposition::Conflict(message))
    } else {
        Ok(Disposition::Fatal {
            code: reply.engine_result.clone(),
            message,
        })
    }
}

/// Orchestrates one logical operation against the ledger.
pub struct SubmissionEngine {
    client: Arc<dyn LedgerRpc>,
    signer: Arc<dyn TxSigner>,
    cache: Arc<SequenceCache>,
    retry: u32,
}

impl SubmissionEngine {
    pub fn new(
        client: Arc<dyn LedgerRpc>,
        signer: Arc<dyn TxSigner>,
        cache: Arc<SequenceCache>,
        retry: u32,
    ) -> Self {
        Self {
            client,
            signer,
            cache,
            retry,
        }
    }

    pub fn cache(&self) -> &Arc<SequenceCache> {
        &self.cache
    }

    /// Submit `template` as operation `op`, retrying sequence conflicts.
    ///
    /// Budget semantics: `retry = N` allows N retries after the initial
    /// attempt, so at most N+1 attempts. The loop is attempt-bounded
    /// only; callers needing a deadline impose one around this call.
    pub async fn submit(
        &self,
        secret: &str,
        template: &UnsignedTx,
        op: TxOp,
    ) -> ExchangeResult<String> {
        let account = template.account.clone();
        let mut budget = i64::from(self.retry);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            // Fresh clone per attempt so the sequence write never leaks
            // into the caller's template or a prior attempt's record.
            let mut tx = template.clone();
            let sequence = match self.cache.get(&account).await {
                Ok(sequence) => sequence,
                Err(e) => {
                    self.cache.reset(&account);
                    return Err(e);
                }
            };
            tx.sequence = Some(sequence);

            let blob = match self.signer.sign(&tx, secret).await {
                Ok(blob) => blob,
                Err(e) => {
                    self.cache.reset(&account);
                    return Err(e);
                }
            };

            // Ledger-side outcome of a failed transport call is unknown,
            // so the cached sequence cannot be trusted afterwards.
            let reply = match self.client.submit_op(op, &blob).await {
                Ok(reply) => reply,
                Err(e) => {
                    self.cache.reset(&account);
                    return Err(e);
                }
            };

            match classify(&reply) {
                Ok(Disposition::Accepted(hash)) => {
                    self.cache.rise(&account);
                    debug!(
                        account = %account,
                        op = op.as_str(),
                        sequence,
                        attempt,
                        hash = %hash,
                        "transaction accepted"
                    );
                    return Ok(hash);
                }
                Ok(Disposition::Conflict(message)) => {
                    self.cache.reset(&account);
                    budget -= 1;
                    if budget < 0 {
                        warn!(
                            account = %account,
                            op = op.as_str(),
                            attempts = attempt,
                            engine_result = %reply.engine_result,
                            "sequence-conflict retry budget exhausted"
                        );
                        return Err(ExchangeError::RetryExhausted {
                            code: reply.engine_result,
                            message,
                            attempts: attempt,
                        });
                    }
                    debug!(
                        account = %account,
                        op = op.as_str(),
                        sequence,
                        attempt,
                        engine_result = %reply.engine_result,
                        "sequence conflict, re-querying and retrying"
                    );
                }
                Ok(Disposition::Fatal { code, message }) => {
                    self.cache.reset(&account);
                    warn!(
                        account = %account,
                        op = op.as_str(),
                        sequence,
                        engine_result = %code,
                        "ledger rejected transaction"
                    );
                    return Err(ExchangeError::Rejected { code, message });
                }
                Err(e) => {
                    self.cache.reset(&account);
                    return Err(e);
                }
            }
        }
    }
}
