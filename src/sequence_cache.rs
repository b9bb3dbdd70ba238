//! Per-account sequence number cache
//!
//! Caches the next sequence number to use per account so the common case
//! submits without a network round-trip. The cache is an optimization,
//! not a correctness mechanism: two concurrent submissions for the same
//! account may read the same value, and the ledger's conflict rejection
//! plus the engine's retry loop corrects that. Every non-success path
//! resets the affected entry so a stale value is never perpetuated.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::errors::ExchangeResult;
use crate::ledger::LedgerRpc;

/// Process-local cache of next-sequence values, keyed by account.
///
/// Owns all cached sequence state; nothing else in the pipeline reads or
/// writes sequence numbers directly.
pub struct SequenceCache {
    client: Arc<dyn LedgerRpc>,
    entries: DashMap<String, u64>,
}

impl SequenceCache {
    pub fn new(client: Arc<dyn LedgerRpc>) -> Self {
        Self {
            client,
            entries: DashMap::new(),
        }
    }

    /// Cached next-sequence value for `account`, fetching from the
    /// ledger on a miss. Two racing callers may both miss and fetch;
    /// whichever insert lands first wins and both observe that value.
    pub async fn get(&self, account: &str) -> ExchangeResult<u64> {
        if let Some(entry) = self.entries.get(account) {
            return Ok(*entry);
        }

        let fetched = self.client.get_sequence(account).await?;
        let value = *self.entries.entry(account.to_string()).or_insert(fetched);
        debug!(account = %account, sequence = value, "fetched sequence from ledger");
        Ok(value)
    }

    /// Advance the cached value after a confirmed success. No-op when
    /// the entry has been reset in the meantime.
    pub fn rise(&self, account: &str) {
        if let Some(mut entry) = self.entries.get_mut(account) {
            *entry += 1;
        }
    }

    /// Drop the cached value, forcing a fresh ledger query on next use.
    pub fn reset(&self, account: &str) {
        if self.entries.remove(account).is_some() {
            debug!(account = %account, "sequence cache reset");
        }
    }

    /// Clear all cached state.
    pub fn destroy(&self) {
        self.entries.clear();
    }

    /// Current cached value, if any. Test and diagnostic helper; the
    /// engine only uses `get`.
    pub fn peek(&self, account: &str) -> Option<u64> {
        self.entries.get(account).map(|entry| *entry)
    }
}
