//! txgate - sequence-coordinated transaction submission
//!
//! Client library for issuing signed exchange transactions (orders,
//! cancellations, transfers, brokerage configuration) against a remote
//! ledger network. Each submission is coordinated through a per-account
//! sequence cache and a bounded retry loop that recovers from the
//! ledger's sequence-conflict rejections.

pub mod config;
pub mod engine;
pub mod errors;
pub mod exchange;
pub mod ledger;
pub mod rpc;
pub mod sequence_cache;
pub mod signing;
pub mod tx;

// Re-export commonly used types
pub use config::{Config, LedgerConfig};
pub use engine::SubmissionEngine;
pub use errors::{ExchangeError, ExchangeResult};
pub use exchange::{BrokerageParams, CreateOrderParams, Exchange, TransferParams};
pub use ledger::{LedgerRpc, SubmitReply, TxOp};
pub use rpc::HttpLedgerClient;
pub use sequence_cache::SequenceCache;
pub use signing::{LocalSigner, TxSigner};
pub use tx::{Amount, Memo, OrderSide, UnsignedTx, DEFAULT_ISSUER};
