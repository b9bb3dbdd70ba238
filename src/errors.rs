use thiserror::Error;

/// Errors surfaced by the submission pipeline.
///
/// Only sequence conflicts are retryable, and those are normally consumed
/// by the engine's retry loop before a caller ever sees them. Everything
/// surfaced from a public operation is terminal for that call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExchangeError {
    /// Transport failure talking to a ledger node
    #[error("RPC error: {message} (endpoint: {endpoint:?})")]
    Rpc {
        endpoint: Option<String>,
        message: String,
    },

    /// Ledger rejected the transaction with a non-conflict code
    #[error("Ledger rejected transaction ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Sequence-conflict retry budget exhausted
    #[error("Retry budget exhausted after {attempts} attempts ({code}): {message}")]
    RetryExhausted {
        code: String,
        message: String,
        attempts: u32,
    },

    /// Signing error
    #[error("Signing error: {0}")]
    Signing(String),

    /// Ledger reply was missing required fields
    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ExchangeError {
    /// Whether the underlying cause was a sequence conflict the ledger
    /// may accept on a later attempt. Exposed for callers wrapping the
    /// engine; the engine itself drives retries off the reply code, not
    /// off errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExchangeError::RetryExhausted { .. } => true,

            ExchangeError::Rpc { .. } => false,
            ExchangeError::Rejected { .. } => false,
            ExchangeError::Signing(_) => false,
            ExchangeError::MalformedResponse(_) => false,
            ExchangeError::Configuration(_) => false,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::Rpc {
            endpoint: err.url().map(|u| u.to_string()),
            message: err.to_string(),
        }
    }
}

/// Result type for exchange operations
pub type ExchangeResult<T> = Result<T, ExchangeError>;
