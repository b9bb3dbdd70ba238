//! Public exchange client
//!
//! `Exchange` ties the pieces together: one HTTP ledger client, one
//! signer, one sequence cache, and one submission engine per instance.
//! Construction takes an explicit `Config`, so independently-configured
//! instances can coexist and tests can build isolated ones.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::engine::SubmissionEngine;
use crate::errors::ExchangeResult;
use crate::ledger::{LedgerRpc, TxOp};
use crate::rpc::HttpLedgerClient;
use crate::sequence_cache::SequenceCache;
use crate::signing::{LocalSigner, TxSigner};
use crate::tx::{
    build_brokerage, build_cancel_order, build_create_order, build_payment, Memo, OrderSide,
};

/// Parameters for placing an order.
#[derive(Debug, Clone)]
pub struct CreateOrderParams {
    /// Wallet address placing the order
    pub address: String,
    /// Wallet secret
    pub secret: String,
    /// Amount of the base token
    pub amount: String,
    /// Base token name (in a jjcc-swt pair, "jjcc")
    pub base: String,
    /// Counter token name (in a jjcc-swt pair, "swt")
    pub counter: String,
    /// Amount multiplied by price, in the counter token
    pub sum: String,
    pub side: OrderSide,
    /// Platform address credited with brokerage
    pub platform: String,
    /// Token issuer; the well-known default when omitted
    pub issuer: Option<String>,
}

/// Parameters for a token transfer.
#[derive(Debug, Clone)]
pub struct TransferParams {
    pub address: String,
    pub secret: String,
    pub amount: String,
    pub memo: Memo,
    /// Destination wallet address
    pub to: String,
    pub token: String,
    pub issuer: Option<String>,
}

/// Parameters for configuring a platform's brokerage fee.
#[derive(Debug, Clone)]
pub struct BrokerageParams {
    pub platform_account: String,
    pub platform_secret: String,
    /// Account collecting the fee on the platform's behalf
    pub fee_account: String,
    pub rate_num: u64,
    pub rate_den: u64,
    pub token: String,
    pub issuer: Option<String>,
}

/// Exchange client for one ledger network.
pub struct Exchange {
    client: Arc<dyn LedgerRpc>,
    engine: SubmissionEngine,
}

impl Exchange {
    /// Build a client from configuration, using the HTTP transport and
    /// the local signer.
    pub fn new(config: &Config) -> ExchangeResult<Self> {
        let client: Arc<dyn LedgerRpc> = Arc::new(HttpLedgerClient::new(config)?);
        Ok(Self::with_parts(
            client,
            Arc::new(LocalSigner::new()),
            config.ledger.retry,
        ))
    }

    /// Build a client from explicit collaborators. Used by tests and by
    /// embedders bringing their own transport or signer.
    pub fn with_parts(client: Arc<dyn LedgerRpc>, signer: Arc<dyn TxSigner>, retry: u32) -> Self {
        let cache = Arc::new(SequenceCache::new(client.clone()));
        let engine = SubmissionEngine::new(client.clone(), signer, cache, retry);
        Self { client, engine }
    }

    /// Current sequence number for `address` as reported by the ledger.
    /// Always queries the network; the cache is engine-internal.
    pub async fn get_sequence(&self, address: &str) -> ExchangeResult<u64> {
        self.client.get_sequence(address).await
    }

    /// Place an order; resolves to the transaction hash.
    pub async fn create_order(&self, params: CreateOrderParams) -> ExchangeResult<String> {
        let tx = build_create_order(
            &params.address,
            &params.amount,
            &params.base,
            &params.counter,
            &params.sum,
            params.side,
            &params.platform,
            params.issuer.as_deref(),
        );
        debug!(account = %params.address, base = %params.base, counter = %params.counter, "submitting order");
        self.engine
            .submit(&params.secret, &tx, TxOp::CreateOrder)
            .await
    }

    /// Cancel a previously placed order by its offer sequence.
    pub async fn cancel_order(
        &self,
        address: &str,
        secret: &str,
        offer_sequence: u64,
    ) -> ExchangeResult<String> {
        let tx = build_cancel_order(address, offer_sequence);
        debug!(account = %address, offer_sequence, "submitting order cancellation");
        self.engine.submit(secret, &tx, TxOp::CancelOrder).await
    }

    /// Transfer tokens to another wallet.
    pub async fn transfer(&self, params: TransferParams) -> ExchangeResult<String> {
        let tx = build_payment(
            &params.address,
            &params.amount,
            &params.to,
            &params.token,
            &params.memo,
            params.issuer.as_deref(),
        );
        debug!(account = %params.address, to = %params.to, token = %params.token, "submitting transfer");
        self.engine.submit(&params.secret, &tx, TxOp::Transfer).await
    }

    /// Configure the brokerage fee collected for a platform account.
    pub async fn set_brokerage(&self, params: BrokerageParams) -> ExchangeResult<String> {
        let tx = build_brokerage(
            &params.platform_account,
            &params.fee_account,
            params.rate_num,
            params.rate_den,
            &params.token,
            params.issuer.as_deref(),
        );
        debug!(
            account = %params.platform_account,
            fee_account = %params.fee_account,
            "submitting brokerage configuration"
        );
        self.engine
            .submit(&params.platform_secret, &tx, TxOp::SetBrokerage)
            .await
    }

    /// Clear all cached sequence state. Dropping the instance releases
    /// the transport.
    pub fn destroy(&self) {
        self.engine.cache().destroy();
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &Arc<SequenceCache> {
        self.engine.cache()
    }
}
