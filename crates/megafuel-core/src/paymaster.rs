//! Typed client for the public paymaster API.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U64};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::amount::BigAmount;
use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::ClientError;
use crate::router::Router;
use crate::rpc::{Dialer, HttpDialer};
use crate::types::{
    BlockId, Bundle, IsSponsorableResponse, SponsorTx, TransactionArgs, TransactionResponse,
    TxHash,
};

/// Client for the paymaster ("user") API.
///
/// Cloning is cheap; clones share the same endpoints. Endpoints are closed
/// when [`close`](Self::close) is called or the last clone is dropped.
#[derive(Clone)]
pub struct PaymasterClient {
    router: Arc<Router>,
}

impl PaymasterClient {
    /// Dial the endpoints named in `config` over HTTP.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let dialer = HttpDialer::new(config.transport.clone());
        Self::connect_with(&dialer, config).await
    }

    /// Dial a single private-paymaster endpoint with a fixed policy.
    ///
    /// `url` is typically `https://open-platform-ap.nodereal.io/{apikey}/megafuel`.
    pub async fn connect_private(
        url: &str,
        policy_uuid: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::connect(&ClientConfig::new(url).with_private_policy(policy_uuid)).await
    }

    pub async fn connect_with(
        dialer: &dyn Dialer,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let router = Router::connect(
            dialer,
            &config.user_url,
            config.sponsor_url.as_deref(),
            config.private_policy.clone(),
        )
        .await?;
        Ok(Self::from_router(router))
    }

    pub fn from_router(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    pub(crate) fn router(&self) -> &Router {
        &self.router
    }

    /// Close every endpoint. Calls made afterwards fail with `EndpointClosed`.
    pub fn close(&self) {
        self.router.close();
    }

    async fn request<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        method: &'static str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let raw = self.router.call(ctx, method, params).await?;
        decode_result(method, raw)
    }

    /// `eth_chainId`
    pub async fn chain_id(&self, ctx: &CallContext) -> Result<BigAmount, ClientError> {
        self.request(ctx, "eth_chainId", Vec::new()).await
    }

    /// `pm_isSponsorable`
    pub async fn is_sponsorable(
        &self,
        ctx: &CallContext,
        tx: &TransactionArgs,
    ) -> Result<IsSponsorableResponse, ClientError> {
        self.request(ctx, "pm_isSponsorable", vec![json!(tx)]).await
    }

    /// `eth_sendRawTransaction`: submit a signed transaction for sponsored relay.
    pub async fn send_raw_transaction(
        &self,
        ctx: &CallContext,
        raw_tx: &Bytes,
    ) -> Result<TxHash, ClientError> {
        self.request(ctx, "eth_sendRawTransaction", vec![json!(raw_tx)])
            .await
    }

    /// `eth_getGaslessTransactionByHash`. `None` when the service does not
    /// know the hash.
    pub async fn get_gasless_transaction_by_hash(
        &self,
        ctx: &CallContext,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionResponse>, ClientError> {
        self.request(ctx, "eth_getGaslessTransactionByHash", vec![json!(tx_hash)])
            .await
    }

    /// `pm_getSponsorTxByTxHash`
    pub async fn get_sponsor_tx_by_tx_hash(
        &self,
        ctx: &CallContext,
        tx_hash: TxHash,
    ) -> Result<Option<SponsorTx>, ClientError> {
        self.request(ctx, "pm_getSponsorTxByTxHash", vec![json!(tx_hash)])
            .await
    }

    /// `pm_getSponsorTxByBundleUuid`
    pub async fn get_sponsor_tx_by_bundle_uuid(
        &self,
        ctx: &CallContext,
        bundle_uuid: Uuid,
    ) -> Result<Option<SponsorTx>, ClientError> {
        self.request(ctx, "pm_getSponsorTxByBundleUuid", vec![json!(bundle_uuid)])
            .await
    }

    /// `pm_getBundleByUuid`
    pub async fn get_bundle_by_uuid(
        &self,
        ctx: &CallContext,
        bundle_uuid: Uuid,
    ) -> Result<Option<Bundle>, ClientError> {
        self.request(ctx, "pm_getBundleByUuid", vec![json!(bundle_uuid)])
            .await
    }

    /// `eth_getTransactionCount`: the nonce of `address` at `block`.
    pub async fn get_transaction_count(
        &self,
        ctx: &CallContext,
        address: Address,
        block: BlockId,
    ) -> Result<u64, ClientError> {
        let count: U64 = self
            .request(
                ctx,
                "eth_getTransactionCount",
                vec![json!(address), json!(block)],
            )
            .await?;
        Ok(count.to::<u64>())
    }
}

pub(crate) fn decode_result<T: DeserializeOwned>(
    method: &'static str,
    raw: serde_json::Value,
) -> Result<T, ClientError> {
    serde_json::from_value(raw).map_err(|e| ClientError::InvalidResult {
        method,
        reason: e.to_string(),
    })
}
