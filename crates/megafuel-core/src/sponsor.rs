//! Typed client for the sponsor API.
//!
//! [`SponsorClient`] wraps a [`PaymasterClient`] and forwards every paymaster
//! method to it unchanged, then adds the policy-management methods that only
//! the sponsor endpoint serves.

use alloy_primitives::{Address, Bytes};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::amount::BigAmount;
use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::ClientError;
use crate::paymaster::{decode_result, PaymasterClient};
use crate::rpc::{Dialer, HttpDialer};
use crate::types::{
    BlockId, Bundle, EmptyWhitelistArgs, GetWhitelistArgs, IsSponsorableResponse,
    PolicySpendData, SponsorTx, TransactionArgs, TransactionResponse, TxHash, UserSpendData,
    WhitelistArgs,
};

#[derive(Clone)]
pub struct SponsorClient {
    paymaster: PaymasterClient,
}

impl SponsorClient {
    /// Dial the endpoints named in `config` over HTTP.
    ///
    /// When `config.sponsor_url` is unset, `user_url` serves both roles, which
    /// matches the single-URL sponsor API
    /// (`https://open-platform.nodereal.io/{apikey}/megafuel`).
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let dialer = HttpDialer::new(config.transport.clone());
        Self::connect_with(&dialer, config).await
    }

    pub async fn connect_with(
        dialer: &dyn Dialer,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let mut config = config.clone();
        if config.sponsor_url.is_none() {
            config.sponsor_url = Some(config.user_url.clone());
        }
        let paymaster = PaymasterClient::connect_with(dialer, &config).await?;
        Ok(Self::from_paymaster(paymaster))
    }

    /// Wrap an existing paymaster client. Sponsor-only calls fail with
    /// `NoSponsorEndpoint` unless it was built with a sponsor endpoint.
    pub fn from_paymaster(paymaster: PaymasterClient) -> Self {
        Self { paymaster }
    }

    pub fn as_paymaster(&self) -> &PaymasterClient {
        &self.paymaster
    }

    pub fn into_paymaster(self) -> PaymasterClient {
        self.paymaster
    }

    pub fn close(&self) {
        self.paymaster.close();
    }

    async fn sponsor_request<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        policy_uuid: Uuid,
        method: &'static str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let raw = self
            .paymaster
            .router()
            .call_sponsor(ctx, &policy_uuid.to_string(), method, params)
            .await?;
        decode_result(method, raw)
    }

    // ==========================================================================
    // Paymaster API (forwarded)
    // ==========================================================================

    pub async fn chain_id(&self, ctx: &CallContext) -> Result<BigAmount, ClientError> {
        self.paymaster.chain_id(ctx).await
    }

    pub async fn is_sponsorable(
        &self,
        ctx: &CallContext,
        tx: &TransactionArgs,
    ) -> Result<IsSponsorableResponse, ClientError> {
        self.paymaster.is_sponsorable(ctx, tx).await
    }

    pub async fn send_raw_transaction(
        &self,
        ctx: &CallContext,
        raw_tx: &Bytes,
    ) -> Result<TxHash, ClientError> {
        self.paymaster.send_raw_transaction(ctx, raw_tx).await
    }

    pub async fn get_gasless_transaction_by_hash(
        &self,
        ctx: &CallContext,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionResponse>, ClientError> {
        self.paymaster
            .get_gasless_transaction_by_hash(ctx, tx_hash)
            .await
    }

    pub async fn get_sponsor_tx_by_tx_hash(
        &self,
        ctx: &CallContext,
        tx_hash: TxHash,
    ) -> Result<Option<SponsorTx>, ClientError> {
        self.paymaster.get_sponsor_tx_by_tx_hash(ctx, tx_hash).await
    }

    pub async fn get_sponsor_tx_by_bundle_uuid(
        &self,
        ctx: &CallContext,
        bundle_uuid: Uuid,
    ) -> Result<Option<SponsorTx>, ClientError> {
        self.paymaster
            .get_sponsor_tx_by_bundle_uuid(ctx, bundle_uuid)
            .await
    }

    pub async fn get_bundle_by_uuid(
        &self,
        ctx: &CallContext,
        bundle_uuid: Uuid,
    ) -> Result<Option<Bundle>, ClientError> {
        self.paymaster.get_bundle_by_uuid(ctx, bundle_uuid).await
    }

    pub async fn get_transaction_count(
        &self,
        ctx: &CallContext,
        address: Address,
        block: BlockId,
    ) -> Result<u64, ClientError> {
        self.paymaster
            .get_transaction_count(ctx, address, block)
            .await
    }

    // ==========================================================================
    // Sponsor API
    // ==========================================================================

    /// `pm_addToWhitelist`: add `args.values` to a policy whitelist category.
    pub async fn add_to_whitelist(
        &self,
        ctx: &CallContext,
        args: &WhitelistArgs,
    ) -> Result<bool, ClientError> {
        self.sponsor_request(ctx, args.policy_uuid, "pm_addToWhitelist", vec![json!(args)])
            .await
    }

    /// `pm_rmFromWhitelist`
    pub async fn rm_from_whitelist(
        &self,
        ctx: &CallContext,
        args: &WhitelistArgs,
    ) -> Result<bool, ClientError> {
        self.sponsor_request(ctx, args.policy_uuid, "pm_rmFromWhitelist", vec![json!(args)])
            .await
    }

    /// `pm_emptyWhitelist`: remove every value in one whitelist category.
    pub async fn empty_whitelist(
        &self,
        ctx: &CallContext,
        args: &EmptyWhitelistArgs,
    ) -> Result<bool, ClientError> {
        self.sponsor_request(ctx, args.policy_uuid, "pm_emptyWhitelist", vec![json!(args)])
            .await
    }

    /// `pm_getWhitelist`. The result shape depends on the category, so it is
    /// returned as raw JSON.
    pub async fn get_whitelist(
        &self,
        ctx: &CallContext,
        args: &GetWhitelistArgs,
    ) -> Result<serde_json::Value, ClientError> {
        self.sponsor_request(ctx, args.policy_uuid, "pm_getWhitelist", vec![json!(args)])
            .await
    }

    /// `pm_getUserSpendData`
    pub async fn get_user_spend_data(
        &self,
        ctx: &CallContext,
        from_address: Address,
        policy_uuid: Uuid,
    ) -> Result<UserSpendData, ClientError> {
        self.sponsor_request(
            ctx,
            policy_uuid,
            "pm_getUserSpendData",
            vec![json!(from_address), json!(policy_uuid)],
        )
        .await
    }

    /// `pm_getPolicySpendData`
    pub async fn get_policy_spend_data(
        &self,
        ctx: &CallContext,
        policy_uuid: Uuid,
    ) -> Result<PolicySpendData, ClientError> {
        self.sponsor_request(
            ctx,
            policy_uuid,
            "pm_getPolicySpendData",
            vec![json!(policy_uuid)],
        )
        .await
    }
}
