//! Request and response records exchanged with the paymaster and sponsor APIs.
//!
//! Field names follow the service's JSON casing. Response records use
//! `#[serde(default)]` so that fields the service omits decode to their zero
//! value instead of failing the whole call.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, Bytes, B256, U64};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::amount::BigAmount;

pub type TxHash = B256;

// ==============================================================================
// Lifecycle Status
// ==============================================================================

/// Lifecycle state of a relayed transaction or bundle, as reported remotely.
///
/// Encoded on the wire as the integers `0..=4` in declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Status {
    #[default]
    New,
    Pending,
    Confirmed,
    Failed,
    Invalid,
}

impl TryFrom<i8> for Status {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::New),
            1 => Ok(Self::Pending),
            2 => Ok(Self::Confirmed),
            3 => Ok(Self::Failed),
            4 => Ok(Self::Invalid),
            other => Err(format!("unknown status code {other}")),
        }
    }
}

impl From<Status> for i8 {
    fn from(status: Status) -> Self {
        status as i8
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

// ==============================================================================
// Paymaster Records
// ==============================================================================

/// Candidate transaction for `pm_isSponsorable`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionArgs {
    pub to: Option<Address>,
    pub from: Address,
    pub value: Option<BigAmount>,
    pub gas: Option<U64>,
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IsSponsorableResponse {
    pub sponsorable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_website: Option<String>,
}

/// A transaction relayed through the paymaster, from `eth_getGaslessTransactionByHash`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionResponse {
    pub tx_hash: TxHash,
    pub bundle_uuid: Uuid,
    pub from_address: Address,
    #[serde(rename = "ToAddress")]
    pub to_address: Option<Address>,
    pub nonce: u64,
    /// Raw transaction payload, kept in the text form the service emits.
    pub raw_data: Option<String>,
    pub status: Status,
    pub gas_used: u64,
    pub gas_fee: Option<BigAmount>,
    pub policy_uuid: Uuid,
    /// Client identification (`User-Agent`) the transaction was submitted with.
    pub source: String,
    /// Height at which the transaction was handed to builders.
    pub born_block_number: i64,
    pub chain_id: i64,
}

/// The sponsor-side transaction that paid for a user transaction or bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SponsorTx {
    pub tx_hash: TxHash,
    pub address: Address,
    pub bundle_uuid: Uuid,
    pub status: Status,
    pub gas_price: Option<BigAmount>,
    pub gas_fee: Option<BigAmount>,
    pub born_block_number: i64,
    pub chain_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bundle {
    pub bundle_uuid: Uuid,
    pub status: Status,
    pub avg_gas_price: Option<BigAmount>,
    pub born_block_number: i64,
    pub confirmed_block_number: i64,
    pub confirmed_date: u64,
    pub chain_id: i64,
}

// ==============================================================================
// Block Reference
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
    Earliest,
    Safe,
    Finalized,
}

impl BlockTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Pending => "pending",
            Self::Earliest => "earliest",
            Self::Safe => "safe",
            Self::Finalized => "finalized",
        }
    }
}

/// Block reference for `eth_getTransactionCount`: a number, a tag, or a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockId {
    Number(u64),
    Tag(BlockTag),
    Hash(B256),
}

impl Default for BlockId {
    fn default() -> Self {
        Self::Tag(BlockTag::Latest)
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_str(&format!("{n:#x}")),
            Self::Tag(tag) => serializer.serialize_str(tag.as_str()),
            Self::Hash(hash) => hash.serialize(serializer),
        }
    }
}

impl FromStr for BlockId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => return Ok(Self::Tag(BlockTag::Latest)),
            "pending" => return Ok(Self::Tag(BlockTag::Pending)),
            "earliest" => return Ok(Self::Tag(BlockTag::Earliest)),
            "safe" => return Ok(Self::Tag(BlockTag::Safe)),
            "finalized" => return Ok(Self::Tag(BlockTag::Finalized)),
            _ => {}
        }

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            // 32-byte hashes are 64 hex digits; anything shorter is a block number.
            if hex.len() == 64 {
                return hex
                    .parse::<B256>()
                    .map(Self::Hash)
                    .map_err(|e| format!("invalid block hash `{s}`: {e}"));
            }
            return u64::from_str_radix(hex, 16)
                .map(Self::Number)
                .map_err(|e| format!("invalid block number `{s}`: {e}"));
        }

        s.parse::<u64>()
            .map(Self::Number)
            .map_err(|e| format!("invalid block reference `{s}`: {e}"))
    }
}

// ==============================================================================
// Sponsor Records
// ==============================================================================

/// Category of values a policy whitelist restricts sponsorship to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhitelistType {
    FromAccountWhitelist,
    ToAccountWhitelist,
    ContractMethodSigWhitelist,
    #[serde(rename = "BEP20ReceiverWhiteList")]
    Bep20ReceiverWhitelist,
}

impl WhitelistType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FromAccountWhitelist => "FromAccountWhitelist",
            Self::ToAccountWhitelist => "ToAccountWhitelist",
            Self::ContractMethodSigWhitelist => "ContractMethodSigWhitelist",
            Self::Bep20ReceiverWhitelist => "BEP20ReceiverWhiteList",
        }
    }
}

impl fmt::Display for WhitelistType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments for `pm_addToWhitelist` and `pm_rmFromWhitelist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistArgs {
    pub policy_uuid: Uuid,
    pub whitelist_type: WhitelistType,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyWhitelistArgs {
    pub policy_uuid: Uuid,
    pub whitelist_type: WhitelistType,
}

/// Paginated whitelist read. Bounds on `offset`/`limit` are enforced remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWhitelistArgs {
    pub policy_uuid: Uuid,
    pub whitelist_type: WhitelistType,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSpendData {
    pub user_address: Address,
    pub gas_cost: Option<BigAmount>,
    pub gas_cost_cur_day: Option<BigAmount>,
    pub tx_count_cur_day: u64,
    pub update_at: u64,
    #[serde(rename = "chain_id")]
    pub chain_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicySpendData {
    pub cost: Option<BigAmount>,
    pub update_at: u64,
    #[serde(rename = "chain_id")]
    pub chain_id: i64,
}
