use alloy_primitives::{Address, Bytes, B256};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use megafuel_core::types::{BlockId, WhitelistType};
use megafuel_core::BigAmount;

/// Query and manage MegaFuel gas sponsorship from the command line.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Paymaster (user) endpoint URL.
    #[arg(long, env = "MEGAFUEL_PAYMASTER_URL")]
    pub paymaster_url: String,

    /// Sponsor endpoint URL. Sponsor commands fall back to the paymaster URL.
    #[arg(long, env = "MEGAFUEL_SPONSOR_URL")]
    pub sponsor_url: Option<String>,

    /// Policy UUID fixed for every call (private paymaster mode).
    #[arg(long, env = "MEGAFUEL_PRIVATE_POLICY")]
    pub private_policy: Option<String>,

    /// Policy UUID for this invocation; overrides --private-policy.
    #[arg(long)]
    pub policy: Option<String>,

    /// User-Agent sent with this invocation's request.
    #[arg(long, env = "MEGAFUEL_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Outbound request rate limit per endpoint.
    #[arg(long)]
    pub requests_per_second: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the chain ID served by the paymaster.
    ChainId,

    /// Check whether a transaction qualifies for sponsorship.
    IsSponsorable {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        to: Option<Address>,
        /// Value in wei as a 0x-prefixed hex quantity.
        #[arg(long)]
        value: Option<BigAmount>,
        #[arg(long)]
        gas: Option<u64>,
        #[arg(long)]
        data: Option<Bytes>,
    },

    /// Submit a signed raw transaction for sponsored relay.
    SendRawTx { raw: Bytes },

    /// Look up a relayed transaction by hash.
    GaslessTx { hash: B256 },

    /// Look up the sponsor transaction that paid for a user transaction.
    SponsorTx { hash: B256 },

    /// Look up the sponsor transaction of a bundle.
    SponsorTxByBundle { bundle: Uuid },

    /// Look up a bundle.
    Bundle { bundle: Uuid },

    /// Print the transaction count (nonce) of an address.
    Nonce {
        address: Address,
        /// Block number, 0x-hash, or tag (latest, pending, earliest, safe, finalized).
        #[arg(default_value = "latest")]
        block: BlockId,
    },

    /// Manage policy whitelists (sponsor API).
    Whitelist {
        #[command(subcommand)]
        action: WhitelistCommand,
    },

    /// Print a user's spend on a policy (sponsor API).
    UserSpend { address: Address, policy: Uuid },

    /// Print a policy's aggregate spend (sponsor API).
    PolicySpend { policy: Uuid },
}

impl Command {
    pub fn is_sponsor_only(&self) -> bool {
        matches!(
            self,
            Self::Whitelist { .. } | Self::UserSpend { .. } | Self::PolicySpend { .. }
        )
    }
}

#[derive(Subcommand)]
pub enum WhitelistCommand {
    /// Add values to a whitelist category.
    Add {
        policy: Uuid,
        #[arg(long, value_enum)]
        kind: WhitelistKind,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Remove values from a whitelist category.
    Rm {
        policy: Uuid,
        #[arg(long, value_enum)]
        kind: WhitelistKind,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Remove every value from a whitelist category.
    Empty {
        policy: Uuid,
        #[arg(long, value_enum)]
        kind: WhitelistKind,
    },

    /// Read one page of a whitelist category.
    Get {
        policy: Uuid,
        #[arg(long, value_enum)]
        kind: WhitelistKind,
        #[arg(long, default_value = "0")]
        offset: i64,
        #[arg(long, default_value = "100")]
        limit: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WhitelistKind {
    FromAccount,
    ToAccount,
    ContractMethodSig,
    Bep20Receiver,
}

impl From<WhitelistKind> for WhitelistType {
    fn from(kind: WhitelistKind) -> Self {
        match kind {
            WhitelistKind::FromAccount => Self::FromAccountWhitelist,
            WhitelistKind::ToAccount => Self::ToAccountWhitelist,
            WhitelistKind::ContractMethodSig => Self::ContractMethodSigWhitelist,
            WhitelistKind::Bep20Receiver => Self::Bep20ReceiverWhitelist,
        }
    }
}
