mod cli;

use std::time::Duration;

use alloy_primitives::U64;
use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use megafuel_core::types::{
    EmptyWhitelistArgs, GetWhitelistArgs, TransactionArgs, WhitelistArgs, WhitelistType,
};
use megafuel_core::{
    CallContext, ClientConfig, ClientError, PaymasterClient, SponsorClient, TransportOptions,
};

use cli::{Command, WhitelistCommand};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so stdout carries only the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let transport = TransportOptions {
        timeout: Duration::from_secs(args.timeout_secs),
        requests_per_second: args.requests_per_second,
        ..TransportOptions::default()
    };
    let mut config = ClientConfig::new(&args.paymaster_url).with_transport(transport);
    if let Some(url) = &args.sponsor_url {
        config = config.with_sponsor_url(url);
    }
    if let Some(policy) = &args.private_policy {
        config = config.with_private_policy(policy);
    }

    // Sponsor commands may run against a single URL; base commands only
    // route to a sponsor endpoint when one was configured.
    let client = if args.command.is_sponsor_only() {
        SponsorClient::connect(&config).await
    } else {
        PaymasterClient::connect(&config)
            .await
            .map(SponsorClient::from_paymaster)
    }
    .map_err(|err| connect_error(&config, &err))?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling in-flight request");
                cancel.cancel();
            }
        });
    }

    let mut ctx = CallContext::new().with_cancellation(cancel);
    if let Some(policy) = &args.policy {
        ctx = ctx.with_policy(policy.as_str());
    }
    if let Some(user_agent) = &args.user_agent {
        ctx = ctx.with_user_agent(user_agent.as_str());
    }

    let output = run(&client, &ctx, args.command).await;
    client.close();
    let output = output?;

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("render result as JSON")?
    );
    Ok(())
}

async fn run(client: &SponsorClient, ctx: &CallContext, command: Command) -> eyre::Result<Value> {
    let value = match command {
        Command::ChainId => {
            let chain_id = client.chain_id(ctx).await.map_err(call_error)?;
            serde_json::json!({ "hex": chain_id.to_hex(), "decimal": chain_id.to_string() })
        }
        Command::IsSponsorable {
            from,
            to,
            value,
            gas,
            data,
        } => {
            let tx = TransactionArgs {
                to,
                from,
                value,
                gas: gas.map(U64::from),
                data,
            };
            to_json(client.is_sponsorable(ctx, &tx).await.map_err(call_error)?)?
        }
        Command::SendRawTx { raw } => {
            let hash = client
                .send_raw_transaction(ctx, &raw)
                .await
                .map_err(call_error)?;
            to_json(hash)?
        }
        Command::GaslessTx { hash } => to_json(
            client
                .get_gasless_transaction_by_hash(ctx, hash)
                .await
                .map_err(call_error)?,
        )?,
        Command::SponsorTx { hash } => to_json(
            client
                .get_sponsor_tx_by_tx_hash(ctx, hash)
                .await
                .map_err(call_error)?,
        )?,
        Command::SponsorTxByBundle { bundle } => to_json(
            client
                .get_sponsor_tx_by_bundle_uuid(ctx, bundle)
                .await
                .map_err(call_error)?,
        )?,
        Command::Bundle { bundle } => to_json(
            client
                .get_bundle_by_uuid(ctx, bundle)
                .await
                .map_err(call_error)?,
        )?,
        Command::Nonce { address, block } => to_json(
            client
                .get_transaction_count(ctx, address, block)
                .await
                .map_err(call_error)?,
        )?,
        Command::Whitelist { action } => run_whitelist(client, ctx, action).await?,
        Command::UserSpend { address, policy } => to_json(
            client
                .get_user_spend_data(ctx, address, policy)
                .await
                .map_err(call_error)?,
        )?,
        Command::PolicySpend { policy } => to_json(
            client
                .get_policy_spend_data(ctx, policy)
                .await
                .map_err(call_error)?,
        )?,
    };
    Ok(value)
}

async fn run_whitelist(
    client: &SponsorClient,
    ctx: &CallContext,
    action: WhitelistCommand,
) -> eyre::Result<Value> {
    let value = match action {
        WhitelistCommand::Add {
            policy,
            kind,
            values,
        } => {
            let args = WhitelistArgs {
                policy_uuid: policy,
                whitelist_type: WhitelistType::from(kind),
                values,
            };
            Value::Bool(client.add_to_whitelist(ctx, &args).await.map_err(call_error)?)
        }
        WhitelistCommand::Rm {
            policy,
            kind,
            values,
        } => {
            let args = WhitelistArgs {
                policy_uuid: policy,
                whitelist_type: WhitelistType::from(kind),
                values,
            };
            Value::Bool(client.rm_from_whitelist(ctx, &args).await.map_err(call_error)?)
        }
        WhitelistCommand::Empty { policy, kind } => {
            let args = EmptyWhitelistArgs {
                policy_uuid: policy,
                whitelist_type: WhitelistType::from(kind),
            };
            Value::Bool(client.empty_whitelist(ctx, &args).await.map_err(call_error)?)
        }
        WhitelistCommand::Get {
            policy,
            kind,
            offset,
            limit,
        } => {
            let args = GetWhitelistArgs {
                policy_uuid: policy,
                whitelist_type: WhitelistType::from(kind),
                offset,
                limit,
            };
            client.get_whitelist(ctx, &args).await.map_err(call_error)?
        }
    };
    Ok(value)
}

fn to_json(value: impl serde::Serialize) -> eyre::Result<Value> {
    serde_json::to_value(value).context("encode result")
}

fn call_error(err: ClientError) -> eyre::Report {
    let message = match hint_for(&err) {
        Some(hint) => format!("{err}\nhint: {hint}"),
        None => err.to_string(),
    };
    eyre!(message)
}

fn connect_error(config: &ClientConfig, err: &ClientError) -> eyre::Report {
    let mut lines = vec![format!("could not set up endpoints for `{}`", config.user_url)];
    lines.push(format!("error: {err}"));
    if let Some(hint) = hint_for(err) {
        lines.push(format!("hint: {hint}"));
    }
    eyre!(lines.join("\n")).wrap_err("while constructing the MegaFuel client")
}

fn hint_for(err: &ClientError) -> Option<&'static str> {
    match err {
        ClientError::NoSponsorEndpoint => {
            Some("pass --sponsor-url (or MEGAFUEL_SPONSOR_URL) to reach the sponsor API")
        }
        ClientError::DialFailure { .. } => {
            Some("endpoint URLs must be absolute http:// or https:// URLs")
        }
        ClientError::Cancelled => Some("the request was interrupted before a reply arrived"),
        ClientError::DeadlineExceeded => Some("raise --timeout-secs or check endpoint latency"),
        _ => match err.remote_code() {
            Some(-32601) => Some(
                "method not found; verify the URL points at the paymaster or sponsor API as appropriate",
            ),
            Some(_) => None,
            None => {
                let text = err.to_string();
                if text.contains("dns error") || text.contains("Could not resolve host") {
                    Some("hostname resolution failed; verify the endpoint hostname and your DNS/network")
                } else if text.contains("certificate") || text.contains("tls") {
                    Some("TLS handshake failed; verify certificate trust and that the endpoint uses HTTPS")
                } else if text.contains("401") || text.contains("403") {
                    Some("authentication failed; verify the API key in the sponsor URL")
                } else {
                    None
                }
            }
        },
    }
}
