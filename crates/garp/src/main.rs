mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::Value;

use garp_sdk::types::MessageQuery;
use garp_sdk::{ClientConfig, GarpClient};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let config = ClientConfig::new(&args.url)
        .wrap_err("invalid --url")?
        .with_timeout(Duration::from_secs(args.timeout_secs))
        .with_requests_per_second(args.requests_per_second);
    let client = GarpClient::new(&config).wrap_err("construct Garp client")?;
    tracing::debug!(url = %config.base_url, "client ready");

    let output = run(&client, args.command).await.map_err(|err| {
        let message = format_node_error(&args.url, &format!("{err:#}"));
        eyre!(message).wrap_err("request to Garp node failed")
    })?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(client: &GarpClient, command: Command) -> eyre::Result<Value> {
    let value = match command {
        Command::Slot => serde_json::to_value(client.get_slot().await?)?,
        Command::SlotLeader => serde_json::to_value(client.get_slot_leader().await?)?,
        Command::Block { key } => {
            // A bare decimal is a slot; anything else is looked up as a hash.
            let block = match key.parse::<u64>() {
                Ok(slot) => client.get_block_by_slot(slot).await?,
                Err(_) => client.get_block_by_hash(&key).await?,
            };
            serde_json::to_value(block)?
        }
        Command::Tx { id } => serde_json::to_value(client.get_transaction(&id).await?)?,
        Command::Send { serialized } => {
            serde_json::to_value(client.send_transaction(&serialized).await?)?
        }
        Command::Simulate { serialized } => {
            serde_json::to_value(client.simulate_transaction(&serialized).await?)?
        }
        Command::Balance { address } => serde_json::to_value(client.get_balance(&address).await?)?,
        Command::Version => serde_json::to_value(client.get_version().await?)?,
        Command::Health => serde_json::to_value(client.get_health().await?)?,
        Command::Call { method, params } => {
            let params = parse_params(params.as_deref())?;
            client.call(&method, params).await?
        }
        Command::BridgeStatus { id } => {
            serde_json::to_value(client.bridge().transfer_status(&id).await?)?
        }
        Command::Messages {
            address,
            peer,
            since,
            limit,
        } => {
            let query = MessageQuery {
                address,
                peer,
                since,
                limit,
            };
            serde_json::to_value(client.chat().list_messages(&query).await?)?
        }
    };
    Ok(value)
}

fn parse_params(raw: Option<&str>) -> eyre::Result<Option<Vec<Value>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw).wrap_err("params must be valid JSON")? {
        Value::Array(items) => Ok(Some(items)),
        other => Err(eyre!("params must be a JSON array, got {other}")),
    }
}

fn format_node_error(url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("node endpoint `{url}`"),
        format!("error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("Could not resolve host") {
        lines.push(
            "hint: hostname resolution failed; verify the node hostname and your DNS/network"
                .into(),
        );
    } else if source_error.contains("tcp connect error")
        || source_error.contains("Connection refused")
        || source_error.contains("error sending request")
    {
        lines.push(
            "hint: node is not reachable; verify it is running and the port is correct".into(),
        );
    } else if source_error.contains("HTTP status 404") {
        lines.push(format!(
            "hint: endpoint path is invalid; verify the base URL (calls go to `{url}/rpc`)"
        ));
    } else if source_error.contains("malformed response") {
        lines.push(
            "hint: the endpoint did not answer with JSON-RPC; verify --url points at a Garp node"
                .into(),
        );
    }

    lines.join("\n")
}
