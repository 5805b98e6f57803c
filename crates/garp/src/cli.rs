use clap::{Parser, Subcommand};

/// Garp: command-line client for Garp node JSON-RPC and bridge/chat services.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Node base URL; JSON-RPC calls go to `{url}/rpc`.
    #[arg(long, default_value = "http://127.0.0.1:8899", env = "GARP_URL")]
    pub url: String,

    /// Whole-request timeout in seconds.
    #[arg(long, default_value = "10", env = "GARP_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Maximum outbound requests per second (unlimited when omitted).
    #[arg(long, env = "GARP_RPS")]
    pub requests_per_second: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Current slot.
    Slot,
    /// Leader of the current slot.
    SlotLeader,
    /// Block by slot number or by hash.
    Block {
        /// A decimal slot, or a block hash.
        key: String,
    },
    /// Transaction by id.
    Tx { id: String },
    /// Submit a serialized transaction.
    Send { serialized: String },
    /// Dry-run a serialized transaction.
    Simulate { serialized: String },
    /// Balance of an address.
    Balance { address: String },
    /// Node software version.
    Version,
    /// Node health.
    Health,
    /// Raw JSON-RPC call.
    Call {
        method: String,
        /// Positional params as a JSON array; omitted from the request when absent.
        params: Option<String>,
    },
    /// Status of a bridge transfer.
    BridgeStatus { id: String },
    /// Messages between two addresses.
    Messages {
        #[arg(long)]
        address: String,
        #[arg(long)]
        peer: String,
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
}
