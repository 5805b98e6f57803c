pub mod blocking;
pub mod bridge;
pub mod chat;
pub mod config;
pub mod error;
mod rest;
pub mod rpc;
#[cfg(test)]
mod test_util;
pub mod transport;
pub mod types;

pub use blocking::BlockingGarpClient;
pub use config::ClientConfig;
pub use error::{ClientError, DecodeError, TransportError};
pub use rpc::{BatchCall, GarpClient};
pub use types::{Balance, BlockInfo, BlockTx, SimulationResult, TransactionInfo};
