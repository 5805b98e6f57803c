//! Garp node JSON-RPC layer.
//!
//! [`protocol`] builds and parses JSON-RPC 2.0 envelopes, [`parsing`] maps
//! untyped results onto the domain types, and [`GarpClient`] composes both
//! over a [`Transport`](crate::transport::Transport), one method per remote
//! operation.

mod client;
pub mod parsing;
pub mod protocol;

pub use client::GarpClient;
pub use protocol::{BatchCall, JsonRpcRequest};
