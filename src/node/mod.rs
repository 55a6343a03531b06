//! The DHT node this gateway delegates storage and lookup to.

mod config;
mod local;
mod peers;

use std::net::{Ipv4Addr, SocketAddrV4};

use async_trait::async_trait;

use crate::common::{Id, Receipt, Value};

pub use config::*;
pub use local::LocalNode;

/// Asynchronous operations of a DHT node.
///
/// Implementations own replication, routing and retries. Callers issue a
/// single operation and interpret its outcome.
#[async_trait]
pub trait Node: std::fmt::Debug + Send + Sync {
    /// This node's [Id].
    fn id(&self) -> Id;

    /// Public Ipv4 address of this node, if known.
    fn address4(&self) -> Option<Ipv4Addr>;

    fn port(&self) -> u16;

    /// Look up the value stored under `id`.
    ///
    /// Resolves to `Ok(None)` when no value exists, which is not an error.
    async fn find_value(&self, id: Id) -> Result<Option<Value>, NodeError>;

    /// Store a value, returning the [Id] it was stored under.
    async fn store_value(&self, value: Value) -> Result<Receipt, NodeError>;

    /// Announce this node as a peer for `info_hash`.
    ///
    /// If `port` is None, the node's own port is announced.
    async fn announce_peer(&self, info_hash: Id, port: Option<u16>) -> Result<Id, NodeError>;

    /// Peers announced for `info_hash`, at most 20 of them.
    async fn get_peers(&self, info_hash: Id) -> Result<Vec<SocketAddrV4>, NodeError>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors of node operations.
pub enum NodeError {
    /// The node's actor thread is not running anymore.
    #[error("Dht node was shutdown")]
    Shutdown,

    #[error("Value too large: {0} bytes exceeds the limit of {1} bytes")]
    ValueTooLarge(usize, usize),

    /// Failure reported by a remote node or the network layer.
    #[error("{0}")]
    Store(String),
}
