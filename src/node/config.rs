use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::common::Id;

/// Default port the node advertises.
pub const DEFAULT_NODE_PORT: u16 = 39001;

// Stored data limits.
pub const MAX_INFO_HASHES: usize = 2000;
pub const MAX_PEERS: usize = 500;
pub const MAX_VALUES: usize = 1000;
/// Largest value accepted, in bytes.
pub const MAX_VALUE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Node configurations
pub struct NodeConfig {
    /// Explicit node [Id].
    ///
    /// Defaults to None, where a random Id is generated at startup.
    pub id: Option<Id>,
    /// Public Ipv4 address of this node.
    ///
    /// Defaults to None
    pub address: Option<Ipv4Addr>,
    /// Port this node advertises.
    ///
    /// Defaults to [DEFAULT_NODE_PORT]
    pub port: u16,
    /// Maximum number of values to keep.
    ///
    /// Defaults to [MAX_VALUES], zero also falls back to it.
    pub max_values: usize,
    /// Maximum size of a single value in bytes.
    ///
    /// Defaults to [MAX_VALUE_SIZE]
    pub max_value_size: usize,
    /// The maximum info_hashes for which to store peers.
    ///
    /// Defaults to [MAX_INFO_HASHES], zero also falls back to it.
    pub max_info_hashes: usize,
    /// The maximum peers to store per info_hash.
    ///
    /// Defaults to [MAX_PEERS], zero also falls back to it.
    pub max_peers_per_info_hash: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            id: None,
            address: None,
            port: DEFAULT_NODE_PORT,
            max_values: MAX_VALUES,
            max_value_size: MAX_VALUE_SIZE,
            max_info_hashes: MAX_INFO_HASHES,
            max_peers_per_info_hash: MAX_PEERS,
        }
    }
}
