//! HTTP/REST gateway to a DHT node.
//!
//! Exposes the node's key/value store (`/api/dht/*`) and a username directory
//! (`/api/username*`) built on top of it. The directory is only an encoding
//! convention: a record is stored under the [Id] derived from
//! `"pc2:username:" + lowercase(username)`.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dht_http_api::{api, Config, LocalNode};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let node = LocalNode::new(config.node.clone())?;
//!
//! let router = api::create_router(api::AppState::new(config, Arc::new(node)));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8091").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

mod common;

pub mod api;
pub mod codec;
pub mod config;
pub mod directory;
pub mod node;

pub use crate::common::{hash_immutable, DecodeIdError, Id, Receipt, Value, ID_SIZE};
pub use bytes::Bytes;
pub use config::Config;
pub use node::{LocalNode, Node, NodeConfig, NodeError};
