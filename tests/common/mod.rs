//! Shared test utilities.
//! Note: #[allow(dead_code)] because each test file compiles common/ separately.

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use dht_http_api::{api, Config, Id, LocalNode, Node, NodeConfig, NodeError, Receipt, Value};
use serde_json::Value as Json;
use tokio::sync::Notify;
use tower::ServiceExt;

/// A node whose every operation fails, counting the calls it receives.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct FailingNode {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Node for FailingNode {
    fn id(&self) -> Id {
        Id::from([1; 20])
    }

    fn address4(&self) -> Option<Ipv4Addr> {
        None
    }

    fn port(&self) -> u16 {
        39001
    }

    async fn find_value(&self, _id: Id) -> Result<Option<Value>, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(NodeError::Store("lookup timed out".to_string()))
    }

    async fn store_value(&self, _value: Value) -> Result<Receipt, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(NodeError::Store("replication failed".to_string()))
    }

    async fn announce_peer(&self, _info_hash: Id, _port: Option<u16>) -> Result<Id, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(NodeError::Store("announce failed".to_string()))
    }

    async fn get_peers(&self, _info_hash: Id) -> Result<Vec<SocketAddrV4>, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(NodeError::Store("lookup timed out".to_string()))
    }
}

/// A node whose `store_value` blocks until released.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct GatedNode {
    /// Notified once a store call is in flight.
    pub started: Notify,
    pub release: Notify,
    /// Notified once a store call has finished.
    pub finished: Notify,
    pub stored: AtomicUsize,
}

#[async_trait]
impl Node for GatedNode {
    fn id(&self) -> Id {
        Id::from([2; 20])
    }

    fn address4(&self) -> Option<Ipv4Addr> {
        None
    }

    fn port(&self) -> u16 {
        39001
    }

    async fn find_value(&self, _id: Id) -> Result<Option<Value>, NodeError> {
        Ok(None)
    }

    async fn store_value(&self, value: Value) -> Result<Receipt, NodeError> {
        self.started.notify_one();
        self.release.notified().await;

        self.stored.fetch_add(1, Ordering::SeqCst);
        self.finished.notify_one();

        Ok(Receipt::new(*value.id()))
    }

    async fn announce_peer(&self, info_hash: Id, _port: Option<u16>) -> Result<Id, NodeError> {
        Ok(info_hash)
    }

    async fn get_peers(&self, _info_hash: Id) -> Result<Vec<SocketAddrV4>, NodeError> {
        Ok(Vec::new())
    }
}

#[allow(dead_code)]
pub struct TestServer {
    pub router: Router,
    pub node: Arc<dyn Node>,
}

#[allow(dead_code)]
impl TestServer {
    /// Router backed by a fresh [LocalNode].
    pub fn new() -> Self {
        Self::with_node_config(NodeConfig {
            address: Some(Ipv4Addr::new(10, 0, 0, 1)),
            port: 4000,
            ..Default::default()
        })
    }

    pub fn with_node_config(node_config: NodeConfig) -> Self {
        let node = LocalNode::new(node_config).expect("Failed to start node");

        Self::with_node(Arc::new(node))
    }

    pub fn with_node(node: Arc<dyn Node>) -> Self {
        let router = api::create_router(api::AppState::new(Config::default(), node.clone()));

        Self { router, node }
    }

    /// Send a request and return its status and JSON body (Null if empty).
    pub async fn request(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Json) {
        let (status, _, json) = self.request_full(method, uri, body).await;

        (status, json)
    }

    pub async fn request_full(
        &self,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, axum::http::HeaderMap, Json) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(body) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if body_bytes.is_empty() {
            Json::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Json::Null)
        };

        (status, headers, json)
    }
}
