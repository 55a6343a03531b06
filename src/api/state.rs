use std::sync::Arc;

use crate::{config::Config, node::Node};

/// Immutable context shared by all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub node: Arc<dyn Node>,
}

impl AppState {
    pub fn new(config: Config, node: Arc<dyn Node>) -> Self {
        Self {
            config: Arc::new(config),
            node,
        }
    }
}
