//! Gateway configuration, fixed at startup.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::node::NodeConfig;

/// Default port of the HTTP API.
pub const DEFAULT_HTTP_PORT: u16 = 8091;
/// Default host of the HTTP API.
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
/// Prefix of environment variables overriding the configuration.
pub const ENV_PREFIX: &str = "DHT_API_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub node: NodeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// HTTP listener configurations
pub struct HttpConfig {
    /// Host or Ip to listen on.
    ///
    /// Defaults to [DEFAULT_HTTP_HOST]
    pub host: String,
    /// Port to listen on.
    ///
    /// Defaults to [DEFAULT_HTTP_PORT]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

impl Config {
    /// Layer defaults, an optional TOML file and `DHT_API_` environment variables.
    ///
    /// Nested keys use `__` in environment variables, e.g. `DHT_API_HTTP__PORT`.
    /// A missing file is not an error.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }
}
