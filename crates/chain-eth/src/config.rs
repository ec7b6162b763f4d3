use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::chains::Network;

/// Request timeout used when neither the file nor the environment sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading an [`RpcConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid url for {key}: {message}")]
    UrlParse { key: String, message: String },

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// RPC endpoint overrides and transport settings.
///
/// Networks without an override use the registry's default endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default)]
    pub endpoints: HashMap<Network, Url>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RpcConfig {
    /// Loads a JSON config such as
    /// `{"endpoints": {"sapphire": "https://..."}, "timeout_secs": 10}`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses a config from a JSON string. Missing keys take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads `<NETWORK>_RPC_URL` and `RPC_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Same as [`from_env`](Self::from_env) over an explicit set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let mut config = RpcConfig::default();
        for network in Network::ALL {
            let key = format!("{}_RPC_URL", network.env_prefix());
            if let Some(raw) = vars.get(&key) {
                let url = Url::parse(raw).map_err(|e| ConfigError::UrlParse {
                    key,
                    message: e.to_string(),
                })?;
                config.endpoints.insert(network, url);
            }
        }

        if let Some(raw) = vars.get("RPC_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RPC_TIMEOUT_SECS".into(),
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    pub fn with_endpoint(mut self, network: Network, url: Url) -> Self {
        self.endpoints.insert(network, url);
        self
    }

    /// Endpoint for `network`: the override if present, else the registry default.
    pub fn rpc_url(&self, network: Network) -> Result<Url, ConfigError> {
        if let Some(url) = self.endpoints.get(&network) {
            return Ok(url.clone());
        }
        Url::parse(network.rpc_url()).map_err(|e| ConfigError::UrlParse {
            key: network.to_string(),
            message: e.to_string(),
        })
    }

    /// Per-request timeout applied by the HTTP client.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_fall_back_to_registry() {
        let config = RpcConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.rpc_url(Network::Sapphire).unwrap().as_str(),
            "https://sapphire.oasis.io/"
        );
    }

    #[test]
    fn json_overrides_endpoint() {
        let config = RpcConfig::from_json(
            r#"{"endpoints": {"polygon-amoy": "http://localhost:8545"}, "timeout_secs": 5}"#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(
            config.rpc_url(Network::PolygonAmoy).unwrap().as_str(),
            "http://localhost:8545/"
        );
        assert_eq!(
            config.rpc_url(Network::Ethereum).unwrap().as_str(),
            "https://eth.llamarpc.com/"
        );
    }

    #[test]
    fn empty_json_uses_defaults() {
        assert_eq!(RpcConfig::from_json("{}").unwrap(), RpcConfig::default());
    }

    #[test]
    fn unknown_network_key_is_rejected() {
        let err = RpcConfig::from_json(r#"{"endpoints": {"solana": "http://x"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::JsonParse(_)));
    }

    #[test]
    fn vars_override_endpoints_and_timeout() {
        let config = RpcConfig::from_vars([
            ("SAPPHIRE_TESTNET_RPC_URL", "http://127.0.0.1:8545"),
            ("RPC_TIMEOUT_SECS", "7"),
            ("UNRELATED", "x"),
        ])
        .unwrap();
        assert_eq!(config.timeout_secs, 7);
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(
            config.rpc_url(Network::SapphireTestnet).unwrap().as_str(),
            "http://127.0.0.1:8545/"
        );
    }

    #[test]
    fn bad_url_var_is_rejected() {
        let err = RpcConfig::from_vars([("BASE_RPC_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::UrlParse { ref key, .. } if key == "BASE_RPC_URL"));
    }

    #[test]
    fn bad_timeout_var_is_rejected() {
        let err = RpcConfig::from_vars([("RPC_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn from_file_reads_json() {
        let path = std::env::temp_dir().join(format!("chain-eth-rpc-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"endpoints": {"base": "https://base.example"}}"#).unwrap();
        drop(file);

        let config = RpcConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            config.rpc_url(Network::Base).unwrap().as_str(),
            "https://base.example/"
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = RpcConfig::from_file("/nonexistent/chain-eth.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }

    #[test]
    fn display_unknown_network() {
        let err = ConfigError::UnknownNetwork("solana".into());
        assert_eq!(err.to_string(), "unknown network: solana");
    }
}
