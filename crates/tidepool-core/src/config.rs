//! Configuration types for Tidepool

use serde::{Deserialize, Serialize};

use crate::{AppId, Network};

/// Node connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node URL (e.g., "http://127.0.0.1:4001")
    pub url: String,

    /// API token for authenticated endpoints (optional)
    #[serde(default)]
    pub token: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:4001".to_string(),
            token: String::new(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Node connection settings
    pub node: NodeConfig,

    /// Network (mainnet or testnet)
    pub network: Network,

    /// Master application id of the AMM protocol deployment
    pub master_app_id: AppId,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig::default(),
            network: Network::Testnet,
            master_app_id: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.node.url, "http://127.0.0.1:4001");
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.master_app_id, 0);
    }

    #[test]
    fn test_config_serialization() {
        let config = ClientConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.node.url, config.node.url);
        assert_eq!(parsed.network, config.network);
    }
}
