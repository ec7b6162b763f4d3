use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Native currency of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Static description of an EVM-compatible network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: &'static str,
    pub native_currency: NativeCurrency,
    pub rpc_urls: &'static [&'static str],
    pub block_time: Duration,
    pub is_testnet: bool,
}

/// The networks a binding can be paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Ethereum,
    Sepolia,
    Polygon,
    PolygonAmoy,
    Arbitrum,
    Base,
    Optimism,
    Bsc,
    Avalanche,
    Sapphire,
    SapphireTestnet,
}

const ETH: NativeCurrency = NativeCurrency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

const POL: NativeCurrency = NativeCurrency {
    name: "POL",
    symbol: "MATIC",
    decimals: 18,
};

const ROSE: NativeCurrency = NativeCurrency {
    name: "Rose",
    symbol: "ROSE",
    decimals: 18,
};

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: NetworkInfo = NetworkInfo {
    chain_id: 1,
    name: "Ethereum",
    native_currency: ETH,
    rpc_urls: &["https://eth.llamarpc.com"],
    block_time: Duration::from_secs(12),
    is_testnet: false,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: NetworkInfo = NetworkInfo {
    chain_id: 11155111,
    name: "Sepolia",
    native_currency: ETH,
    rpc_urls: &["https://rpc.sepolia.org"],
    block_time: Duration::from_secs(12),
    is_testnet: true,
};

/// Polygon PoS (chain ID 137).
pub const POLYGON: NetworkInfo = NetworkInfo {
    chain_id: 137,
    name: "Polygon",
    native_currency: POL,
    rpc_urls: &["https://polygon-rpc.com"],
    block_time: Duration::from_secs(2),
    is_testnet: false,
};

/// Polygon Amoy Testnet (chain ID 80002).
pub const POLYGON_AMOY: NetworkInfo = NetworkInfo {
    chain_id: 80002,
    name: "Polygon Amoy",
    native_currency: POL,
    rpc_urls: &["https://rpc-amoy.polygon.technology"],
    block_time: Duration::from_secs(2),
    is_testnet: true,
};

/// Arbitrum One (chain ID 42161).
pub const ARBITRUM: NetworkInfo = NetworkInfo {
    chain_id: 42161,
    name: "Arbitrum One",
    native_currency: ETH,
    rpc_urls: &["https://arb1.arbitrum.io/rpc"],
    block_time: Duration::from_millis(250),
    is_testnet: false,
};

/// Base (chain ID 8453).
pub const BASE: NetworkInfo = NetworkInfo {
    chain_id: 8453,
    name: "Base",
    native_currency: ETH,
    rpc_urls: &["https://mainnet.base.org"],
    block_time: Duration::from_secs(2),
    is_testnet: false,
};

/// Optimism (chain ID 10).
pub const OPTIMISM: NetworkInfo = NetworkInfo {
    chain_id: 10,
    name: "Optimism",
    native_currency: ETH,
    rpc_urls: &["https://mainnet.optimism.io"],
    block_time: Duration::from_secs(2),
    is_testnet: false,
};

/// BNB Smart Chain (chain ID 56).
pub const BSC: NetworkInfo = NetworkInfo {
    chain_id: 56,
    name: "BNB Smart Chain",
    native_currency: NativeCurrency {
        name: "BNB",
        symbol: "BNB",
        decimals: 18,
    },
    rpc_urls: &["https://bsc-dataseed.binance.org"],
    block_time: Duration::from_secs(3),
    is_testnet: false,
};

/// Avalanche C-Chain (chain ID 43114).
pub const AVALANCHE: NetworkInfo = NetworkInfo {
    chain_id: 43114,
    name: "Avalanche C-Chain",
    native_currency: NativeCurrency {
        name: "Avalanche",
        symbol: "AVAX",
        decimals: 18,
    },
    rpc_urls: &["https://api.avax.network/ext/bc/C/rpc"],
    block_time: Duration::from_secs(2),
    is_testnet: false,
};

/// Oasis Sapphire, the confidential EVM ParaTime (chain ID 23294).
pub const SAPPHIRE: NetworkInfo = NetworkInfo {
    chain_id: 23294,
    name: "Oasis Sapphire",
    native_currency: ROSE,
    rpc_urls: &["https://sapphire.oasis.io"],
    block_time: Duration::from_secs(6),
    is_testnet: false,
};

/// Oasis Sapphire Testnet (chain ID 23295).
pub const SAPPHIRE_TESTNET: NetworkInfo = NetworkInfo {
    chain_id: 23295,
    name: "Oasis Sapphire Testnet",
    native_currency: NativeCurrency {
        name: "Test Rose",
        symbol: "TEST",
        decimals: 18,
    },
    rpc_urls: &["https://testnet.sapphire.oasis.io"],
    block_time: Duration::from_secs(6),
    is_testnet: true,
};

impl Network {
    /// Every supported network, mainnets before their testnets.
    pub const ALL: [Network; 11] = [
        Network::Ethereum,
        Network::Sepolia,
        Network::Polygon,
        Network::PolygonAmoy,
        Network::Arbitrum,
        Network::Base,
        Network::Optimism,
        Network::Bsc,
        Network::Avalanche,
        Network::Sapphire,
        Network::SapphireTestnet,
    ];

    /// Static parameters of this network.
    pub const fn info(self) -> &'static NetworkInfo {
        match self {
            Network::Ethereum => &ETHEREUM,
            Network::Sepolia => &SEPOLIA,
            Network::Polygon => &POLYGON,
            Network::PolygonAmoy => &POLYGON_AMOY,
            Network::Arbitrum => &ARBITRUM,
            Network::Base => &BASE,
            Network::Optimism => &OPTIMISM,
            Network::Bsc => &BSC,
            Network::Avalanche => &AVALANCHE,
            Network::Sapphire => &SAPPHIRE,
            Network::SapphireTestnet => &SAPPHIRE_TESTNET,
        }
    }

    /// EIP-155 chain id.
    pub const fn chain_id(self) -> u64 {
        self.info().chain_id
    }

    /// Default public RPC endpoint.
    pub fn rpc_url(self) -> &'static str {
        self.info().rpc_urls[0]
    }

    /// Reverse lookup by EIP-155 chain id.
    pub fn from_chain_id(chain_id: u64) -> Option<Network> {
        Network::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }

    /// Lowercase slug used in config files and `Display`.
    pub const fn slug(self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Sepolia => "sepolia",
            Network::Polygon => "polygon",
            Network::PolygonAmoy => "polygon-amoy",
            Network::Arbitrum => "arbitrum",
            Network::Base => "base",
            Network::Optimism => "optimism",
            Network::Bsc => "bsc",
            Network::Avalanche => "avalanche",
            Network::Sapphire => "sapphire",
            Network::SapphireTestnet => "sapphire-testnet",
        }
    }

    /// Prefix of the environment variables that configure this network,
    /// e.g. `POLYGON_AMOY` for `POLYGON_AMOY_RPC_URL`.
    pub fn env_prefix(self) -> String {
        self.slug().replace('-', "_").to_ascii_uppercase()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Network::ALL
            .into_iter()
            .find(|n| n.slug() == wanted)
            .ok_or_else(|| ConfigError::UnknownNetwork(s.to_string()))
    }
}

/// Returns the network definition for a given chain ID, or `None` if unsupported.
pub fn get_chain(chain_id: u64) -> Option<&'static NetworkInfo> {
    Network::from_chain_id(chain_id).map(Network::info)
}

/// Returns all supported network definitions.
pub fn supported_chains() -> Vec<&'static NetworkInfo> {
    Network::ALL.into_iter().map(Network::info).collect()
}
