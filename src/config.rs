//! App configuration - static, never negotiated at runtime.
//!
//! Higher layers construct this (builder, env, or a JS object via serde).

use crate::clarity::{c32, validate_contract_name};
use crate::contract::ContractId;
use crate::error::{WalletError, WalletResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_RELAY_URL: &str = "wss://relay.walletconnect.com";
pub const DEFAULT_DEPLOYER: &str = "SP5K2RHMSBH4PAP4PGX77MCVNK1ZEED07CWX9TJT";
pub const DEFAULT_ADDRESS_TIMEOUT_MS: u64 = 15_000;
const PLACEHOLDER_PROJECT_ID: &str = "YOUR_PROJECT_ID_HERE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Some(Network::Mainnet),
            "testnet" | "test" => Some(Network::Testnet),
            _ => None,
        }
    }

    /// CAIP-2 chain id used in the pairing namespace.
    pub fn chain_id(&self) -> &'static str {
        match self {
            Network::Mainnet => "stacks:1",
            Network::Testnet => "stacks:2147483648",
        }
    }

    pub fn default_api_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.hiro.so",
            Network::Testnet => "https://api.testnet.hiro.so",
        }
    }

    /// Address versions valid on this network (single-sig, multi-sig).
    pub fn address_versions(&self) -> [u8; 2] {
        match self {
            Network::Mainnet => [c32::version::MAINNET_SINGLE_SIG, c32::version::MAINNET_MULTI_SIG],
            Network::Testnet => [c32::version::TESTNET_SINGLE_SIG, c32::version::TESTNET_MULTI_SIG],
        }
    }
}

/// Peer-facing app metadata. `icons` must be non-empty for most wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "ChainStamp".into(),
            description: "Immutable timestamping on Bitcoin via Stacks".into(),
            url: "https://chainstamp.app".into(),
            icons: vec!["https://chainstamp.app/logo.svg".into()],
        }
    }
}

impl AppMetadata {
    /// Metadata for a page served from `origin`.
    pub fn for_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            url: origin.to_string(),
            icons: vec![format!("{origin}/logo.svg")],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Hash,
    Stamp,
    Tag,
}

impl RegistryKind {
    pub const ALL: [RegistryKind; 3] = [RegistryKind::Hash, RegistryKind::Stamp, RegistryKind::Tag];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKind::Hash => "hash",
            RegistryKind::Stamp => "stamp",
            RegistryKind::Tag => "tag",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hash" | "hash-registry" => Some(RegistryKind::Hash),
            "stamp" | "stamp-registry" => Some(RegistryKind::Stamp),
            "tag" | "tag-registry" => Some(RegistryKind::Tag),
            _ => None,
        }
    }
}

/// One deployed registry: contract name and per-call fee in micro-STX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryContract {
    pub name: String,
    pub fee: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractsConfig {
    pub deployer: String,
    pub hash_registry: RegistryContract,
    pub stamp_registry: RegistryContract,
    pub tag_registry: RegistryContract,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            deployer: DEFAULT_DEPLOYER.into(),
            hash_registry: RegistryContract { name: "hash-registry".into(), fee: 30_000 },
            stamp_registry: RegistryContract { name: "stamp-registry".into(), fee: 50_000 },
            tag_registry: RegistryContract { name: "tag-registry".into(), fee: 40_000 },
        }
    }
}

impl ContractsConfig {
    pub fn registry(&self, kind: RegistryKind) -> &RegistryContract {
        match kind {
            RegistryKind::Hash => &self.hash_registry,
            RegistryKind::Stamp => &self.stamp_registry,
            RegistryKind::Tag => &self.tag_registry,
        }
    }

    pub fn contract_id(&self, kind: RegistryKind) -> ContractId {
        ContractId::new(&self.deployer, &self.registry(kind).name)
    }

    pub fn fee(&self, kind: RegistryKind) -> u64 {
        self.registry(kind).fee
    }
}

/// Application configuration. Higher layers construct this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub project_id: String,
    pub relay_url: String,
    pub metadata: AppMetadata,
    pub network: Network,
    pub contracts: ContractsConfig,
    pub api_url: Option<String>,
    pub address_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            relay_url: DEFAULT_RELAY_URL.into(),
            metadata: AppMetadata::default(),
            network: Network::default(),
            contracts: ContractsConfig::default(),
            api_url: None,
            address_timeout_ms: DEFAULT_ADDRESS_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self { project_id: project_id.into(), ..Default::default() }
    }
    pub fn with_network(mut self, network: Network) -> Self { self.network = network; self }
    pub fn with_relay_url(mut self, url: impl Into<String>) -> Self { self.relay_url = url.into(); self }
    pub fn with_metadata(mut self, metadata: AppMetadata) -> Self { self.metadata = metadata; self }
    pub fn with_contracts(mut self, contracts: ContractsConfig) -> Self { self.contracts = contracts; self }
    pub fn with_deployer(mut self, deployer: impl Into<String>) -> Self { self.contracts.deployer = deployer.into(); self }
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self { self.api_url = Some(url.into()); self }
    pub fn with_address_timeout(mut self, timeout: Duration) -> Self {
        self.address_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Read `CHAINSTAMP_*` variables over the defaults.
    pub fn from_env() -> WalletResult<Self> {
        let mut config = Self::default();
        if let Ok(id) = std::env::var("CHAINSTAMP_PROJECT_ID") {
            config.project_id = id;
        }
        if let Ok(net) = std::env::var("CHAINSTAMP_NETWORK") {
            config.network = Network::from_str(&net)
                .ok_or_else(|| WalletError::Config(format!("unknown network '{net}'")))?;
        }
        if let Ok(url) = std::env::var("CHAINSTAMP_RELAY_URL") {
            config.relay_url = url;
        }
        if let Ok(url) = std::env::var("CHAINSTAMP_API_URL") {
            config.api_url = Some(url);
        }
        if let Ok(deployer) = std::env::var("CHAINSTAMP_CONTRACT_ADDRESS") {
            config.contracts.deployer = deployer;
        }
        if let Ok(ms) = std::env::var("CHAINSTAMP_ADDRESS_TIMEOUT_MS") {
            config.address_timeout_ms = ms
                .trim()
                .parse()
                .map_err(|_| WalletError::Config(format!("bad CHAINSTAMP_ADDRESS_TIMEOUT_MS '{ms}'")))?;
        }
        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or_else(|| self.network.default_api_url())
    }

    pub fn address_timeout(&self) -> Duration {
        Duration::from_millis(self.address_timeout_ms)
    }

    pub fn has_project_id(&self) -> bool {
        !self.project_id.trim().is_empty() && self.project_id != PLACEHOLDER_PROJECT_ID
    }

    /// Reject configurations no wallet could act on.
    pub fn validate(&self) -> WalletResult<()> {
        if !self.has_project_id() {
            tracing::warn!("WalletConnect project id not set; pairing will fail until one is configured");
        }
        if self.address_timeout_ms == 0 {
            return Err(WalletError::Config("address timeout must be positive".into()));
        }
        if self.metadata.icons.is_empty() {
            return Err(WalletError::Config("metadata.icons must not be empty".into()));
        }
        let (version, _) = c32::c32_address_decode(&self.contracts.deployer)
            .map_err(|e| WalletError::Config(format!("deployer: {e}")))?;
        if !self.network.address_versions().contains(&version) {
            return Err(WalletError::Config(format!(
                "deployer {} is not a {} address",
                self.contracts.deployer,
                self.network.as_str()
            )));
        }
        for kind in RegistryKind::ALL {
            validate_contract_name(&self.contracts.registry(kind).name)
                .map_err(|e| WalletError::Config(e.to_string()))?;
        }
        Ok(())
    }
}

/// Load `KEY=value` lines into the process env without overriding set vars.
pub fn load_dotenv(path: &Path) -> usize {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return 0;
    };
    let mut loaded = 0;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"');
            if !value.is_empty() && std::env::var(key).is_err() {
                std::env::set_var(key, value);
                loaded += 1;
            }
        }
    }
    loaded
}
