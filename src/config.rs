use std::collections::BTreeMap;
use std::path::Path;

use eyre::{Context, ContextCompat};
use serde::{Deserialize, Serialize};

use crate::cli::PrivateKey;
use crate::serde_utils;

pub const ALCHEMY_API_URL: &str = "ALCHEMY_API_URL";
pub const RPC_URL: &str = "RPC_URL";
pub const ACCOUNT_PRIVATE_KEY: &str = "ACCOUNT_PRIVATE_KEY";
pub const ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";

pub const ANVIL_NETWORK: &str = "anvil";

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub solidity: SolidityConfig,
    pub networks: BTreeMap<String, NetworkConfig>,
    #[serde(default)]
    pub etherscan: EtherscanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidityConfig {
    pub version: String,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub enabled: bool,
    pub runs: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub accounts: Vec<String>,

    /// Served by a throwaway local anvil chain instead of a remote endpoint
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ephemeral: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtherscanConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Layout of the optional TOML config file, every section is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub solidity: Option<SolidityConfig>,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    pub etherscan: Option<EtherscanConfig>,
}

impl Default for SolidityConfig {
    fn default() -> Self {
        Self {
            version: "0.8.28".to_string(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            runs: 200,
        }
    }
}

impl NetworkConfig {
    pub fn ephemeral() -> Self {
        Self {
            url: None,
            accounts: vec![],
            ephemeral: true,
        }
    }

    pub fn remote(url: Option<String>, accounts: Vec<String>) -> Self {
        Self {
            url,
            accounts,
            ephemeral: false,
        }
    }

    pub fn signer_keys(&self) -> eyre::Result<Vec<PrivateKey>> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(idx, account)| {
                account
                    .parse()
                    .with_context(|| format!("Parsing account #{idx}"))
            })
            .collect()
    }

    fn expand(self, lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            url: self.url.map(|url| expand_env(&url, lookup)),
            accounts: self
                .accounts
                .iter()
                .map(|account| expand_env(account, lookup))
                .collect(),
            ephemeral: self.ephemeral,
        }
    }
}

impl Config {
    /// Assembles the configuration from the process environment.
    ///
    /// Missing variables are not reported here, they surface once the
    /// network that needs them is used.
    pub fn from_env() -> Self {
        Self::from_vars(|name: &str| std::env::var(name).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let account = format!("0x{}", var(ACCOUNT_PRIVATE_KEY).unwrap_or_default());

        let mut networks = BTreeMap::new();
        networks.insert(ANVIL_NETWORK.to_string(), NetworkConfig::ephemeral());
        networks.insert(
            "sepolia".to_string(),
            NetworkConfig::remote(var(ALCHEMY_API_URL), vec![account.clone()]),
        );
        networks.insert(
            "holesky".to_string(),
            NetworkConfig::remote(var(RPC_URL), vec![account]),
        );

        Self {
            solidity: SolidityConfig::default(),
            networks,
            etherscan: EtherscanConfig {
                api_key: var(ETHERSCAN_API_KEY),
            },
        }
    }

    pub async fn load(path: Option<&Path>) -> eyre::Result<Self> {
        let config = Self::from_env();

        let Some(path) = path else {
            return Ok(config);
        };

        let file: ConfigFile = serde_utils::read_toml(path).await?;

        Ok(config.merge(file, &|name: &str| std::env::var(name).ok()))
    }

    /// Overlays a config file, expanding `${VAR}` placeholders in urls,
    /// accounts and the api key.
    pub fn merge(
        mut self,
        file: ConfigFile,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Self {
        if let Some(solidity) = file.solidity {
            self.solidity = solidity;
        }

        for (name, network) in file.networks {
            self.networks.insert(name, network.expand(lookup));
        }

        // A table without `api_key` keeps the key from the environment
        if let Some(key) = file.etherscan.and_then(|etherscan| etherscan.api_key) {
            self.etherscan.api_key =
                Some(expand_env(&key, lookup)).filter(|key| !key.is_empty());
        }

        self
    }

    pub fn network(&self, name: &str) -> eyre::Result<&NetworkConfig> {
        self.networks.get(name).with_context(|| {
            let known: Vec<&str> =
                self.networks.keys().map(String::as_str).collect();
            format!(
                "Unknown network `{name}`, known networks: {}",
                known.join(", ")
            )
        })
    }

    pub fn etherscan_api_key(&self) -> eyre::Result<&str> {
        self.etherscan
            .api_key
            .as_deref()
            .with_context(|| format!("Missing etherscan api key, set {ETHERSCAN_API_KEY}"))
    }

    pub fn redacted(&self) -> Self {
        let mut config = self.clone();

        for network in config.networks.values_mut() {
            for account in &mut network.accounts {
                if account.trim_start_matches("0x").is_empty() {
                    continue;
                }

                *account = REDACTED.to_string();
            }
        }

        if config.etherscan.api_key.is_some() {
            config.etherscan.api_key = Some(REDACTED.to_string());
        }

        config
    }
}

/// Expands `${NAME}` placeholders, unset variables expand to nothing
fn expand_env(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };

        out.push_str(&rest[..start]);

        let name = &rest[start + 2..start + 2 + len];
        out.push_str(&lookup(name).unwrap_or_default());

        rest = &rest[start + 3 + len..];
    }

    out.push_str(rest);
    out
}
