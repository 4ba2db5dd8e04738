use std::sync::Arc;
use std::time::Duration;

use ethers::prelude::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer, Wallet};
use ethers::utils::{Anvil, AnvilInstance};
use eyre::{Context, ContextCompat};
use reqwest::Url;
use tracing::{info, instrument};

use crate::cli::PrivateKey;
use crate::config::NetworkConfig;

pub type RpcSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

const ANVIL_BIN: &str = "anvil";
const DEVNET_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A signing client bound to one network
pub struct NetworkConnection {
    pub name: String,
    pub chain_id: u64,
    pub signer: Arc<RpcSigner>,
    // Keeps the local chain alive, it is killed on drop
    _devnet: Option<AnvilInstance>,
}

impl NetworkConnection {
    #[instrument(skip(network))]
    pub async fn connect(name: &str, network: &NetworkConfig) -> eyre::Result<Self> {
        let devnet = if network.ephemeral {
            Some(spawn_devnet().await?)
        } else {
            None
        };

        let rpc_url = match devnet.as_ref() {
            Some(devnet) => devnet.endpoint().parse()?,
            None => rpc_url(name, network)?,
        };

        let key = match devnet.as_ref() {
            Some(devnet) if network.accounts.is_empty() => PrivateKey {
                key: devnet
                    .keys()
                    .first()
                    .context("Local chain has no funded accounts")?
                    .clone(),
            },
            _ => network
                .signer_keys()
                .with_context(|| format!("Loading accounts of network `{name}`"))?
                .into_iter()
                .next()
                .with_context(|| format!("Network `{name}` has no accounts configured"))?,
        };

        let mut provider = Provider::<Http>::try_from(rpc_url.as_str())?;
        if devnet.is_some() {
            provider = provider.interval(DEVNET_POLL_INTERVAL);
        }

        let chain_id = fetch_chain_id(name, &provider, &rpc_url).await?;

        let wallet = Wallet::from(key.key).with_chain_id(chain_id);
        let deployer = wallet.address();

        info!(chain_id, ?deployer, "Connected to {name}");

        Ok(Self {
            name: name.to_string(),
            chain_id,
            signer: Arc::new(SignerMiddleware::new(provider, wallet)),
            _devnet: devnet,
        })
    }
}

/// Resolves the chain id of a remote network without loading its accounts
pub async fn remote_chain_id(name: &str, network: &NetworkConfig) -> eyre::Result<u64> {
    if network.ephemeral {
        eyre::bail!("Network `{name}` is a throwaway local chain");
    }

    let rpc_url = rpc_url(name, network)?;
    let provider = Provider::<Http>::try_from(rpc_url.as_str())?;

    fetch_chain_id(name, &provider, &rpc_url).await
}

fn rpc_url(name: &str, network: &NetworkConfig) -> eyre::Result<Url> {
    let url = network
        .url
        .as_deref()
        .with_context(|| format!("Network `{name}` has no RPC url configured"))?;

    url.parse()
        .with_context(|| format!("Parsing RPC url of network `{name}`"))
}

async fn fetch_chain_id(
    name: &str,
    provider: &Provider<Http>,
    rpc_url: &Url,
) -> eyre::Result<u64> {
    // Only the host, the path of hosted endpoints carries the api key
    let host = rpc_url.host_str().unwrap_or_default();

    let chain_id = provider.get_chainid().await.with_context(|| {
        format!("Connecting to network `{name}` at {host}")
    })?;

    Ok(chain_id.as_u64())
}

async fn spawn_devnet() -> eyre::Result<AnvilInstance> {
    ensure_installed(ANVIL_BIN).await?;

    // `spawn` panics on failure and blocks on the child's stdout
    let devnet = tokio::task::spawn_blocking(|| Anvil::new().spawn())
        .await
        .context("Spawning local anvil chain")?;

    info!(endpoint = %devnet.endpoint(), "Spawned local chain");

    Ok(devnet)
}

async fn ensure_installed(bin: &str) -> eyre::Result<()> {
    tokio::process::Command::new(bin)
        .arg("--version")
        .output()
        .await
        .with_context(|| format!("Running `{bin}`, is foundry installed?"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn missing_private_key_fails_before_connecting() {
        // Nothing listens on this endpoint, the key must be rejected first
        let network = NetworkConfig::remote(
            Some("http://127.0.0.1:1".to_string()),
            vec!["0x".to_string()],
        );

        let err = NetworkConnection::connect("sepolia", &network)
            .await
            .err()
            .unwrap();

        let err = format!("{err:#}");
        assert!(err.contains("Loading accounts of network `sepolia`"), "{err}");
        assert!(err.contains("Private key is empty"), "{err}");
    }

    #[tokio::test]
    async fn missing_url_is_reported() {
        let network = NetworkConfig::remote(None, vec![DEV_KEY.to_string()]);

        let err = NetworkConnection::connect("holesky", &network)
            .await
            .err()
            .unwrap();

        assert!(err.to_string().contains("has no RPC url configured"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_error() {
        let network = NetworkConfig::remote(
            Some("http://127.0.0.1:1/v2/secret".to_string()),
            vec![DEV_KEY.to_string()],
        );

        let err = NetworkConnection::connect("sepolia", &network)
            .await
            .err()
            .unwrap();

        let message = err.to_string();
        assert!(message.contains("Connecting to network `sepolia`"), "{message}");
        assert!(!message.contains("secret"), "{message}");
    }

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let err = ensure_installed("anvil-not-installed-here")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("is foundry installed?"), "{err}");
    }

    #[tokio::test]
    async fn chain_id_of_ephemeral_network_is_rejected() {
        let err = remote_chain_id("anvil", &NetworkConfig::ephemeral())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("throwaway local chain"));
    }
}
