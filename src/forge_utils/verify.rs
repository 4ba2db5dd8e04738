use std::path::PathBuf;

use ethers::types::{Address, Bytes};
use eyre::{Context, ContextCompat};
use tracing::{info, instrument};

use super::{ContractSpec, FORGE_BIN};
use crate::config::SolidityConfig;

pub struct ForgeVerify {
    spec: ContractSpec,
    address: Address,
    root: Option<PathBuf>,
    chain: Option<u64>,
    etherscan_api_key: Option<String>,
    constructor_args: Option<Bytes>,
    solidity: Option<SolidityConfig>,
}

impl ForgeVerify {
    pub fn new(spec: ContractSpec, address: Address) -> Self {
        Self {
            spec,
            address,
            root: None,
            chain: None,
            etherscan_api_key: None,
            constructor_args: None,
            solidity: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_chain(mut self, chain: u64) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_etherscan_api_key(
        mut self,
        etherscan_api_key: impl ToString,
    ) -> Self {
        self.etherscan_api_key = Some(etherscan_api_key.to_string());
        self
    }

    /// ABI encoded constructor arguments, without the creation code
    pub fn with_constructor_args(mut self, constructor_args: Bytes) -> Self {
        self.constructor_args = Some(constructor_args);
        self
    }

    pub fn with_solidity(mut self, solidity: SolidityConfig) -> Self {
        self.solidity = Some(solidity);
        self
    }

    fn command(&self) -> eyre::Result<tokio::process::Command> {
        let mut cmd = tokio::process::Command::new(FORGE_BIN);
        cmd.arg("verify-contract");

        cmd.arg("--watch");

        let root = self.root.as_ref().context("Missing root")?;

        cmd.arg("--root");
        cmd.arg(root);

        let chain = self.chain.as_ref().context("Missing chain")?;

        cmd.arg("--chain");
        cmd.arg(chain.to_string());

        let etherscan_api_key = self
            .etherscan_api_key
            .as_ref()
            .context("Missing etherscan api key")?;

        cmd.arg("--etherscan-api-key");
        cmd.arg(etherscan_api_key);

        if let Some(constructor_args) = self
            .constructor_args
            .as_ref()
            .filter(|args| !args.is_empty())
        {
            cmd.arg("--constructor-args");
            cmd.arg(hex::encode(constructor_args));
        }

        if let Some(solidity) = &self.solidity {
            cmd.arg("--compiler-version");
            cmd.arg(&solidity.version);

            if solidity.optimizer.enabled {
                cmd.arg("--num-of-optimizations");
                cmd.arg(solidity.optimizer.runs.to_string());
            }
        }

        cmd.arg(format!("{:?}", self.address));
        cmd.arg(self.spec.to_string());

        Ok(cmd)
    }

    #[instrument(name = "forge_verify", skip_all, fields(contract = %self.spec))]
    pub async fn run(&self) -> eyre::Result<()> {
        let mut cmd = self.command()?;

        // The api key is on the command line, keep it out of the logs
        info!("Verifying {} at {:?}", self.spec, self.address);

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Running `{FORGE_BIN}`, is foundry installed?"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge verify failed: {}", stderr);
        }

        info!("Verified");

        Ok(())
    }
}
