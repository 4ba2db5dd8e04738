use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::SolidityConfig;
use crate::forge_utils::ContractSpec;
use crate::serde_utils;

pub mod contract_deployment;

pub use self::contract_deployment::{ContractDeployment, DeploymentStatus};

pub const DEPLOYMENTS_DIR: &str = "deployments";

/// What was deployed where, written after every successful deployment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub network: String,
    pub chain_id: u64,
    pub contract: String,
    #[serde(default)]
    pub constructor_args: Vec<String>,
    pub solidity: SolidityConfig,
    pub deployment: ContractDeployment,
}

impl DeploymentRecord {
    /// `<root>/deployments/<network>/<Name>.yml`
    pub fn path(
        root: impl AsRef<Path>,
        network: &str,
        contract: &ContractSpec,
    ) -> PathBuf {
        root.as_ref()
            .join(DEPLOYMENTS_DIR)
            .join(network)
            .join(format!("{}.yml", contract.name))
    }

    /// Overwrites any previous record, every run is a new deployment
    #[instrument(skip_all, fields(contract = %self.contract, network = %self.network))]
    pub async fn write(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        let path = path.as_ref();

        if path.exists() {
            match serde_utils::read_deserialize::<Self>(path).await {
                Ok(previous) => info!(
                    previous = ?previous.deployment.address,
                    "Superseding previous deployment"
                ),
                Err(err) => warn!("Replacing unreadable record: {err:#}"),
            }
        }

        serde_utils::write_serialize(path, self).await?;

        info!("Deployment record written to {}", path.display());

        Ok(())
    }
}
