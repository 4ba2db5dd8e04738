use std::path::PathBuf;

use ethers::types::{Address, Bytes};

use super::network::NetworkConnection;
use crate::cli::ProjectArgs;
use crate::config::Config;
use crate::forge_utils::{ContractSpec, ForgeBuild, ForgeVerify};
use crate::report::DeploymentRecord;

pub struct DeploymentContext {
    pub config: Config,
    pub project: ProjectArgs,
    pub connection: NetworkConnection,
}

impl DeploymentContext {
    pub fn record_path(&self, contract_spec: &ContractSpec) -> PathBuf {
        DeploymentRecord::path(
            &self.project.root,
            &self.connection.name,
            contract_spec,
        )
    }

    pub fn forge_verify(
        &self,
        contract_spec: ContractSpec,
        address: Address,
        constructor_args: Bytes,
    ) -> eyre::Result<ForgeVerify> {
        forge_verify(
            &self.config,
            &self.project,
            self.connection.chain_id,
            contract_spec,
            address,
            constructor_args,
        )
    }
}

pub fn out_dir(project: &ProjectArgs) -> PathBuf {
    project.root.join(&project.out)
}

pub fn forge_build(config: &Config, project: &ProjectArgs) -> ForgeBuild {
    ForgeBuild::new(&project.root, config.solidity.clone())
        .with_contracts(&project.contracts)
        .with_out(&project.out)
}

pub fn forge_verify(
    config: &Config,
    project: &ProjectArgs,
    chain_id: u64,
    contract_spec: ContractSpec,
    address: Address,
    constructor_args: Bytes,
) -> eyre::Result<ForgeVerify> {
    let forge_verify = ForgeVerify::new(contract_spec, address)
        .with_root(&project.root)
        .with_chain(chain_id)
        .with_etherscan_api_key(config.etherscan_api_key()?)
        .with_constructor_args(constructor_args)
        .with_solidity(config.solidity.clone());

    Ok(forge_verify)
}
