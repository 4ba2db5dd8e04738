use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use ethers::types::Address;

pub mod private_key;

pub use private_key::PrivateKey;

use crate::config::ANVIL_NETWORK;
use crate::forge_utils::ContractSpec;

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case", version, about)]
pub struct Args {
    /// Optional TOML file overriding compiler settings and adding networks
    #[clap(long, env = "DEPLOYER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Compile and deploy a contract, then print its address
    Deploy(DeployArgs),
    /// Compile the contracts with the configured compiler settings
    Compile(ProjectArgs),
    /// Verify an already deployed contract on the block explorer
    Verify(VerifyArgs),
    /// Print the assembled configuration with secrets redacted
    Config,
}

#[derive(Debug, Clone, ClapArgs)]
#[clap(rename_all = "kebab-case")]
pub struct NetworkArgs {
    /// Name of the network to use
    #[clap(short, long, env = "DEPLOYER_NETWORK", default_value = ANVIL_NETWORK)]
    pub network: String,
}

#[derive(Debug, Clone, ClapArgs)]
#[clap(rename_all = "kebab-case")]
pub struct ProjectArgs {
    /// Project root, containing the contract sources
    #[clap(long, default_value = ".")]
    pub root: PathBuf,

    /// Contract sources directory, relative to the root
    #[clap(long, default_value = "contracts")]
    pub contracts: PathBuf,

    /// Build artifacts directory, relative to the root
    #[clap(long, default_value = "out")]
    pub out: PathBuf,
}

#[derive(Debug, Clone, ClapArgs)]
#[clap(rename_all = "kebab-case")]
pub struct ContractArgs {
    /// Contract to deploy, either `Name` or `path/to/File.sol:Name`
    ///
    /// Defaults to `NFTContract`, deployed with `BOUNFT BNFT`
    /// when no constructor arguments are given
    #[clap(short, long)]
    pub contract: Option<ContractSpec>,

    /// Constructor arguments, coerced to the constructor's parameter types
    pub constructor_args: Vec<String>,
}

#[derive(Debug, Clone, ClapArgs)]
#[clap(rename_all = "kebab-case")]
pub struct DeployArgs {
    #[clap(flatten)]
    pub network: NetworkArgs,

    #[clap(flatten)]
    pub project: ProjectArgs,

    #[clap(flatten)]
    pub contract: ContractArgs,

    /// Deploy the existing artifacts without running the compiler
    #[clap(long)]
    pub skip_compile: bool,

    /// Number of confirmations to wait for
    #[clap(long, default_value = "1")]
    pub confirmations: usize,

    /// Verify the deployed contract on the block explorer
    #[clap(long)]
    pub verify: bool,

    /// Do not write a deployment record
    #[clap(long)]
    pub no_record: bool,
}

#[derive(Debug, Clone, ClapArgs)]
#[clap(rename_all = "kebab-case")]
pub struct VerifyArgs {
    #[clap(flatten)]
    pub network: NetworkArgs,

    #[clap(flatten)]
    pub project: ProjectArgs,

    #[clap(flatten)]
    pub contract: ContractArgs,

    /// Address of the deployed contract
    #[clap(short, long)]
    pub address: Address,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn deploy_defaults() {
        let args = Args::try_parse_from(["nft-deployer", "deploy"]).unwrap();

        let Command::Deploy(deploy) = args.command else {
            panic!("expected deploy command");
        };

        assert_eq!(deploy.network.network, ANVIL_NETWORK);
        assert!(deploy.contract.contract.is_none());
        assert!(deploy.contract.constructor_args.is_empty());
        assert_eq!(deploy.confirmations, 1);
        assert_eq!(deploy.project.contracts, PathBuf::from("contracts"));
        assert!(!deploy.verify);
    }

    #[test]
    fn deploy_with_contract_and_args() {
        let args = Args::try_parse_from([
            "nft-deployer",
            "deploy",
            "--network",
            "sepolia",
            "--contract",
            "contracts/Token.sol:Token",
            "Name",
            "SYM",
            "1000",
        ])
        .unwrap();

        let Command::Deploy(deploy) = args.command else {
            panic!("expected deploy command");
        };

        assert_eq!(deploy.network.network, "sepolia");
        let contract = deploy.contract.contract.unwrap();
        assert_eq!(contract.name, "Token");
        assert_eq!(deploy.contract.constructor_args, ["Name", "SYM", "1000"]);
    }
}
