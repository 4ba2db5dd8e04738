use ethers::contract::ContractFactory;
use ethers::providers::Middleware;
use ethers::types::Address;
use eyre::{Context, ContextCompat};
use tracing::{info, instrument};

use self::network::{remote_chain_id, NetworkConnection};
use crate::cli::{ContractArgs, DeployArgs, ProjectArgs, VerifyArgs};
use crate::config::Config;
use crate::ethers_utils;
use crate::forge_utils::{ContractArtifact, ContractSpec};
use crate::report::{ContractDeployment, DeploymentRecord, DeploymentStatus};

pub mod deployment_context;
pub mod network;

pub use self::deployment_context::DeploymentContext;

pub const DEFAULT_CONTRACT: &str = "NFTContract";
pub const DEFAULT_CONSTRUCTOR_ARGS: [&str; 2] = ["BOUNFT", "BNFT"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub contract: ContractSpec,
    pub constructor_args: Vec<String>,
}

impl From<ContractArgs> for DeploymentRequest {
    fn from(args: ContractArgs) -> Self {
        match args.contract {
            Some(contract) => Self {
                contract,
                constructor_args: args.constructor_args,
            },
            None if args.constructor_args.is_empty() => Self {
                contract: ContractSpec::name(DEFAULT_CONTRACT),
                constructor_args: DEFAULT_CONSTRUCTOR_ARGS
                    .iter()
                    .map(|arg| arg.to_string())
                    .collect(),
            },
            None => Self {
                contract: ContractSpec::name(DEFAULT_CONTRACT),
                constructor_args: args.constructor_args,
            },
        }
    }
}

pub async fn compile(config: &Config, project: &ProjectArgs) -> eyre::Result<()> {
    deployment_context::forge_build(config, project).run().await
}

pub async fn run_deployment(
    config: Config,
    cmd: DeployArgs,
) -> eyre::Result<ContractDeployment> {
    let request = DeploymentRequest::from(cmd.contract);
    let network_name = cmd.network.network;
    let network = config.network(&network_name)?.clone();

    if !cmd.skip_compile {
        compile(&config, &cmd.project).await?;
    }

    let artifact = ContractArtifact::load(
        deployment_context::out_dir(&cmd.project),
        &request.contract,
    )
    .await?;

    let connection = NetworkConnection::connect(&network_name, &network).await?;

    let context = DeploymentContext {
        config,
        project: cmd.project,
        connection,
    };

    let deployment = deploy_contract(
        &context.connection,
        artifact.clone(),
        &request,
        cmd.confirmations,
    )
    .await?;

    println!("{}", deployed_line(&request.contract, deployment.address));

    if network.ephemeral {
        info!("Not recording a deployment to a throwaway chain");
    } else if !cmd.no_record {
        let record = DeploymentRecord {
            network: network_name,
            chain_id: context.connection.chain_id,
            contract: request.contract.to_string(),
            constructor_args: request.constructor_args.clone(),
            solidity: context.config.solidity.clone(),
            deployment: deployment.clone(),
        };

        record.write(context.record_path(&request.contract)).await?;
    }

    if cmd.verify {
        let tokens = ethers_utils::tokenize_constructor_args(
            &artifact.abi,
            &request.constructor_args,
        )?;
        let encoded_args = ethers_utils::encode_constructor_args(&tokens);

        context
            .forge_verify(request.contract.clone(), deployment.address, encoded_args)?
            .run()
            .await?;
    }

    Ok(deployment)
}

/// The single stdout line of a successful deployment
pub fn deployed_line(contract: &ContractSpec, address: Address) -> String {
    format!(
        "{} contract successfully deployed to: {:?}",
        contract.name, address
    )
}

/// Sends the creation transaction once and waits for its receipt.
///
/// No retries: a dropped or reverted transaction is an error.
#[instrument(
    skip_all,
    fields(contract = %request.contract, network = %connection.name)
)]
pub async fn deploy_contract(
    connection: &NetworkConnection,
    artifact: ContractArtifact,
    request: &DeploymentRequest,
    confirmations: usize,
) -> eyre::Result<ContractDeployment> {
    let tokens = ethers_utils::tokenize_constructor_args(
        &artifact.abi,
        &request.constructor_args,
    )?;

    let factory = ContractFactory::new(
        artifact.abi,
        artifact.bytecode,
        connection.signer.clone(),
    );

    let deployer = factory
        .deploy_tokens(tokens)
        .context("Building deployment transaction")?;

    let pending = connection
        .signer
        .send_transaction(deployer.tx, None)
        .await
        .context("Sending deployment transaction")?;

    let transaction_hash = pending.tx_hash();

    info!(
        status = %DeploymentStatus::Pending,
        ?transaction_hash,
        confirmations,
        "Deployment transaction sent"
    );

    let receipt = pending
        .confirmations(confirmations)
        .await
        .context("Awaiting deployment receipt")?
        .context("Deployment transaction was dropped")?;

    let status = DeploymentStatus::from_receipt(&receipt);

    if status != DeploymentStatus::Deployed {
        eyre::bail!("Deployment transaction {transaction_hash:?} reverted");
    }

    let address = receipt
        .contract_address
        .context("Receipt has no contract address")?;

    info!(%status, ?address, block = ?receipt.block_number, "Deployed");

    Ok(ContractDeployment {
        address,
        transaction_hash,
        deployer: receipt.from,
        block_number: receipt.block_number,
        status,
    })
}

pub async fn run_verify(config: Config, cmd: VerifyArgs) -> eyre::Result<()> {
    let request = DeploymentRequest::from(cmd.contract);
    let network_name = cmd.network.network;
    let network = config.network(&network_name)?;

    let artifact = ContractArtifact::load(
        deployment_context::out_dir(&cmd.project),
        &request.contract,
    )
    .await?;

    let tokens = ethers_utils::tokenize_constructor_args(
        &artifact.abi,
        &request.constructor_args,
    )?;

    let chain_id = remote_chain_id(&network_name, network).await?;

    deployment_context::forge_verify(
        &config,
        &cmd.project,
        chain_id,
        request.contract,
        cmd.address,
        ethers_utils::encode_constructor_args(&tokens),
    )?
    .run()
    .await
}
