use clap::Parser;
use cli::{Args, Command};
use config::Config;
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub mod ethers_utils;
pub mod forge_utils;
pub mod serde_utils;

mod cli;
mod config;
mod deployment;
mod report;

async fn start() -> eyre::Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).await?;

    match args.command {
        Command::Deploy(cmd) => {
            deployment::run_deployment(config, cmd).await?;
        }
        Command::Compile(project) => {
            deployment::compile(&config, &project).await?;
        }
        Command::Verify(cmd) => {
            deployment::run_verify(config, cmd).await?;
        }
        Command::Config => {
            print!("{}", serde_yaml::to_string(&config.redacted())?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    dotenv::dotenv().ok();

    let indicatif_layer = IndicatifLayer::new();

    let filter = EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    match start().await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!("{:?}", err);
            std::process::exit(1)
        }
    }
}
