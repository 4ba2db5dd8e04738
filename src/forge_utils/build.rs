use std::path::{Path, PathBuf};

use eyre::Context;
use tracing::{info, instrument};

use super::FORGE_BIN;
use crate::config::SolidityConfig;

/// Compiles the project through `forge build`
#[derive(Debug)]
pub struct ForgeBuild {
    root: PathBuf,
    contracts: Option<PathBuf>,
    out: Option<PathBuf>,
    solidity: SolidityConfig,
}

impl ForgeBuild {
    pub fn new(root: impl AsRef<Path>, solidity: SolidityConfig) -> Self {
        Self {
            root: root.as_ref().to_owned(),
            contracts: None,
            out: None,
            solidity,
        }
    }

    pub fn with_contracts(mut self, contracts: impl AsRef<Path>) -> Self {
        self.contracts = Some(contracts.as_ref().to_owned());
        self
    }

    pub fn with_out(mut self, out: impl AsRef<Path>) -> Self {
        self.out = Some(out.as_ref().to_owned());
        self
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(FORGE_BIN);
        cmd.arg("build");

        cmd.arg("--root");
        cmd.arg(&self.root);

        if let Some(contracts) = &self.contracts {
            cmd.arg("--contracts");
            cmd.arg(contracts);
        }

        if let Some(out) = &self.out {
            cmd.arg("--out");
            cmd.arg(out);
        }

        cmd.arg("--use");
        cmd.arg(&self.solidity.version);

        let optimizer = self.solidity.optimizer;
        if optimizer.enabled {
            cmd.arg("--optimize");
            cmd.arg("--optimizer-runs");
            cmd.arg(optimizer.runs.to_string());
        }

        cmd
    }

    #[instrument(name = "forge_build", skip_all, fields(solc = %self.solidity.version))]
    pub async fn run(&self) -> eyre::Result<()> {
        let mut cmd = self.command();

        info!("Compiling contracts with {cmd:#?}");

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Running `{FORGE_BIN}`, is foundry installed?"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge build failed: {}", stderr);
        }

        info!("Compiled");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;
    use crate::config::OptimizerConfig;
    use crate::forge_utils::{ContractArtifact, ContractSpec};

    fn args(build: &ForgeBuild) -> Vec<String> {
        build
            .command()
            .as_std()
            .get_args()
            .map(OsStr::to_string_lossy)
            .map(|arg| arg.into_owned())
            .collect()
    }

    #[test]
    fn passes_compiler_settings() {
        let build = ForgeBuild::new(".", SolidityConfig::default())
            .with_contracts("contracts")
            .with_out("out");

        assert_eq!(
            args(&build),
            [
                "build",
                "--root",
                ".",
                "--contracts",
                "contracts",
                "--out",
                "out",
                "--use",
                "0.8.28",
                "--optimize",
                "--optimizer-runs",
                "200",
            ]
        );
    }

    #[test]
    fn disabled_optimizer_ignores_runs() {
        let solidity = SolidityConfig {
            version: "0.8.24".to_string(),
            optimizer: OptimizerConfig {
                enabled: false,
                runs: 10_000,
            },
        };

        let args = args(&ForgeBuild::new("project", solidity));

        assert_eq!(args, ["build", "--root", "project", "--use", "0.8.24"]);
    }

    #[test]
    fn optimizer_runs_only_change_the_runs_arg() {
        let mut solidity = SolidityConfig::default();
        let default_args = args(&ForgeBuild::new(".", solidity.clone()).with_out("out"));

        solidity.optimizer.runs = 1_000_000;
        let tuned_args = args(&ForgeBuild::new(".", solidity).with_out("out"));

        let changed: Vec<_> = default_args
            .iter()
            .zip(&tuned_args)
            .filter(|(default, tuned)| default != tuned)
            .collect();

        assert_eq!(default_args.len(), tuned_args.len());
        assert_eq!(changed, [(&"200".to_string(), &"1000000".to_string())]);

        // The artifact the deployment reads does not depend on compiler settings
        assert_eq!(
            ContractArtifact::path("out", &ContractSpec::name("NFTContract")),
            Path::new("out/NFTContract.sol/NFTContract.json")
        );
    }
}
