use std::path::{Path, PathBuf};

use ethers::abi::Abi;
use ethers::types::Bytes;
use eyre::Context;
use serde::Deserialize;
use tracing::{info, instrument};

use super::ContractSpec;
use crate::serde_utils;

/// What a contract factory needs: the ABI and the creation bytecode
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub abi: Abi,
    pub bytecode: Bytes,
}

#[derive(Debug, Deserialize)]
struct ForgeArtifact {
    abi: Abi,
    bytecode: ForgeBytecode,
}

#[derive(Debug, Deserialize)]
struct ForgeBytecode {
    object: String,
}

impl ContractArtifact {
    pub fn path(out_dir: impl AsRef<Path>, spec: &ContractSpec) -> PathBuf {
        out_dir
            .as_ref()
            .join(spec.source_file_name())
            .join(format!("{}.json", spec.name))
    }

    #[instrument(skip_all, fields(contract = %spec))]
    pub async fn load(
        out_dir: impl AsRef<Path>,
        spec: &ContractSpec,
    ) -> eyre::Result<Self> {
        let path = Self::path(out_dir, spec);

        let artifact: ForgeArtifact = serde_utils::read_json(&path)
            .await
            .with_context(|| format!("Loading artifact for {spec}, was it compiled?"))?;

        let artifact = Self::from_forge(artifact)
            .with_context(|| format!("Invalid artifact {}", path.display()))?;

        info!(
            bytecode_len = artifact.bytecode.len(),
            "Loaded artifact for {spec}"
        );

        Ok(artifact)
    }

    fn from_forge(value: ForgeArtifact) -> eyre::Result<Self> {
        let object = value.bytecode.object.trim_start_matches("0x");

        if object.is_empty() {
            eyre::bail!("No bytecode, the contract is abstract or an interface");
        }

        if object.contains("__$") {
            eyre::bail!("Bytecode has unlinked library placeholders");
        }

        let bytecode = hex::decode(object).context("Decoding bytecode")?;

        Ok(Self {
            abi: value.abi,
            bytecode: bytecode.into(),
        })
    }
}
