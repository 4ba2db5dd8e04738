use ethers::types::{Address, TransactionReceipt, H256, U64};
use serde::{Deserialize, Serialize};

use crate::ethers_utils;

#[derive(
    Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    /// Sent, not yet confirmed
    #[display(fmt = "pending")]
    Pending,
    #[display(fmt = "deployed")]
    Deployed,
    #[display(fmt = "failed")]
    Failed,
}

impl DeploymentStatus {
    pub fn from_receipt(receipt: &TransactionReceipt) -> Self {
        if ethers_utils::receipt_succeeded(receipt) {
            Self::Deployed
        } else {
            Self::Failed
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ContractDeployment {
    pub address: Address,
    pub transaction_hash: H256,
    pub deployer: Address,
    #[serde(default)]
    pub block_number: Option<U64>,
    pub status: DeploymentStatus,
}
