pub mod artifact;
pub mod build;
pub mod common;
pub mod verify;

pub use self::artifact::ContractArtifact;
pub use self::build::ForgeBuild;
pub use self::common::ContractSpec;
pub use self::verify::ForgeVerify;

pub const FORGE_BIN: &str = "forge";
