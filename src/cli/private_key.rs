use std::fmt;
use std::str::FromStr;

use ethers::prelude::k256::SecretKey;

#[derive(Clone)]
pub struct PrivateKey {
    pub key: SecretKey,
}

impl FromStr for PrivateKey {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("0x");

        if s.is_empty() {
            eyre::bail!("Private key is empty");
        }

        let bytes = hex::decode(s)?;

        let key = SecretKey::from_slice(&bytes)?;

        Ok(Self { key })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // First well-known anvil development key
    const DEV_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn parses_with_and_without_prefix() -> eyre::Result<()> {
        let bare: PrivateKey = DEV_KEY.parse()?;
        let prefixed: PrivateKey = format!("0x{DEV_KEY}").parse()?;

        assert_eq!(bare.key, prefixed.key);
        assert_eq!(hex::encode(bare.key.to_bytes()), DEV_KEY);

        Ok(())
    }

    #[test]
    fn rejects_missing_key() {
        // An unset variable interpolated into "0x{}"
        let err = "0x".parse::<PrivateKey>().unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn rejects_malformed_key() {
        assert!("0xnot-hex".parse::<PrivateKey>().is_err());
        assert!("0xdeadbeef".parse::<PrivateKey>().is_err());
    }

    #[test]
    fn debug_does_not_leak_key() -> eyre::Result<()> {
        let key: PrivateKey = DEV_KEY.parse()?;
        assert!(!format!("{key:?}").contains(DEV_KEY));
        assert!(!format!("{key:#?}").contains(DEV_KEY));
        Ok(())
    }
}
