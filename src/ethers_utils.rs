use ethers::abi::token::{LenientTokenizer, Tokenizer};
use ethers::abi::{Abi, Token};
use ethers::types::{Bytes, TransactionReceipt};
use eyre::{bail, Context};

/// Coerces string arguments to the constructor's parameter types.
///
/// A contract without a declared constructor takes no arguments.
pub fn tokenize_constructor_args(
    abi: &Abi,
    args: &[String],
) -> eyre::Result<Vec<Token>> {
    let params = abi
        .constructor()
        .map(|constructor| constructor.inputs.as_slice())
        .unwrap_or_default();

    if params.len() != args.len() {
        let signature: Vec<String> = params
            .iter()
            .map(|param| format!("{} {}", param.kind, param.name))
            .collect();

        bail!(
            "Constructor takes {} arguments ({}), got {}",
            params.len(),
            signature.join(", "),
            args.len()
        );
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            LenientTokenizer::tokenize(&param.kind, arg).with_context(|| {
                format!(
                    "Parsing constructor argument `{}` as {}: {arg:?}",
                    param.name, param.kind
                )
            })
        })
        .collect()
}

/// ABI encoding of the constructor arguments, as appended to creation code
pub fn encode_constructor_args(tokens: &[Token]) -> Bytes {
    ethers::abi::encode(tokens).into()
}

pub fn receipt_succeeded(receipt: &TransactionReceipt) -> bool {
    receipt.status == Some(1.into())
}

#[cfg(test)]
mod tests {
    use ethers::types::U256;

    use super::*;

    fn abi(json: &str) -> Abi {
        serde_json::from_str(json).unwrap()
    }

    fn nft_abi() -> Abi {
        abi(r#"[{
            "type": "constructor",
            "inputs": [
                { "name": "name", "type": "string" },
                { "name": "symbol", "type": "string" }
            ]
        }]"#)
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn tokenizes_string_args() -> eyre::Result<()> {
        let tokens =
            tokenize_constructor_args(&nft_abi(), &strings(&["BOUNFT", "BNFT"]))?;

        assert_eq!(
            tokens,
            vec![
                Token::String("BOUNFT".to_string()),
                Token::String("BNFT".to_string()),
            ]
        );

        Ok(())
    }

    #[test]
    fn coerces_numbers_and_addresses() -> eyre::Result<()> {
        let abi = abi(r#"[{
            "type": "constructor",
            "inputs": [
                { "name": "supply", "type": "uint256" },
                { "name": "owner", "type": "address" }
            ]
        }]"#);

        let tokens = tokenize_constructor_args(
            &abi,
            &strings(&["1000", "0x5fbdb2315678afecb367f032d93f642f64180aa3"]),
        )?;

        assert_eq!(tokens[0], Token::Uint(U256::from(1000)));
        assert!(matches!(tokens[1], Token::Address(_)));

        Ok(())
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = tokenize_constructor_args(&nft_abi(), &strings(&["BOUNFT"]))
            .unwrap_err()
            .to_string();

        assert!(err.contains("takes 2 arguments"), "{err}");
        assert!(err.contains("string symbol"), "{err}");
    }

    #[test]
    fn rejects_uncoercible_arg() {
        let abi = abi(r#"[{
            "type": "constructor",
            "inputs": [{ "name": "supply", "type": "uint256" }]
        }]"#);

        let err = tokenize_constructor_args(&abi, &strings(&["lots"])).unwrap_err();

        assert!(err.to_string().contains("`supply` as uint256"));
    }

    #[test]
    fn no_constructor_takes_no_args() -> eyre::Result<()> {
        assert!(tokenize_constructor_args(&Abi::default(), &[])?.is_empty());
        assert!(tokenize_constructor_args(&Abi::default(), &strings(&["x"])).is_err());
        Ok(())
    }

    #[test]
    fn receipt_status() {
        let mut receipt = TransactionReceipt {
            status: Some(1.into()),
            ..Default::default()
        };
        assert!(receipt_succeeded(&receipt));

        receipt.status = Some(0.into());
        assert!(!receipt_succeeded(&receipt));
    }
}
