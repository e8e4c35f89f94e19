//! Compiled contract artifacts.

use alloy::{hex, json_abi::JsonAbi};
use serde::Deserialize;

use crate::ext::{build_interface, parse_types, ArtifactError, FunctionDescriptor};

/// The parts of a compiler artifact needed to deploy a contract.
///
/// Other fields of the document are ignored. Both fields are optional at
/// parse time and only required by the accessors that read them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    abi: Option<JsonAbi>,
    #[serde(default)]
    bytecode: Option<String>,
}

impl Artifact {
    pub fn from_json(document: &str) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_str(document)?)
    }

    pub fn abi(&self) -> Result<&JsonAbi, ArtifactError> {
        self.abi.as_ref().ok_or(ArtifactError::FieldNotFound("abi"))
    }

    /// Creation bytecode. Must be `0x`-prefixed hex.
    pub fn bytecode(&self) -> Result<Vec<u8>, ArtifactError> {
        let text = self
            .bytecode
            .as_deref()
            .ok_or(ArtifactError::FieldNotFound("bytecode"))?;

        let digits = text
            .strip_prefix("0x")
            .ok_or_else(|| ArtifactError::WrongFieldFormat {
                field: "bytecode",
                reason: "missing 0x prefix".to_string(),
            })?;

        hex::decode(digits).map_err(|e| ArtifactError::WrongFieldFormat {
            field: "bytecode",
            reason: e.to_string(),
        })
    }

    /// Constructor input type tokens in canonical form, tuples as `(a,b)`.
    ///
    /// Empty when the interface has no constructor.
    pub fn constructor_arg_types(&self) -> Result<Vec<String>, ArtifactError> {
        let Some(constructor) = self.abi()?.constructor() else {
            return Ok(Vec::new());
        };

        Ok(constructor
            .inputs
            .iter()
            .map(|param| param.selector_type().into_owned())
            .collect())
    }

    /// Constructor descriptor built from the constructor type tokens.
    pub fn constructor_interface(&self) -> anyhow::Result<FunctionDescriptor> {
        let types = parse_types(self.constructor_arg_types()?)?;
        Ok(build_interface(None, types))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ext::TypeDescriptor;

    const TOKEN: &str = r#"{
        "contractName": "Token",
        "abi": [
            {
                "type": "constructor",
                "inputs": [
                    {"name": "name_", "type": "string", "internalType": "string"},
                    {"name": "symbol_", "type": "string", "internalType": "string"},
                    {"name": "supply", "type": "uint256", "internalType": "uint256"},
                    {"name": "decimals_", "type": "uint8", "internalType": "uint8"}
                ],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "transfer",
                "inputs": [
                    {"name": "to", "type": "address", "internalType": "address"},
                    {"name": "amount", "type": "uint256", "internalType": "uint256"}
                ],
                "outputs": [{"name": "", "type": "bool", "internalType": "bool"}],
                "stateMutability": "nonpayable"
            }
        ],
        "bytecode": "0x608060405234801561001057600080fd5b50"
    }"#;

    #[test]
    fn test_bytecode() {
        let artifact = Artifact::from_json(TOKEN).unwrap();
        assert_eq!(
            artifact.bytecode().unwrap()[..6],
            [0x60, 0x80, 0x60, 0x40, 0x52, 0x34]
        );
    }

    #[test]
    fn test_bytecode_errors() {
        let missing = Artifact::from_json(r#"{"some":"stuff"}"#).unwrap();
        assert!(matches!(
            missing.bytecode(),
            Err(ArtifactError::FieldNotFound("bytecode"))
        ));

        for bad in [r#"{"bytecode":"stuff"}"#, r#"{"bytecode":"00ffaa"}"#, r#"{"bytecode":"0xzz"}"#] {
            let artifact = Artifact::from_json(bad).unwrap();
            assert!(
                matches!(artifact.bytecode(), Err(ArtifactError::WrongFieldFormat { .. })),
                "{} should be rejected",
                bad
            );
        }

        assert!(matches!(
            Artifact::from_json("not json"),
            Err(ArtifactError::Json(_))
        ));
    }

    #[test]
    fn test_constructor_arg_types() {
        let artifact = Artifact::from_json(TOKEN).unwrap();
        assert_eq!(
            artifact.constructor_arg_types().unwrap(),
            vec!["string", "string", "uint256", "uint8"]
        );

        let descriptor = artifact.constructor_interface().unwrap();
        assert!(descriptor.is_constructor());
        assert_eq!(
            descriptor.inputs,
            vec![
                TypeDescriptor::String,
                TypeDescriptor::String,
                TypeDescriptor::Uint(256),
                TypeDescriptor::Uint(8),
            ]
        );
    }

    #[test]
    fn test_constructor_tuple_is_canonical() {
        let artifact = Artifact::from_json(
            r#"{"abi": [{
                "type": "constructor",
                "inputs": [{"name": "cfg", "type": "tuple[]", "components": [
                    {"name": "owner", "type": "address"},
                    {"name": "limit", "type": "uint64"}
                ]}],
                "stateMutability": "nonpayable"
            }]}"#,
        )
        .unwrap();

        assert_eq!(
            artifact.constructor_arg_types().unwrap(),
            vec!["(address,uint64)[]"]
        );
    }

    #[test]
    fn test_no_constructor() {
        let artifact = Artifact::from_json(r#"{"abi": [], "bytecode": "0x00"}"#).unwrap();
        assert!(artifact.constructor_arg_types().unwrap().is_empty());

        let no_abi = Artifact::from_json(r#"{"bytecode": "0x00"}"#).unwrap();
        assert!(matches!(
            no_abi.constructor_arg_types(),
            Err(ArtifactError::FieldNotFound("abi"))
        ));
    }
}
