//! Minimal interface descriptors for bare signatures.
//!
//! When a method is called by signature only, there is no interface document
//! to hand to the encoder. [`build_interface`] assembles the single entry such
//! a document would contain, and [`FunctionDescriptor::to_json_abi`] renders
//! it through alloy's own [`JsonAbi`] parser so the result is the same as
//! reading a full document.

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::{Constructor, Function, JsonAbi},
};
use anyhow::Context;
use serde_json::{json, Value};

use crate::ext::{
    decode_arguments, parse_signature, parse_types, ArgError, ArrayKind, DecodedValue,
    TypeDescriptor,
};

/// A function or constructor entry with inputs and no outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// `None` for a constructor
    pub name: Option<String>,
    pub inputs: Vec<TypeDescriptor>,
}

/// Assemble a descriptor. An absent or empty name yields a constructor.
pub fn build_interface(name: Option<&str>, inputs: Vec<TypeDescriptor>) -> FunctionDescriptor {
    FunctionDescriptor {
        name: name.filter(|n| !n.is_empty()).map(str::to_string),
        inputs,
    }
}

impl FunctionDescriptor {
    /// Parse `name(type,...)` into a descriptor.
    pub fn from_signature(signature: &str) -> Result<Self, ArgError> {
        let (name, tokens) = parse_signature(signature)?;
        Ok(build_interface(Some(name), parse_types(tokens)?))
    }

    pub fn is_constructor(&self) -> bool {
        self.name.is_none()
    }

    /// Canonical `name(type,...)` text; constructors render without a name.
    pub fn signature(&self) -> String {
        let inputs = self
            .inputs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({inputs})", self.name.as_deref().unwrap_or_default())
    }

    /// JSON entry in the interface document format.
    pub fn to_json(&self) -> Value {
        let inputs: Vec<Value> = self.inputs.iter().map(param_json).collect();
        match &self.name {
            Some(name) => json!({
                "type": "function",
                "name": name,
                "inputs": inputs,
                "outputs": [],
                "stateMutability": "nonpayable",
            }),
            None => json!({
                "type": "constructor",
                "inputs": inputs,
                "stateMutability": "nonpayable",
            }),
        }
    }

    /// A one-entry interface document holding this descriptor.
    pub fn to_json_abi(&self) -> Result<JsonAbi, serde_json::Error> {
        serde_json::from_value(Value::Array(vec![self.to_json()]))
    }

    /// Encode already decoded values.
    ///
    /// Functions get the 4-byte selector prepended; constructors encode the
    /// arguments only.
    pub fn encode_input(&self, values: &[DecodedValue]) -> anyhow::Result<Vec<u8>> {
        if values.len() != self.inputs.len() {
            return Err(ArgError::ArityMismatch {
                found: values.len(),
                expected: self.inputs.len(),
            }
            .into());
        }

        let sol_values = values
            .iter()
            .zip(&self.inputs)
            .map(|(value, ty)| value.to_sol_value(ty))
            .collect::<Result<Vec<DynSolValue>, _>>()?;

        let abi = self.to_json_abi().context("failed to build interface document")?;
        let encoded = if self.is_constructor() {
            abi_constructor(&abi)?.abi_encode_input(&sol_values)?
        } else {
            abi_function(&abi)?.abi_encode_input(&sol_values)?
        };
        Ok(encoded)
    }

    /// Decode text arguments and encode them.
    pub fn encode_args<S: AsRef<str>>(&self, args: &[S]) -> anyhow::Result<Vec<u8>> {
        let values = decode_arguments(&self.inputs, args)?;
        self.encode_input(&values)
    }
}

fn abi_constructor(abi: &JsonAbi) -> anyhow::Result<&Constructor> {
    abi.constructor().context("interface document has no constructor")
}

fn abi_function(abi: &JsonAbi) -> anyhow::Result<&Function> {
    abi.functions().next().context("interface document has no function")
}

/// Parameter entry. Tuples render as `tuple` plus any array suffix, with the
/// component list taken from the innermost tuple.
fn param_json(ty: &TypeDescriptor) -> Value {
    let mut suffix = String::new();
    let mut base = ty;
    while let Some(inner) = base.element() {
        match base.array_kind() {
            ArrayKind::Fixed(len) => suffix.insert_str(0, &format!("[{len}]")),
            _ => suffix.insert_str(0, "[]"),
        }
        base = inner;
    }

    match base.components() {
        Some(components) => json!({
            "name": "",
            "type": format!("tuple{suffix}"),
            "components": components.iter().map(param_json).collect::<Vec<_>>(),
        }),
        None => json!({ "name": "", "type": ty.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{hex, primitives::Address};

    #[test]
    fn test_transfer_selector() {
        let descriptor = FunctionDescriptor::from_signature("transfer(address,uint256)").unwrap();
        assert!(!descriptor.is_constructor());
        assert_eq!(descriptor.signature(), "transfer(address,uint256)");

        let abi = descriptor.to_json_abi().unwrap();
        let function = abi.function("transfer").unwrap().first().unwrap();
        assert_eq!(function.selector().as_slice(), hex::decode("a9059cbb").unwrap());
        assert!(function.outputs.is_empty());
    }

    #[test]
    fn test_empty_name_is_constructor() {
        let descriptor = build_interface(Some(""), vec![TypeDescriptor::String]);
        assert!(descriptor.is_constructor());
        assert_eq!(descriptor, build_interface(None, vec![TypeDescriptor::String]));

        let abi = descriptor.to_json_abi().unwrap();
        let constructor = abi.constructor().unwrap();
        assert_eq!(constructor.inputs.len(), 1);
        assert_eq!(constructor.inputs[0].ty, "string");
        assert_eq!(abi.functions().count(), 0);
    }

    #[test]
    fn test_matches_full_document() {
        let descriptor =
            FunctionDescriptor::from_signature("submit((address,uint256)[],bytes32)").unwrap();
        let synthesized = descriptor.to_json_abi().unwrap();

        let document: JsonAbi = serde_json::from_str(
            r#"[{
                "type": "function",
                "name": "submit",
                "inputs": [
                    {"name": "", "type": "tuple[]", "components": [
                        {"name": "", "type": "address"},
                        {"name": "", "type": "uint256"}
                    ]},
                    {"name": "", "type": "bytes32"}
                ],
                "outputs": [],
                "stateMutability": "nonpayable"
            }]"#,
        )
        .unwrap();

        assert_eq!(synthesized, document);
        let function = synthesized.functions().next().unwrap();
        assert_eq!(function.signature(), "submit((address,uint256)[],bytes32)");
    }

    #[test]
    fn test_tuple_array_suffixes() {
        let descriptor =
            FunctionDescriptor::from_signature("store((uint8,bool)[2][],uint16[3])").unwrap();
        let abi = descriptor.to_json_abi().unwrap();
        let function = abi.functions().next().unwrap();

        assert_eq!(function.inputs[0].ty, "tuple[2][]");
        assert_eq!(function.inputs[0].components.len(), 2);
        assert_eq!(function.inputs[1].ty, "uint16[3]");
        assert!(function.inputs[1].components.is_empty());
        assert_eq!(function.signature(), "store((uint8,bool)[2][],uint16[3])");
    }

    #[test]
    fn test_encode_function_call() {
        let descriptor = FunctionDescriptor::from_signature("transfer(address,uint256)").unwrap();
        let to = "0x11223344556677889900aabbccddeeff11223344";
        let calldata = descriptor.encode_args(&[to, "1"]).unwrap();

        assert_eq!(calldata.len(), 4 + 32 * 2);
        assert_eq!(&calldata[..4], hex::decode("a9059cbb").unwrap());
        let address: Address = to.parse().unwrap();
        assert_eq!(&calldata[16..36], address.as_slice());
        assert_eq!(calldata[67], 1);
    }

    #[test]
    fn test_encode_constructor_args_only() {
        let descriptor = build_interface(None, vec![TypeDescriptor::Uint(8), TypeDescriptor::Bool]);
        let encoded = descriptor.encode_args(&["7", "true"]).unwrap();

        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 7);
        assert_eq!(encoded[63], 1);
    }

    #[test]
    fn test_encode_rejects_wrong_arity() {
        let descriptor = FunctionDescriptor::from_signature("set(uint256)").unwrap();
        let err = descriptor.encode_args(&["1", "2"]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ArgError>(),
            Some(&ArgError::ArityMismatch {
                found: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn test_encode_reports_out_of_range() {
        let descriptor = FunctionDescriptor::from_signature("set(uint24)").unwrap();
        let err = descriptor.encode_args(&["16777216"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArgError>(),
            Some(ArgError::ValueTypeMismatch(_))
        ));
    }
}
