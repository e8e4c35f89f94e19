//! Text argument decoding.
//!
//! Values arrive as plain strings and are turned into [`DecodedValue`]s
//! following a [`TypeDescriptor`]. Decoding is recursive over array and
//! tuple types and stops at the first failing element.
//!
//! ## Value formats
//!
//! | Type            | Accepted text                                            |
//! |-----------------|----------------------------------------------------------|
//! | `bool`          | `0`, `false`, `1`, `true`                                |
//! | `string`        | anything, passed through                                 |
//! | `uintN`/`intN`  | base-10 integer                                          |
//! | `bytes`/`bytesN`| hex, `0x` prefix optional                                |
//! | `address`       | `0x` + 40 hex digits; `""`, `0x`, `0` mean zero address  |
//! | `T[]`/`T[N]`    | elements separated by `,` (not bracket-aware)            |
//! | `(T1,...)`      | components separated by top-level `,`, parens optional   |

use std::sync::LazyLock;

use alloy::{
    dyn_abi::DynSolValue,
    hex,
    primitives::{Address, B256, I256, U256},
};
use num_bigint::BigInt;
use regex::Regex;
use tracing::{debug, trace};

use crate::ext::{split_top_level, ArgError, TypeDescriptor};

static ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("address regex is valid"));

// ============================================================================
// Decoded Values
// ============================================================================

/// A typed argument value.
///
/// Integers of width 8/16/32/64 use machine integers; every other width is
/// kept as an arbitrary-precision integer whose range is checked only when
/// converting to an encoder value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Bool(bool),
    String(String),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    BigInt(BigInt),
    Bytes(Vec<u8>),
    /// Exactly as many bytes as the `bytesN` type declares
    FixedBytes(Vec<u8>),
    Address(Address),
    Array(Vec<DecodedValue>),
    FixedArray(Box<[DecodedValue]>),
    Tuple(Vec<DecodedValue>),
}

impl DecodedValue {
    /// Integer payload of any integer variant.
    pub fn as_integer(&self) -> Option<BigInt> {
        let n = match self {
            DecodedValue::Uint8(v) => BigInt::from(*v),
            DecodedValue::Uint16(v) => BigInt::from(*v),
            DecodedValue::Uint32(v) => BigInt::from(*v),
            DecodedValue::Uint64(v) => BigInt::from(*v),
            DecodedValue::Int8(v) => BigInt::from(*v),
            DecodedValue::Int16(v) => BigInt::from(*v),
            DecodedValue::Int32(v) => BigInt::from(*v),
            DecodedValue::Int64(v) => BigInt::from(*v),
            DecodedValue::BigInt(v) => v.clone(),
            _ => return None,
        };
        Some(n)
    }

    /// Convert into the alloy value the encoder consumes.
    ///
    /// Integers are range-checked against the declared bit width here.
    pub fn to_sol_value(&self, ty: &TypeDescriptor) -> Result<DynSolValue, ArgError> {
        let shape_mismatch =
            || ArgError::ValueTypeMismatch(format!("{self:?} is not a value of type {ty}"));

        match (ty, self) {
            (TypeDescriptor::Uint(bits), _) | (TypeDescriptor::Int(bits), _) => {
                let n = self.as_integer().ok_or_else(shape_mismatch)?;
                sol_integer(&n, matches!(ty, TypeDescriptor::Int(_)), *bits)
            }
            (TypeDescriptor::Bool, DecodedValue::Bool(b)) => Ok(DynSolValue::Bool(*b)),
            (TypeDescriptor::String, DecodedValue::String(s)) => Ok(DynSolValue::String(s.clone())),
            (TypeDescriptor::Address, DecodedValue::Address(a)) => Ok(DynSolValue::Address(*a)),
            (TypeDescriptor::Bytes, DecodedValue::Bytes(b)) => Ok(DynSolValue::Bytes(b.clone())),
            (TypeDescriptor::FixedBytes(len), DecodedValue::FixedBytes(b)) => {
                if b.len() != *len {
                    return Err(ArgError::InvalidByteLength {
                        expected: *len,
                        found: b.len(),
                    });
                }
                Ok(DynSolValue::FixedBytes(B256::right_padding_from(b), *len))
            }
            (TypeDescriptor::Array(inner), DecodedValue::Array(items)) => items
                .iter()
                .map(|item| item.to_sol_value(inner))
                .collect::<Result<_, _>>()
                .map(DynSolValue::Array),
            (TypeDescriptor::FixedArray(inner, len), DecodedValue::FixedArray(items))
                if items.len() == *len =>
            {
                items
                    .iter()
                    .map(|item| item.to_sol_value(inner))
                    .collect::<Result<_, _>>()
                    .map(DynSolValue::FixedArray)
            }
            (TypeDescriptor::Tuple(components), DecodedValue::Tuple(items))
                if items.len() == components.len() =>
            {
                components
                    .iter()
                    .zip(items)
                    .map(|(component, item)| item.to_sol_value(component))
                    .collect::<Result<_, _>>()
                    .map(DynSolValue::Tuple)
            }
            _ => Err(shape_mismatch()),
        }
    }
}

fn sol_integer(n: &BigInt, signed: bool, bits: usize) -> Result<DynSolValue, ArgError> {
    let one = BigInt::from(1u8);
    let (min, max) = if signed {
        let half = one.clone() << (bits - 1);
        (-half.clone(), half - one)
    } else {
        (BigInt::from(0u8), (one.clone() << bits) - one)
    };

    let name = if signed { "int" } else { "uint" };
    let digits = n.to_string();
    if *n < min || *n > max {
        return Err(ArgError::mismatch(&digits, format!("does not fit in {name}{bits}")));
    }

    let converted = if signed {
        I256::from_dec_str(&digits)
            .map(|v| DynSolValue::Int(v, bits))
            .map_err(|e| e.to_string())
    } else {
        U256::from_str_radix(&digits, 10)
            .map(|v| DynSolValue::Uint(v, bits))
            .map_err(|e| e.to_string())
    };
    converted.map_err(|e| ArgError::mismatch(&digits, format!("cannot convert to {name}{bits}: {e}")))
}

// ============================================================================
// Argument Specs
// ============================================================================

/// A type paired with the raw text supplied for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpec<'a> {
    pub ty: &'a TypeDescriptor,
    pub value: &'a str,
}

impl ArgumentSpec<'_> {
    pub fn decode(&self) -> Result<DecodedValue, ArgError> {
        decode_argument(self.ty, self.value)
    }
}

/// Pair types with values, failing when the counts differ.
pub fn pair_arguments<'a, S: AsRef<str>>(
    types: &'a [TypeDescriptor],
    values: &'a [S],
) -> Result<Vec<ArgumentSpec<'a>>, ArgError> {
    if types.len() != values.len() {
        return Err(ArgError::ArityMismatch {
            found: values.len(),
            expected: types.len(),
        });
    }

    Ok(types
        .iter()
        .zip(values)
        .map(|(ty, value)| ArgumentSpec {
            ty,
            value: value.as_ref(),
        })
        .collect())
}

/// Decode an argument list against its expected types.
///
/// The arity is checked before any element is decoded.
pub fn decode_arguments<S: AsRef<str>>(
    types: &[TypeDescriptor],
    values: &[S],
) -> Result<Vec<DecodedValue>, ArgError> {
    let specs = pair_arguments(types, values)?;
    debug!(count = specs.len(), "decoding arguments");

    specs.iter().map(ArgumentSpec::decode).collect()
}

/// Decode an argument list straight into encoder values.
pub fn encode_arguments<S: AsRef<str>>(
    types: &[TypeDescriptor],
    values: &[S],
) -> Result<Vec<DynSolValue>, ArgError> {
    decode_arguments(types, values)?
        .iter()
        .zip(types)
        .map(|(value, ty)| value.to_sol_value(ty))
        .collect()
}

// ============================================================================
// Per-Type Decoding
// ============================================================================

/// Decode one text value.
pub fn decode_argument(ty: &TypeDescriptor, value: &str) -> Result<DecodedValue, ArgError> {
    trace!(%ty, value, "decoding argument");

    match ty {
        TypeDescriptor::Bool => match value {
            "0" | "false" => Ok(DecodedValue::Bool(false)),
            "1" | "true" => Ok(DecodedValue::Bool(true)),
            _ => Err(ArgError::mismatch(value, "cannot be cast to bool")),
        },
        TypeDescriptor::String => Ok(DecodedValue::String(value.to_string())),
        TypeDescriptor::Uint(bits) => decode_integer(value, false, *bits),
        TypeDescriptor::Int(bits) => decode_integer(value, true, *bits),
        TypeDescriptor::Bytes => decode_hex(value).map(DecodedValue::Bytes),
        TypeDescriptor::FixedBytes(len) => {
            let bytes = decode_hex(value)?;
            if bytes.len() != *len {
                return Err(ArgError::InvalidByteLength {
                    expected: *len,
                    found: bytes.len(),
                });
            }
            Ok(DecodedValue::FixedBytes(bytes))
        }
        TypeDescriptor::Address => decode_address(value),
        TypeDescriptor::Array(inner) => decode_elements(inner, value).map(DecodedValue::Array),
        TypeDescriptor::FixedArray(inner, len) => {
            let elements = decode_elements(inner, value)?;
            if elements.len() != *len {
                return Err(ArgError::mismatch(
                    value,
                    format!("has {} elements, expected {len}", elements.len()),
                ));
            }
            Ok(DecodedValue::FixedArray(elements.into_boxed_slice()))
        }
        TypeDescriptor::Tuple(components) => decode_tuple(components, value),
    }
}

fn decode_integer(value: &str, signed: bool, bits: usize) -> Result<DecodedValue, ArgError> {
    let parsed = match (signed, bits) {
        (false, 8) => value.parse().map(DecodedValue::Uint8),
        (false, 16) => value.parse().map(DecodedValue::Uint16),
        (false, 32) => value.parse().map(DecodedValue::Uint32),
        (false, 64) => value.parse().map(DecodedValue::Uint64),
        (true, 8) => value.parse().map(DecodedValue::Int8),
        (true, 16) => value.parse().map(DecodedValue::Int16),
        (true, 32) => value.parse().map(DecodedValue::Int32),
        (true, 64) => value.parse().map(DecodedValue::Int64),
        _ => {
            return value
                .parse::<BigInt>()
                .map(DecodedValue::BigInt)
                .map_err(|e| ArgError::mismatch(value, format!("cannot parse as integer: {e}")))
        }
    };

    let name = if signed { "int" } else { "uint" };
    parsed.map_err(|e| ArgError::mismatch(value, format!("cannot parse as {name}{bits}: {e}")))
}

fn decode_hex(value: &str) -> Result<Vec<u8>, ArgError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    let decoded = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };
    decoded.map_err(|e| ArgError::mismatch(value, format!("is not valid hex: {e}")))
}

fn decode_address(value: &str) -> Result<DecodedValue, ArgError> {
    if matches!(value, "0x" | "" | "0") {
        return Ok(DecodedValue::Address(Address::ZERO));
    }
    if !ADDRESS_REGEX.is_match(value) {
        return Err(ArgError::mismatch(value, "does not match address format"));
    }
    value
        .parse::<Address>()
        .map(DecodedValue::Address)
        .map_err(|e| ArgError::mismatch(value, e))
}

fn decode_elements(element: &TypeDescriptor, value: &str) -> Result<Vec<DecodedValue>, ArgError> {
    // Plain comma split: element text cannot itself contain commas
    value
        .split(',')
        .map(|item| decode_argument(element, item))
        .collect()
}

fn decode_tuple(components: &[TypeDescriptor], value: &str) -> Result<DecodedValue, ArgError> {
    let trimmed = value.trim();
    // Outer parentheses are optional when they wrap the whole value
    let parts = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) if split_top_level(trimmed)?.len() == 1 => split_top_level(inner)?,
        _ => split_top_level(trimmed)?,
    };

    if parts.len() != components.len() {
        return Err(ArgError::mismatch(
            value,
            format!("has {} components, expected {}", parts.len(), components.len()),
        ));
    }

    components
        .iter()
        .zip(parts)
        .map(|(component, part)| decode_argument(component, part))
        .collect::<Result<_, _>>()
        .map(DecodedValue::Tuple)
}
