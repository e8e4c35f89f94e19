//! Contract type token grammar.
//!
//! ```text
//! type  := base width? array*  |  "(" type ("," type)* ")" array*
//! base  := letters
//! width := digits ("x" digits)?
//! array := "[" digits? "]"
//! ```
//!
//! Array suffixes are resolved outermost first: `uint8[2][]` is a dynamic
//! array whose elements are `uint8[2]`.

use std::{fmt, sync::LazyLock};

use alloy::dyn_abi::DynSolType;
use regex::Regex;

use crate::ext::{split_top_level, ArgError};

static ARRAY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\[([0-9]*)\]$").expect("array regex is valid"));

static SCALAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z]+)(([0-9]+)(x([0-9]+))?)?$").expect("scalar regex is valid")
});

/// Largest fixed `bytesN` length.
pub const MAX_FIXED_BYTES: usize = 32;

/// Largest integer bit width.
pub const MAX_INT_BITS: usize = 256;

/// Base kind of a type, ignoring any array wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    Bool,
    String,
    Uint,
    Int,
    Bytes,
    Address,
    Tuple,
}

/// Array shape of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    None,
    Dynamic,
    Fixed(usize),
}

/// Parsed contract type.
///
/// Each variant carries exactly the fields meaningful for it, so widths,
/// byte lengths, array lengths and tuple components never coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Bool,
    String,
    Address,
    /// Unsigned integer with its bit width
    Uint(usize),
    /// Signed integer with its bit width
    Int(usize),
    /// Dynamic-length byte string
    Bytes,
    /// `bytesN`, 1 ≤ N ≤ 32
    FixedBytes(usize),
    /// `T[]`
    Array(Box<TypeDescriptor>),
    /// `T[N]`, N > 0
    FixedArray(Box<TypeDescriptor>, usize),
    /// `(T1,T2,...)`
    Tuple(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn base_kind(&self) -> BaseKind {
        match self {
            TypeDescriptor::Bool => BaseKind::Bool,
            TypeDescriptor::String => BaseKind::String,
            TypeDescriptor::Address => BaseKind::Address,
            TypeDescriptor::Uint(_) => BaseKind::Uint,
            TypeDescriptor::Int(_) => BaseKind::Int,
            TypeDescriptor::Bytes | TypeDescriptor::FixedBytes(_) => BaseKind::Bytes,
            TypeDescriptor::Tuple(_) => BaseKind::Tuple,
            TypeDescriptor::Array(inner) | TypeDescriptor::FixedArray(inner, _) => {
                inner.base_kind()
            }
        }
    }

    /// Bit width of an integer type, `None` for everything else.
    pub fn bit_width(&self) -> Option<usize> {
        match self {
            TypeDescriptor::Uint(bits) | TypeDescriptor::Int(bits) => Some(*bits),
            _ => None,
        }
    }

    /// Byte length of a byte string: 0 for dynamic `bytes`, N for `bytesN`.
    pub fn byte_length(&self) -> Option<usize> {
        match self {
            TypeDescriptor::Bytes => Some(0),
            TypeDescriptor::FixedBytes(len) => Some(*len),
            _ => None,
        }
    }

    pub fn array_kind(&self) -> ArrayKind {
        match self {
            TypeDescriptor::Array(_) => ArrayKind::Dynamic,
            TypeDescriptor::FixedArray(_, len) => ArrayKind::Fixed(*len),
            _ => ArrayKind::None,
        }
    }

    /// Element type of an array, `None` for non-array types.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Array(inner) | TypeDescriptor::FixedArray(inner, _) => {
                Some(inner.as_ref())
            }
            _ => None,
        }
    }

    pub fn components(&self) -> Option<&[TypeDescriptor]> {
        match self {
            TypeDescriptor::Tuple(components) => Some(components),
            _ => None,
        }
    }

    /// The equivalent alloy type, used by the encoder.
    pub fn to_sol_type(&self) -> DynSolType {
        match self {
            TypeDescriptor::Bool => DynSolType::Bool,
            TypeDescriptor::String => DynSolType::String,
            TypeDescriptor::Address => DynSolType::Address,
            TypeDescriptor::Uint(bits) => DynSolType::Uint(*bits),
            TypeDescriptor::Int(bits) => DynSolType::Int(*bits),
            TypeDescriptor::Bytes => DynSolType::Bytes,
            TypeDescriptor::FixedBytes(len) => DynSolType::FixedBytes(*len),
            TypeDescriptor::Array(inner) => DynSolType::Array(Box::new(inner.to_sol_type())),
            TypeDescriptor::FixedArray(inner, len) => {
                DynSolType::FixedArray(Box::new(inner.to_sol_type()), *len)
            }
            TypeDescriptor::Tuple(components) => {
                DynSolType::Tuple(components.iter().map(Self::to_sol_type).collect())
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::Address => f.write_str("address"),
            TypeDescriptor::Uint(bits) => write!(f, "uint{bits}"),
            TypeDescriptor::Int(bits) => write!(f, "int{bits}"),
            TypeDescriptor::Bytes => f.write_str("bytes"),
            TypeDescriptor::FixedBytes(len) => write!(f, "bytes{len}"),
            TypeDescriptor::Array(inner) => write!(f, "{inner}[]"),
            TypeDescriptor::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            TypeDescriptor::Tuple(components) => {
                f.write_str("(")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{component}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl std::str::FromStr for TypeDescriptor {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s)
    }
}

/// Parse one type token.
pub fn parse_type(token: &str) -> Result<TypeDescriptor, ArgError> {
    let token = token.trim();
    let invalid = || ArgError::InvalidTypeGrammar(token.to_string());

    // Array suffix takes priority: resolve the base, then wrap it
    if let Some(caps) = ARRAY_REGEX.captures(token) {
        let base = parse_type(&caps[1])?;
        return match &caps[2] {
            "" => Ok(TypeDescriptor::Array(Box::new(base))),
            digits => match digits.parse::<usize>() {
                Ok(len) if len > 0 => Ok(TypeDescriptor::FixedArray(Box::new(base), len)),
                _ => Err(invalid()),
            },
        };
    }

    if let Some(inner) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let components = parse_types(split_top_level(inner)?)?;
        return Ok(TypeDescriptor::Tuple(components));
    }

    let caps = SCALAR_REGEX.captures(token).ok_or_else(invalid)?;
    let width = match caps.get(3) {
        Some(digits) => Some(digits.as_str().parse::<usize>().map_err(|_| invalid())?),
        None => None,
    };
    // `MxN` widths belong to fixed-point types, which are not supported
    if caps.get(4).is_some() {
        return Err(invalid());
    }

    match (&caps[1], width) {
        ("bool", None) => Ok(TypeDescriptor::Bool),
        ("string", None) => Ok(TypeDescriptor::String),
        ("address", None) => Ok(TypeDescriptor::Address),
        ("bytes", None) => Ok(TypeDescriptor::Bytes),
        ("bytes", Some(len)) if (1..=MAX_FIXED_BYTES).contains(&len) => {
            Ok(TypeDescriptor::FixedBytes(len))
        }
        ("uint", Some(bits)) if is_valid_int_width(bits) => Ok(TypeDescriptor::Uint(bits)),
        ("int", Some(bits)) if is_valid_int_width(bits) => Ok(TypeDescriptor::Int(bits)),
        _ => Err(invalid()),
    }
}

/// Parse a list of type tokens, failing on the first invalid one.
pub fn parse_types<I, S>(tokens: I) -> Result<Vec<TypeDescriptor>, ArgError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| parse_type(token.as_ref()))
        .collect()
}

fn is_valid_int_width(bits: usize) -> bool {
    bits > 0 && bits % 8 == 0 && bits <= MAX_INT_BITS
}
