//! Selector and argument-schema derivation

use std::borrow::Cow;

use alloy_json_abi::Function;
use alloy_primitives::{keccak256, Bytes, Selector};

use super::DecodeError;

/// Calldata as handed over by a transaction source.
///
/// RPC clients return `input` either as a `0x`-prefixed hex string or as raw
/// bytes; every reader of calldata accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calldata<'a> {
    Hex(&'a str),
    Raw(&'a [u8]),
}

impl<'a> Calldata<'a> {
    /// Full calldata as bytes, selector included
    pub fn to_bytes(self) -> Result<Cow<'a, [u8]>, DecodeError> {
        match self {
            Self::Hex(s) => Ok(Cow::Owned(hex::decode(strip_hex_prefix(s))?)),
            Self::Raw(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

impl<'a> From<&'a str> for Calldata<'a> {
    fn from(value: &'a str) -> Self {
        Self::Hex(value)
    }
}

impl<'a> From<&'a [u8]> for Calldata<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Raw(value)
    }
}

impl<'a> From<&'a Bytes> for Calldata<'a> {
    fn from(value: &'a Bytes) -> Self {
        Self::Raw(value.as_ref())
    }
}

/// Extract the 4-byte selector that prefixes `calldata`
pub fn selector_of<'a>(calldata: impl Into<Calldata<'a>>) -> Result<Selector, DecodeError> {
    match calldata.into() {
        Calldata::Hex(s) => {
            let payload = strip_hex_prefix(s);
            let head = payload
                .get(..8)
                .ok_or(DecodeError::TooShort { len: payload.len() / 2 })?;
            let bytes = hex::decode(head)?;
            Ok(Selector::from_slice(&bytes))
        }
        Calldata::Raw(bytes) => {
            let head = bytes
                .get(..4)
                .ok_or(DecodeError::TooShort { len: bytes.len() })?;
            Ok(Selector::from_slice(head))
        }
    }
}

/// Compute the selector of a declaration such as `transfer(address,uint256)`.
///
/// The text is hashed exactly as given. Whitespace or parameter names produce
/// a different selector than the one the compiler emits.
pub fn selector_from_declaration(declaration: &str) -> Selector {
    let hash = keccak256(declaration.as_bytes());
    Selector::from_slice(&hash[..4])
}

/// Argument tuple type of a declaration: `mint(string,uint256)` -> `(string,uint256)`.
///
/// Purely textual. Returns an empty string when there is no `(`.
pub fn schema_of(declaration: &str) -> &str {
    declaration
        .find('(')
        .map_or("", |open| &declaration[open..])
}

/// Canonical form of a declaration as the Solidity compiler would hash it,
/// or `None` if it does not parse as a function signature.
pub fn canonical_declaration(declaration: &str) -> Option<String> {
    Function::parse(declaration).ok().map(|function| function.signature())
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
