//! Calldata parser trait and types

use std::fmt;

use alloy_primitives::{Address, Bytes, Selector, U256};
use thiserror::Error;

use super::Calldata;

/// Where one wanted output slot takes its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WantedField {
    /// A named argument of the decoded call
    Calldata(String),
    /// The sender of the transaction being resolved. Used when the call
    /// carries no trustworthy beneficiary of its own.
    Sender,
}

impl WantedField {
    pub fn calldata(name: impl Into<String>) -> Self {
        Self::Calldata(name.into())
    }
}

impl fmt::Display for WantedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calldata(name) => f.write_str(name),
            Self::Sender => f.write_str("<sender>"),
        }
    }
}

/// A decoded value projected into the shapes the resolver understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Address(Address),
    Uint(U256),
    Bytes(Bytes),
    /// Any other ABI value, rendered for diagnostics
    Other(String),
    /// Slot to be filled with the transaction sender
    Sender,
    /// The wanted name does not exist among the argument names
    Missing,
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Uint(_) => "uint",
            Self::Bytes(_) => "bytes",
            Self::Other(_) => "other",
            Self::Sender => "sender",
            Self::Missing => "missing",
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("calldata too short: {len} bytes, need at least 4 for the selector")]
    TooShort { len: usize },

    #[error("invalid calldata hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("failed to decode arguments as {schema}: {reason}")]
    Abi { schema: String, reason: String },
}

/// Decodes the calldata of one function shape into its wanted fields.
///
/// Implementations are immutable after construction so a single registry can
/// be shared across threads.
pub trait CalldataParser: Send + Sync {
    /// Function declaration, e.g. `mint(string,address,uint256,bytes32,bytes)`
    fn declaration(&self) -> &str;

    /// Selector derived from [`CalldataParser::declaration`]
    fn selector(&self) -> Selector;

    /// Argument names, positionally matching the schema
    fn argument_names(&self) -> &[String];

    /// Number of slots in the argument schema
    fn arity(&self) -> usize;

    /// Output slots, conventionally `[beneficiary, amount]`
    fn wanted(&self) -> &[WantedField];

    /// The call wraps another call; the wanted slots are
    /// `[signer, inner calldata]`.
    fn is_meta_transaction(&self) -> bool;

    /// Whether any wanted slot is filled from the transaction sender
    fn use_sender_address(&self) -> bool {
        self.wanted().iter().any(|field| *field == WantedField::Sender)
    }

    /// Decode `calldata` (selector included) into one value per wanted slot
    fn decode(&self, calldata: Calldata<'_>) -> Result<Vec<FieldValue>, DecodeError>;
}
