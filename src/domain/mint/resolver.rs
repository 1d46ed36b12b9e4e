//! Mint resolution
//!
//! Dispatches a transaction's calldata to its parser by selector, unwraps
//! meta-transactions up to a fixed depth and fills sender slots.
//!
//! ```text
//! START -> SELECTOR_LOOKUP -> NOT_FOUND
//!                          -> DECODING -> DECODE_FAILED
//!                                      -> DECODED -> [unwrap if meta] -> RESOLVED
//! ```

use alloy_primitives::{Address, Bytes, Selector, B256, U256};
use thiserror::Error;
use tracing::{debug, trace};

use super::{ResolvedMint, TransactionRecord};
use crate::domain::abi::{selector_of, CalldataParser, DecodeError, FieldValue, ParserRegistry};

/// Meta-transactions are unwrapped one level deep unless configured otherwise
pub const DEFAULT_MAX_UNWRAP_DEPTH: usize = 1;

/// How deep the current decode frame sits inside meta-transaction envelopes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeContext {
    pub depth: usize,
}

impl DecodeContext {
    pub const ROOT: Self = Self { depth: 0 };

    /// Whether this frame decodes calldata unwrapped from an envelope
    pub fn is_recursive(&self) -> bool {
        self.depth > 0
    }

    pub fn descend(self) -> Self {
        Self {
            depth: self.depth + 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no parser for selector {selector} (tx {hash})")]
    UnknownSelector { hash: B256, selector: Selector },

    #[error("failed to decode calldata (tx {hash}): {source}")]
    Decode {
        hash: B256,
        #[source]
        source: DecodeError,
    },

    #[error("{declaration} yields {count} fields, expected 2 (tx {hash})")]
    WantedSlots {
        hash: B256,
        declaration: String,
        count: usize,
    },

    #[error("{declaration} has no argument {field} (tx {hash})")]
    MissingField {
        hash: B256,
        declaration: String,
        field: String,
    },

    #[error("{declaration}: {field} is {found}, expected {expected} (tx {hash})")]
    FieldType {
        hash: B256,
        declaration: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("meta-transaction nested deeper than {max_depth} level(s) (tx {hash})")]
    NestedMetaTransaction { hash: B256, max_depth: usize },
}

impl ResolveError {
    /// Hash of the transaction that failed to resolve
    pub fn hash(&self) -> B256 {
        match self {
            Self::UnknownSelector { hash, .. }
            | Self::Decode { hash, .. }
            | Self::WantedSlots { hash, .. }
            | Self::MissingField { hash, .. }
            | Self::FieldType { hash, .. }
            | Self::NestedMetaTransaction { hash, .. } => *hash,
        }
    }

    /// Unknown selectors are expected; everything else is a decode failure
    pub fn is_unknown_selector(&self) -> bool {
        matches!(self, Self::UnknownSelector { .. })
    }
}

/// Resolves transactions against a fixed parser registry.
///
/// Holds no mutable state, so one resolver can serve many threads.
#[derive(Debug, Clone, Copy)]
pub struct MintResolver<'r> {
    registry: &'r ParserRegistry,
    max_unwrap_depth: usize,
}

impl<'r> MintResolver<'r> {
    pub fn new(registry: &'r ParserRegistry) -> Self {
        Self {
            registry,
            max_unwrap_depth: DEFAULT_MAX_UNWRAP_DEPTH,
        }
    }

    pub fn with_max_unwrap_depth(mut self, max_unwrap_depth: usize) -> Self {
        self.max_unwrap_depth = max_unwrap_depth;
        self
    }

    pub fn registry(&self) -> &'r ParserRegistry {
        self.registry
    }

    /// Resolve the beneficiary and amount minted by `tx`
    pub fn resolve(&self, tx: &TransactionRecord) -> Result<ResolvedMint, ResolveError> {
        self.resolve_in(tx, DecodeContext::ROOT)
    }

    /// Resolve `tx` as a frame at `ctx.depth` inside meta-transaction envelopes
    pub fn resolve_in(
        &self,
        tx: &TransactionRecord,
        ctx: DecodeContext,
    ) -> Result<ResolvedMint, ResolveError> {
        let hash = tx.hash;
        let selector =
            selector_of(&tx.input).map_err(|source| ResolveError::Decode { hash, source })?;

        let Some(parser) = self.registry.lookup(selector) else {
            return Err(ResolveError::UnknownSelector { hash, selector });
        };

        trace!(
            tx = %hash,
            %selector,
            declaration = parser.declaration(),
            depth = ctx.depth,
            "decoding calldata"
        );

        let fields = parser
            .decode((&tx.input).into())
            .map_err(|source| ResolveError::Decode { hash, source })?;

        let [first, second]: [FieldValue; 2] =
            fields
                .try_into()
                .map_err(|fields: Vec<FieldValue>| ResolveError::WantedSlots {
                    hash,
                    declaration: parser.declaration().to_string(),
                    count: fields.len(),
                })?;

        if parser.is_meta_transaction() {
            if ctx.depth >= self.max_unwrap_depth {
                return Err(ResolveError::NestedMetaTransaction {
                    hash,
                    max_depth: self.max_unwrap_depth,
                });
            }

            let inner = expect_bytes(hash, parser, 1, second)?;
            debug!(
                tx = %hash,
                envelope = parser.declaration(),
                signer = ?first,
                "unwrapping meta-transaction"
            );
            return self.resolve_in(&tx.with_input(inner), ctx.descend());
        }

        let beneficiary = match first {
            FieldValue::Sender => tx.from,
            other => expect_address(hash, parser, 0, other)?,
        };
        let amount = expect_uint(hash, parser, 1, second)?;

        Ok(ResolvedMint {
            beneficiary,
            amount,
        })
    }
}

fn field_name(parser: &dyn CalldataParser, slot: usize) -> String {
    parser
        .wanted()
        .get(slot)
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn unexpected(
    hash: B256,
    parser: &dyn CalldataParser,
    slot: usize,
    expected: &'static str,
    value: &FieldValue,
) -> ResolveError {
    let declaration = parser.declaration().to_string();
    let field = field_name(parser, slot);
    match value {
        FieldValue::Missing => ResolveError::MissingField {
            hash,
            declaration,
            field,
        },
        other => ResolveError::FieldType {
            hash,
            declaration,
            field,
            expected,
            found: other.kind(),
        },
    }
}

fn expect_address(
    hash: B256,
    parser: &dyn CalldataParser,
    slot: usize,
    value: FieldValue,
) -> Result<Address, ResolveError> {
    match value {
        FieldValue::Address(address) => Ok(address),
        other => Err(unexpected(hash, parser, slot, "address", &other)),
    }
}

fn expect_uint(
    hash: B256,
    parser: &dyn CalldataParser,
    slot: usize,
    value: FieldValue,
) -> Result<U256, ResolveError> {
    match value {
        FieldValue::Uint(amount) => Ok(amount),
        other => Err(unexpected(hash, parser, slot, "uint", &other)),
    }
}

fn expect_bytes(
    hash: B256,
    parser: &dyn CalldataParser,
    slot: usize,
    value: FieldValue,
) -> Result<Bytes, ResolveError> {
    match value {
        FieldValue::Bytes(bytes) => Ok(bytes),
        other => Err(unexpected(hash, parser, slot, "bytes", &other)),
    }
}
