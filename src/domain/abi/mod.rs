//! ABI domain models and contracts
//!
//! Selector derivation, the calldata parser contract, and the registry that
//! dispatches calldata to parsers by selector. Independent of the decoding
//! backend (alloy-dyn-abi).

mod decoder;
mod registry;
mod signature;

pub use decoder::{CalldataParser, DecodeError, FieldValue, WantedField};
pub use registry::{parse_selector, ParserRegistry, RegistryError, RegistryIssue};
pub use signature::{
    canonical_declaration, schema_of, selector_from_declaration, selector_of, Calldata,
};
