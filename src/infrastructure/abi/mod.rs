//! ABI infrastructure - alloy-dyn-abi backed calldata parsers

mod gateway;
mod parser;

pub use gateway::gateway_registry;
pub use parser::TxDataParser;
