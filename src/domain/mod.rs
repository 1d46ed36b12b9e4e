//! Domain layer
//!
//! - `abi`: selector codec, parser contract, parser registry
//! - `mint`: transaction records, mint resolution, aggregation, snapshot diffs

pub mod abi;
pub mod mint;
