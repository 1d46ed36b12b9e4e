//! Mint resolution and aggregation
//!
//! Turns pre-fetched gateway mint transactions into beneficiary totals. Chain
//! access and persistence belong to the caller.

mod resolver;
mod snapshot;
mod tally;
mod types;

pub use resolver::{DecodeContext, MintResolver, ResolveError, DEFAULT_MAX_UNWRAP_DEPTH};
pub use snapshot::{snapshot_addresses, SnapshotDiff};
pub use tally::{MintTally, Outcome, ScanStats, SkipList};
pub use types::{MintEvent, ObservedMint, ResolvedMint, TransactionRecord};
