//! Attribution of RenVM gateway mints to their beneficiaries.
//!
//! Calldata of the transaction behind each mint event is decoded by a
//! selector-indexed parser registry, meta-transactions are unwrapped, and
//! the resolved amounts are tallied per beneficiary.

pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod infrastructure;
