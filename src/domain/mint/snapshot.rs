//! Comparison of a recomputed minter set against earlier snapshots

use std::collections::BTreeSet;
use std::str::FromStr;

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use serde::Serialize;

/// Addresses of a snapshot JSON object keyed by address.
///
/// Keys are parsed case-insensitively so checksummed and lower-case
/// snapshots compare equal.
pub fn snapshot_addresses(snapshot: &serde_json::Value) -> Result<BTreeSet<Address>> {
    let Some(object) = snapshot.as_object() else {
        bail!("snapshot is not a JSON object keyed by address");
    };

    object
        .keys()
        .map(|key| {
            Address::from_str(key.trim()).with_context(|| format!("invalid address key {key:?}"))
        })
        .collect()
}

/// Minters missing from earlier snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    /// Minters never credited in the previous minter snapshot
    pub not_in_previous: BTreeSet<Address>,
    /// Minters left out of the final distribution
    pub not_in_final: BTreeSet<Address>,
}

impl SnapshotDiff {
    pub fn compare(
        minters: &BTreeSet<Address>,
        previous: &BTreeSet<Address>,
        final_snapshot: &BTreeSet<Address>,
    ) -> Self {
        Self {
            not_in_previous: minters.difference(previous).copied().collect(),
            not_in_final: minters.difference(final_snapshot).copied().collect(),
        }
    }
}
