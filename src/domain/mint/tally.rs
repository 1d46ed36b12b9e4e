//! Per-beneficiary mint totals and scan counters

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{info, warn};

use super::{MintResolver, ObservedMint, ResolveError, ResolvedMint};

/// Contracts whose calls never reach the decoder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList {
    addresses: HashSet<Address>,
}

impl SkipList {
    pub fn new(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
        }
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Why an observed mint did or did not contribute to the tally
#[derive(Debug)]
pub enum Outcome {
    ContractSkipped,
    AddressSkipped,
    Resolved(ResolvedMint),
    Failed(ResolveError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Event `_to` is on the skip list
    pub contracts_skipped: u64,
    /// Transaction `to` is on the skip list
    pub address_skipped: u64,
    pub unknown_selector: u64,
    pub decode_failed: u64,
    pub resolved: u64,
}

impl ScanStats {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::ContractSkipped => self.contracts_skipped += 1,
            Outcome::AddressSkipped => self.address_skipped += 1,
            Outcome::Resolved(_) => self.resolved += 1,
            Outcome::Failed(err) if err.is_unknown_selector() => self.unknown_selector += 1,
            Outcome::Failed(_) => self.decode_failed += 1,
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.contracts_skipped += other.contracts_skipped;
        self.address_skipped += other.address_skipped;
        self.unknown_selector += other.unknown_selector;
        self.decode_failed += other.decode_failed;
        self.resolved += other.resolved;
    }

    /// Mints that were looked at but not credited to anyone
    pub fn unmatched(&self) -> u64 {
        self.unknown_selector + self.decode_failed
    }

    pub fn total(&self) -> u64 {
        self.contracts_skipped + self.address_skipped + self.unmatched() + self.resolved
    }
}

/// Minted amount per beneficiary.
///
/// Additions commute, so tallies built over disjoint partitions of the
/// observed mints can be merged in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintTally {
    totals: HashMap<Address, U256>,
    stats: ScanStats,
}

impl MintTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one observed mint, resolving it unless it is skipped
    pub fn classify(
        resolver: &MintResolver<'_>,
        skip: &SkipList,
        observed: &ObservedMint,
    ) -> Outcome {
        if skip.contains(&observed.event.to) {
            return Outcome::ContractSkipped;
        }
        // The event target and the transaction target can differ
        if observed
            .transaction
            .to
            .is_some_and(|to| skip.contains(&to))
        {
            return Outcome::AddressSkipped;
        }

        match resolver.resolve(&observed.transaction) {
            Ok(resolved) => Outcome::Resolved(resolved),
            Err(err) => Outcome::Failed(err),
        }
    }

    /// Resolve and accumulate every observed mint
    pub fn scan<'a>(
        resolver: &MintResolver<'_>,
        skip: &SkipList,
        observed: impl IntoIterator<Item = &'a ObservedMint>,
    ) -> Self {
        let mut tally = Self::new();
        for mint in observed {
            let outcome = Self::classify(resolver, skip, mint);
            tally.record(outcome);
        }

        info!(
            beneficiaries = tally.totals.len(),
            resolved = tally.stats.resolved,
            unknown_selector = tally.stats.unknown_selector,
            decode_failed = tally.stats.decode_failed,
            skipped = tally.stats.contracts_skipped + tally.stats.address_skipped,
            "scan complete"
        );
        tally
    }

    /// Count `outcome` and credit it if it resolved
    pub fn record(&mut self, outcome: Outcome) {
        self.stats.record(&outcome);
        match outcome {
            Outcome::Resolved(resolved) => self.add(resolved),
            Outcome::Failed(err) if err.is_unknown_selector() => {
                warn!(tx = %err.hash(), "no match for tx signature: {err}");
            }
            Outcome::Failed(err) => {
                warn!(tx = %err.hash(), "got no result: {err}");
            }
            Outcome::ContractSkipped | Outcome::AddressSkipped => {}
        }
    }

    pub fn add(&mut self, resolved: ResolvedMint) {
        let total = self.totals.entry(resolved.beneficiary).or_default();
        *total = total.saturating_add(resolved.amount);
    }

    pub fn merge(&mut self, other: Self) {
        for (beneficiary, amount) in other.totals {
            self.add(ResolvedMint {
                beneficiary,
                amount,
            });
        }
        self.stats.merge(&other.stats);
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn total_of(&self, beneficiary: &Address) -> U256 {
        self.totals.get(beneficiary).copied().unwrap_or_default()
    }

    /// Non-zero totals, largest first; ties ordered by address
    pub fn ranked(&self) -> Vec<(Address, U256)> {
        let mut ranked: Vec<(Address, U256)> = self
            .totals
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(beneficiary, amount)| (*beneficiary, *amount))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}
