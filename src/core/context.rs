//! Immutable audit configuration shared by resolver and scanner

use std::str::FromStr;

use alloy_primitives::Address;
use anyhow::{Context as _, Result};
use tracing::debug;

use crate::config::{Config, ParserSpec};
use crate::domain::abi::{parse_selector, ParserRegistry};
use crate::domain::mint::{MintResolver, SkipList};
use crate::infrastructure::abi::{gateway_registry, TxDataParser};

/// Everything a scan needs, built once at startup
#[derive(Debug)]
pub struct AuditContext {
    pub registry: ParserRegistry,
    pub skip: SkipList,
    pub max_unwrap_depth: usize,
}

impl AuditContext {
    /// Built-in gateway registry extended by the configured parsers
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = gateway_registry().context("build gateway registry")?;
        for spec in &config.parsers {
            register_spec(&mut registry, spec)
                .with_context(|| format!("configured parser {}", spec.declaration))?;
        }

        let skip = config
            .skip_addresses()
            .map(|address| {
                Address::from_str(address.trim())
                    .with_context(|| format!("invalid skip address {address:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        let skip = SkipList::new(skip);

        debug!(
            parsers = registry.len(),
            skipped_contracts = skip.len(),
            max_unwrap_depth = config.max_unwrap_depth,
            "audit context ready"
        );

        Ok(Self {
            registry,
            skip,
            max_unwrap_depth: config.max_unwrap_depth,
        })
    }

    pub fn resolver(&self) -> MintResolver<'_> {
        MintResolver::new(&self.registry).with_max_unwrap_depth(self.max_unwrap_depth)
    }
}

fn register_spec(registry: &mut ParserRegistry, spec: &ParserSpec) -> Result<()> {
    let parser = TxDataParser::from_flags(
        spec.declaration.as_str(),
        spec.names.iter().map(String::as_str),
        spec.wanted.iter().map(String::as_str),
        spec.meta_transaction,
        spec.use_sender_address,
    )?;

    match &spec.selector {
        Some(selector) => registry.insert(parse_selector(selector)?, parser)?,
        None => registry.register(parser)?,
    }
    Ok(())
}
