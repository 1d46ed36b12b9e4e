use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy_primitives::{Address, Bytes, B256};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mint_audit::config;
use mint_audit::core::AuditContext;
use mint_audit::domain::mint::{snapshot_addresses, MintTally, ObservedMint, SnapshotDiff, TransactionRecord};
use mint_audit::export::{self, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "mint-audit",
    version,
    about = "Attribute RenVM gateway mints to their beneficiaries"
)]
struct Cli {
    /// Config file (defaults to ~/.config/mint-audit/config.toml)
    #[arg(short, long, env = "MINT_AUDIT_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the parser registry
    Selectors {
        /// Report misconfigured entries and fail if there are any
        #[arg(long)]
        check: bool,
    },

    /// Resolve the beneficiary and amount of a single call
    Resolve {
        /// Calldata (hex, 0x-prefixed)
        #[arg(short, long)]
        input: String,

        /// Transaction sender
        #[arg(short, long)]
        from: Address,

        /// Transaction hash, for log context
        #[arg(long, default_value_t = B256::ZERO)]
        hash: B256,
    },

    /// Tally pre-fetched mints (JSON array of {event, transaction})
    Tally {
        observed: PathBuf,

        /// Output format (json or csv)
        #[arg(short = 'F', long, default_value = "json")]
        format: OutputFormat,
    },

    /// Report minters missing from earlier snapshots
    Diff {
        /// Newly computed minters (JSON object keyed by address)
        #[arg(long = "new")]
        new: PathBuf,

        /// Previously credited minters
        #[arg(long)]
        old: PathBuf,

        /// Final distribution snapshot
        #[arg(long = "final")]
        final_snapshot: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "mint_audit=info",
        1 => "mint_audit=debug",
        _ => "mint_audit=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };
    let context = AuditContext::from_config(&config)?;

    match cli.command {
        Commands::Selectors { check } => selectors(&context, check),
        Commands::Resolve { input, from, hash } => resolve(&context, &input, from, hash),
        Commands::Tally { observed, format } => tally(&context, &observed, format),
        Commands::Diff {
            new,
            old,
            final_snapshot,
        } => diff(&new, &old, &final_snapshot),
    }
}

fn selectors(context: &AuditContext, check: bool) -> Result<()> {
    if check {
        let issues = context.registry.check();
        for issue in &issues {
            println!("{issue}");
        }
        if !issues.is_empty() {
            bail!("{} registry issue(s)", issues.len());
        }
        info!(parsers = context.registry.len(), "registry is consistent");
        return Ok(());
    }

    for (selector, parser) in context.registry.entries() {
        let mut flags = Vec::new();
        if parser.is_meta_transaction() {
            flags.push("meta");
        }
        if parser.use_sender_address() {
            flags.push("sender");
        }
        println!("{selector}  {}  [{}]", parser.declaration(), flags.join(","));
    }
    Ok(())
}

fn resolve(context: &AuditContext, input: &str, from: Address, hash: B256) -> Result<()> {
    let input = Bytes::from_str(input.trim()).context("calldata is not valid hex")?;
    let tx = TransactionRecord {
        hash,
        from,
        to: None,
        input,
    };

    let resolved = context.resolver().resolve(&tx)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

fn tally(context: &AuditContext, path: &Path, format: OutputFormat) -> Result<()> {
    let observed: Vec<ObservedMint> = read_json(path)?;
    let tally = MintTally::scan(&context.resolver(), &context.skip, &observed);

    let stdout = io::stdout().lock();
    let rows = match format {
        OutputFormat::Json => export::write_tally_json(stdout, &tally),
        OutputFormat::Csv => export::write_tally_csv(stdout, &tally),
    }
    .map_err(|err| anyhow!("write tally: {err}"))?;

    info!(rows, "tally written");
    Ok(())
}

fn diff(new: &Path, old: &Path, final_snapshot: &Path) -> Result<()> {
    let minters = read_snapshot(new)?;
    let previous = read_snapshot(old)?;
    let final_snapshot = read_snapshot(final_snapshot)?;

    let report = SnapshotDiff::compare(&minters, &previous, &final_snapshot);
    info!(
        not_in_previous = report.not_in_previous.len(),
        not_in_final = report.not_in_final.len(),
        "snapshot diff"
    );

    export::write_diff(io::stdout().lock(), &report).map_err(|err| anyhow!("write diff: {err}"))?;
    Ok(())
}

fn read_snapshot(path: &Path) -> Result<BTreeSet<Address>> {
    let value: serde_json::Value = read_json(path)?;
    snapshot_addresses(&value).with_context(|| format!("snapshot {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))
}
