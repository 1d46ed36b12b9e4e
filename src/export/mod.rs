//! Export
//!
//! Renders scan results for stdout:
//! - Tallies → CSV or JSON
//! - Snapshot diffs → JSON

mod csv_export;
mod json_export;

use std::str::FromStr;

pub use csv_export::write_tally as write_tally_csv;
pub use json_export::{write_diff, write_tally as write_tally_json};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown format {other:?} (expected json or csv)")),
        }
    }
}
