//! JSON Export
//!
//! Writes tallies and snapshot diffs as pretty-printed JSON.

use std::io::Write;

use serde::Serialize;

use crate::domain::mint::{MintTally, ScanStats, SnapshotDiff};

/// Exportable tally: amounts as decimal strings, largest first
#[derive(Serialize)]
struct ExportableTally {
    minters: Vec<ExportableMint>,
    stats: ScanStats,
}

#[derive(Serialize)]
struct ExportableMint {
    beneficiary: String,
    amount: String,
}

impl From<&MintTally> for ExportableTally {
    fn from(tally: &MintTally) -> Self {
        Self {
            minters: tally
                .ranked()
                .into_iter()
                .map(|(beneficiary, amount)| ExportableMint {
                    beneficiary: beneficiary.to_string(),
                    amount: amount.to_string(),
                })
                .collect(),
            stats: *tally.stats(),
        }
    }
}

/// Write a tally to `writer`
pub fn write_tally<W: Write>(mut writer: W, tally: &MintTally) -> Result<usize, Box<dyn std::error::Error>> {
    let exportable = ExportableTally::from(tally);

    serde_json::to_writer_pretty(&mut writer, &exportable)?;
    writeln!(writer)?;

    Ok(exportable.minters.len())
}

/// Write a snapshot diff to `writer`
pub fn write_diff<W: Write>(mut writer: W, diff: &SnapshotDiff) -> Result<usize, Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(&mut writer, diff)?;
    writeln!(writer)?;

    Ok(diff.not_in_previous.len() + diff.not_in_final.len())
}
