//! CSV Export
//!
//! Writes ranked mint totals as `beneficiary,amount` rows.

use std::io::Write;

use crate::domain::mint::MintTally;

/// Write ranked tally rows to `writer`
pub fn write_tally<W: Write>(writer: W, tally: &MintTally) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    let ranked = tally.ranked();

    wtr.write_record(["beneficiary", "amount"])?;

    for (beneficiary, amount) in &ranked {
        wtr.write_record([beneficiary.to_string(), amount.to_string()])?;
    }

    wtr.flush()?;
    Ok(ranked.len())
}
