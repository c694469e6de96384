//! Writers for ranked output.

use std::io::Write;

use medrank_common::Result;

use crate::attributes::registry;
use crate::ranker::ScoredRecord;

/// CSV with `Rank, Institution, Score`, then one column per registry attribute.
///
/// Attribute cells hold the effective raw value, blank when missing.
pub fn write_csv<W: Write>(ranked: &[ScoredRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Rank", "Institution", "Score"];
    header.extend(registry().iter().map(|d| d.key));
    wtr.write_record(&header)?;

    for row in ranked {
        let mut record = vec![
            row.rank.to_string(),
            row.school.name.clone(),
            row.raw_score.to_string(),
        ];
        record.extend(
            registry()
                .iter()
                .map(|d| row.school.value(d.attribute).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pretty JSON array of ranked records.
pub fn write_json<W: Write>(ranked: &[ScoredRecord], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, ranked)?;
    Ok(())
}
