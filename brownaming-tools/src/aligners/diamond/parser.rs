//! Parser for DIAMOND tabular (`-f 6`) output

use crate::traits::AlignmentRow;
use brownaming_core::{BrownamingError, BrownamingResult, TaxonId};
use std::io::Read;
use std::str::FromStr;

/// Output columns requested from DIAMOND, in order
pub const OUTPUT_FIELDS: [&str; 11] = [
    "qseqid", "sseqid", "pident", "ppos", "length", "evalue", "bitscore", "qlen", "slen",
    "staxids", "stitle",
];

/// Rows shorter than this are malformed (`stitle` may be empty)
const MIN_COLUMNS: usize = 10;

fn field<T: FromStr>(record: &csv::StringRecord, index: usize, line: u64) -> BrownamingResult<T> {
    let raw = record.get(index).unwrap_or("").trim();
    raw.parse::<T>().map_err(|_| {
        BrownamingError::Parse(format!(
            "line {}: column {} ({}) has invalid value {:?}",
            line, index + 1, OUTPUT_FIELDS[index], raw
        ))
    })
}

/// First entry of a `;`-separated taxon list, `None` when empty
pub fn first_taxon(staxids: &str) -> BrownamingResult<Option<TaxonId>> {
    match staxids.split(';').map(str::trim).find(|s| !s.is_empty()) {
        Some(first) => first
            .parse::<TaxonId>()
            .map(Some)
            .map_err(|_| BrownamingError::Parse(format!("invalid staxids value {:?}", staxids))),
        None => Ok(None),
    }
}

/// Parse every row of a tabular result. Blank lines are skipped; any malformed row fails the whole parse.
///
/// Lengths are unsigned, so a negative `length`, `qlen` or `slen` is a `Parse` error
/// for the whole output instead of a row the selector would later drop.
pub fn parse_tabular<R: Read>(reader: R) -> BrownamingResult<Vec<AlignmentRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| BrownamingError::Parse(format!("DIAMOND output: {}", e)))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() == 1 && record.get(0).map_or(true, |f| f.trim().is_empty()) {
            continue;
        }
        if record.len() < MIN_COLUMNS {
            return Err(BrownamingError::Parse(format!(
                "line {}: expected at least {} columns, found {}",
                line,
                MIN_COLUMNS,
                record.len()
            )));
        }

        rows.push(AlignmentRow {
            query_id: record[0].to_string(),
            subject_id: record[1].to_string(),
            identity: field(&record, 2, line)?,
            positives: field(&record, 3, line)?,
            alignment_length: field(&record, 4, line)?,
            evalue: field(&record, 5, line)?,
            bitscore: field(&record, 6, line)?,
            query_length: field(&record, 7, line)?,
            subject_length: field(&record, 8, line)?,
            subject_taxon: first_taxon(&record[9])?,
            subject_title: record.get(10).unwrap_or("").to_string(),
        });
    }

    Ok(rows)
}
