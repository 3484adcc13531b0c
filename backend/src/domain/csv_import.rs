//! Batch roster parsing for alumni CSV imports.
//!
//! Each data row holds two people side by side:
//! `male name, -, male id, female name, -, female id`. The header row is
//! skipped and every half is validated independently.

use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use utoipa::ToSchema;

/// One half of a roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// 1-based line number in the source file.
    pub row: u64,
    pub name: String,
    pub raw_id: String,
}

/// Summary returned to the administrator after an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub messages: Vec<String>,
}

impl ImportReport {
    pub(crate) fn skip(&mut self, row: u64, reason: impl std::fmt::Display) {
        self.skipped += 1;
        self.messages.push(format!("Row {row}: {reason}"));
    }

    pub(crate) fn note(&mut self, row: u64, reason: impl std::fmt::Display) {
        self.messages.push(format!("Row {row}: {reason}"));
    }
}

const HALVES: [(usize, usize); 2] = [(0, 2), (3, 5)];

/// Split `text` into roster entries. Unreadable rows are reported and skipped.
pub fn read_roster(text: &str, report: &mut ImportReport) -> Vec<RosterEntry> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let fallback_row = index as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let row = err.position().map_or(fallback_row, csv::Position::line);
                report.note(row, format!("unreadable row: {err}"));
                continue;
            }
        };
        let row = record.position().map_or(fallback_row, csv::Position::line);
        for (name_col, id_col) in HALVES {
            let name = record.get(name_col).unwrap_or_default();
            let raw_id = record.get(id_col).unwrap_or_default();
            if name.is_empty() && raw_id.is_empty() {
                continue;
            }
            entries.push(RosterEntry {
                row,
                name: name.to_owned(),
                raw_id: raw_id.to_owned(),
            });
        }
    }
    entries
}
