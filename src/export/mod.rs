pub mod types;

pub use types::{FileRow, Flag};

use crate::devops::FileAggregates;
use colored::Colorize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};
use types::HEADERS;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write CSV file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Convert the aggregates into table rows, one per file name, in first-sighting order.
///
/// Returns `None` when nothing was aggregated so callers can tell
/// "no changes found" apart from a failed fetch.
pub fn build_table(aggregates: FileAggregates) -> Option<Vec<FileRow>> {
    if aggregates.is_empty() {
        return None;
    }

    let rows = aggregates
        .into_iter()
        .enumerate()
        .map(|(i, (file_name, agg))| FileRow {
            serial: i + 1,
            file_name,
            modified_by: agg.users.join(", "),
            is_modified: Flag(agg.edited),
            is_added_new: Flag(agg.added),
        })
        .collect();
    Some(rows)
}

/// Serialize rows to UTF-8 CSV with a header line.
pub fn export_csv(rows: &[FileRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if rows.is_empty() {
        writer.write_record(HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    writer.into_inner().map_err(|e| ExportError::FileWrite(e.into_error()))
}

/// Default download name for a pull request's export.
pub fn default_file_name(pr_number: u64) -> PathBuf {
    PathBuf::from(format!("PR_{}_files.csv", pr_number))
}

/// Write encoded CSV bytes to `path`.
#[instrument(skip(csv), fields(path = %path.display(), bytes = csv.len()))]
pub fn write_csv(csv: &[u8], path: &Path) -> Result<(), ExportError> {
    std::fs::write(path, csv)?;
    debug!("wrote CSV export");
    Ok(())
}

/// Print the rows as an aligned table to the terminal.
pub fn print_table(rows: &[FileRow]) {
    print!("{}", render_table(rows));
}

fn render_table(rows: &[FileRow]) -> String {
    let cells: Vec<[String; 5]> = rows.iter().map(FileRow::cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: &[&str]| -> String {
        values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{:<width$}", value, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format!("{}\n", format_line(&HEADERS).bold()));
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("  ")));
    for row in &cells {
        let values: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_line(&values));
        out.push('\n');
    }
    out
}
