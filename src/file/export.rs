// src/file/export.rs
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::analysis::ResultRow;
use crate::config::constants::{cell_line_name, CELL_LINE_ALIAS_COLUMN, CELL_LINE_COLUMN};
use crate::config::TestKind;

/// Cells are already JSON-encoded, so the writer must not quote again
fn csv_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV buffer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

fn encode(value: &Value) -> Result<String> {
    serde_json::to_string(value).context("Failed to encode CSV cell")
}

/// Result table export: header from the first row's keys, every present cell
/// JSON-encoded, absent cells left empty.
pub fn results_to_csv<'a>(rows: impl IntoIterator<Item = &'a ResultRow>) -> Result<String> {
    let mut rows = rows.into_iter().peekable();
    let Some(first) = rows.peek() else {
        return Ok(String::new());
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut writer = csv_writer();
    writer.write_record(&headers)?;
    for row in rows {
        let record = headers.iter()
            .map(|key| match row.get(key) {
                Some(value) => encode(value),
                None => Ok(String::new()),
            })
            .collect::<Result<Vec<_>>>()?;
        writer.write_record(&record)?;
    }
    finish(writer)
}

/// Raw pair data export. A human-readable cell line column is inserted right
/// after `cell_lines` when that column is present.
pub fn row_data_to_csv(rows: &[ResultRow]) -> Result<String> {
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut header_row = Vec::with_capacity(headers.len() + 1);
    for header in &headers {
        header_row.push(header.clone());
        if header == CELL_LINE_COLUMN {
            header_row.push(CELL_LINE_ALIAS_COLUMN.to_string());
        }
    }

    let mut writer = csv_writer();
    writer.write_record(&header_row)?;
    for row in rows {
        let mut record = Vec::with_capacity(header_row.len());
        for header in &headers {
            let value = match row.get(header) {
                Some(Value::Null) | None => Value::String(String::new()),
                Some(value) => value.clone(),
            };
            record.push(encode(&value)?);
            if header == CELL_LINE_COLUMN {
                let alias = value.as_str().and_then(cell_line_name).unwrap_or("");
                record.push(encode(&Value::String(alias.to_string()))?);
            }
        }
        writer.write_record(&record)?;
    }
    finish(writer)
}

/// ISO-8601 UTC with `:` and `.` made filename-safe
pub fn file_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

fn file_safe(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

pub fn results_file_name(feature: &str, tab: TestKind, now: DateTime<Utc>) -> String {
    format!("{}_{}_results_{}.csv", file_safe(feature), tab.key(), file_timestamp(now))
}

pub fn row_data_file_name(feature1: &str, feature2: &str, kind: TestKind, now: DateTime<Utc>) -> String {
    format!(
        "{}_vs_{}_{}_data_{}.csv",
        file_safe(feature1),
        file_safe(feature2),
        kind.key(),
        file_timestamp(now)
    )
}

pub fn write_csv(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    log::info!("Exported {}", path.display());
    Ok(())
}
