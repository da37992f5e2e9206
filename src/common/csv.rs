//! CSV reading and writing via polars.

use std::{fs::File, io::{BufWriter, Cursor}, path::Path};

use anyhow::{Context, Result, anyhow};
use polars::prelude::*;

/// Reads CSV bytes into a DataFrame, keeping every column as a string.
/// Values such as "123,456" or "(D)" must survive untouched until coercion.
pub(crate) fn read_csv_strings(bytes: Vec<u8>) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("[common::csv] Failed to parse CSV")
}

/// Reads a CSV file from `path`, keeping every column as a string.
pub(crate) fn read_csv_file(path: &Path) -> Result<DataFrame> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("[common::csv] Failed to open CSV file: {}", path.display()))?;
    read_csv_strings(bytes)
        .with_context(|| format!("[common::csv] Failed to read CSV from {}", path.display()))
}

/// Resolve a column name case-insensitively.
fn find_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a str> {
    df.get_column_names().into_iter()
        .map(|col| col.as_str())
        .find(|col| col.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!(
            "[common::csv] missing column {:?} (found: {:?})",
            name,
            df.get_column_names().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        ))
}

/// Extract a string column; blank cells become `None`.
pub(crate) fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = df.column(find_column(df, name)?)?
        .cast(&DataType::String)?;
    let values = col.str()
        .with_context(|| format!("[common::csv] column {name:?} is not a string column"))?;

    Ok(values.into_iter()
        .map(|value| value
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
        .collect())
}

/// Writes a DataFrame to a CSV file at `path`. Nulls are written as empty cells.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[common::csv] Failed to create {}", path.display()))?;
    CsvWriter::new(BufWriter::new(file))
        .include_header(true)
        .finish(df)
        .with_context(|| format!("[common::csv] Failed to write CSV to {}", path.display()))
}
