//! In-memory CSV tables.
//!
//! A [`Table`] keeps the header row exactly as read and, per row, both the raw
//! cells and a typed view of the columns the pipeline works with. Columns the
//! pipeline never interprets survive untouched through to export.

use std::io::{Read, Write};
use std::path::Path;

use csv::StringRecord;
use serde::de::DeserializeOwned;

use crate::error::{PipelineError, Result};

/// Columns that must be present in the header row for a record type.
pub trait RequiredColumns {
    const REQUIRED: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    pub record: T,
    pub raw: StringRecord,
}

impl<T> Row<T> {
    /// Replaces the raw cell at `index`, appending if `index` is one past the end.
    pub fn set_cell(&mut self, index: usize, value: &str) {
        if index == self.raw.len() {
            self.raw.push_field(value);
            return;
        }
        self.raw = self
            .raw
            .iter()
            .enumerate()
            .map(|(i, cell)| if i == index { value } else { cell })
            .collect();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    headers: StringRecord,
    rows: Vec<Row<T>>,
}

impl<T> Table<T> {
    pub fn new(headers: StringRecord, rows: Vec<Row<T>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row<T>] {
        &mut self.rows
    }

    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().map(|row| &row.record)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns the subset of rows whose typed record satisfies `keep`.
    pub fn retain(mut self, mut keep: impl FnMut(&T) -> bool) -> Self {
        self.rows.retain(|row| keep(&row.record));
        self
    }

    /// Writes the header row followed by every raw row.
    pub fn write_to<W: Write>(&self, writer: &mut csv::Writer<W>) -> csv::Result<()> {
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(&row.raw)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<T: DeserializeOwned + RequiredColumns> Table<T> {
    /// Reads a headed CSV stream. `path` is only used for error context.
    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let parse_error = |source: csv::Error| PipelineError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().map_err(parse_error)?.clone();

        if let Some(column) = T::REQUIRED
            .iter()
            .find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(PipelineError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let raw = result.map_err(parse_error)?;
            let record: T = raw.deserialize(Some(&headers)).map_err(parse_error)?;
            rows.push(Row { record, raw });
        }

        Ok(Self { headers, rows })
    }
}
