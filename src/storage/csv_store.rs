//! Delimited-file storage for case datasets.
//!
//! Reads and writes datasets through Arrow's CSV reader and writer. Every
//! column is read as UTF-8 text, so list columns keep their JSON encoding
//! exactly as found in the file. Columns beyond the five record fields are
//! carried along and written back with the original header.

use std::fs::{self, File};
use std::io::{ErrorKind, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, StringBuilder};
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use tracing::{debug, info, warn};

use crate::cases::record::{CaseRecord, ColumnLayout, Dataset, REQUIRED_FIELDS};
use crate::error::StoreError;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';
/// Default quote character.
pub const DEFAULT_QUOTE: u8 = b'"';

const BATCH_SIZE: usize = 1024;

/// Loads and saves datasets as delimited text files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordStore {
    delimiter: u8,
    quote: u8,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER, DEFAULT_QUOTE)
    }
}

impl RecordStore {
    /// Create a store using the given single-byte delimiter and quote.
    pub fn new(delimiter: u8, quote: u8) -> Self {
        Self { delimiter, quote }
    }

    /// Load a dataset.
    ///
    /// Columns are located by header name. When the header does not name all
    /// record fields but has enough columns, the first five columns are used
    /// in record order. Any other columns are kept with the dataset. A
    /// zero-byte file is an empty dataset.
    pub fn load(&self, path: &Path) -> Result<Dataset, StoreError> {
        let mut file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
            _ => StoreError::Io(e),
        })?;

        let (inferred, _) = Format::default()
            .with_header(true)
            .with_delimiter(self.delimiter)
            .with_quote(self.quote)
            .infer_schema(&mut file, None)
            .map_err(|e| malformed(path, e))?;

        if inferred.fields().is_empty() {
            debug!(path = %path.display(), "Dataset file is empty");
            return Ok(Dataset::new());
        }

        let header: Vec<String> = inferred
            .fields()
            .iter()
            .map(|field| field.name().trim_start_matches('\u{feff}').to_string())
            .collect();
        let fields = resolve_columns(&header, path)?;
        let layout = ColumnLayout::new(header, fields.clone());
        let extra_columns: Vec<usize> = layout.extra_columns().collect();

        // Read every column as text, whatever type inference guessed.
        let text_schema = Schema::new(
            inferred
                .fields()
                .iter()
                .map(|field| Field::new(field.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );

        file.rewind()?;
        let reader = ReaderBuilder::new(Arc::new(text_schema))
            .with_header(true)
            .with_delimiter(self.delimiter)
            .with_quote(self.quote)
            .with_batch_size(BATCH_SIZE)
            .build(file)
            .map_err(|e| malformed(path, e))?;

        let mut records = Vec::new();
        let mut extras: Vec<Vec<String>> = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| malformed(path, e))?;
            let text_column = |index: usize| {
                batch
                    .column(index)
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| StoreError::Malformed {
                        path: path.to_path_buf(),
                        reason: format!("column {} is not text", index),
                    })
            };
            let arrays = fields
                .iter()
                .map(|&index| text_column(index))
                .collect::<Result<Vec<_>, _>>()?;
            let extra_arrays = extra_columns
                .iter()
                .map(|&index| text_column(index))
                .collect::<Result<Vec<_>, _>>()?;

            for row in 0..batch.num_rows() {
                let cell = |array: &StringArray| {
                    if array.is_null(row) {
                        String::new()
                    } else {
                        array.value(row).to_string()
                    }
                };

                records.push(CaseRecord {
                    case_id: cell(arrays[0]),
                    case_text: cell(arrays[1]),
                    best_solution: cell(arrays[2]),
                    keywords: cell(arrays[3]),
                    skills: cell(arrays[4]),
                });
                extras.push(extra_arrays.iter().map(|&array| cell(array)).collect());
            }
        }

        info!(path = %path.display(), rows = records.len(), "Dataset loaded");
        if ColumnLayout::is_plain(layout.header(), &fields) {
            Ok(Dataset::from(records))
        } else {
            Ok(Dataset::with_layout(records, layout, extras))
        }
    }

    /// Load a dataset, logging any failure and returning an empty dataset.
    pub fn load_or_empty(&self, path: &Path) -> Dataset {
        match self.load(path) {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load dataset");
                Dataset::new()
            }
        }
    }

    /// Write a dataset as UTF-8 with a header row, creating parent
    /// directories as needed.
    ///
    /// A dataset loaded from a file keeps that file's header; other datasets
    /// are written with the record fields as columns.
    pub fn save(&self, dataset: &Dataset, path: &Path) -> Result<(), StoreError> {
        let batch = dataset_to_batch(dataset)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_delimiter(self.delimiter)
            .with_quote(self.quote)
            .build(file);
        writer.write(&batch)?;

        info!(path = %path.display(), rows = dataset.len(), "Dataset saved");
        Ok(())
    }
}

/// Convert a dataset into a single Arrow batch of text columns laid out like
/// its source file. Rows without extra cells get empty ones.
pub fn dataset_to_batch(dataset: &Dataset) -> Result<RecordBatch, StoreError> {
    let plain = ColumnLayout::plain();
    let layout = dataset.layout().unwrap_or(&plain);

    let mut builders: Vec<StringBuilder> =
        layout.header().iter().map(|_| StringBuilder::new()).collect();

    for (row, record) in dataset.iter().enumerate() {
        let mut extra = dataset.extra_cells(row).iter();
        for (column, builder) in builders.iter_mut().enumerate() {
            let value = match layout.field_at(column) {
                Some(name) => record.field(name).unwrap_or_default(),
                None => extra.next().map(String::as_str).unwrap_or_default(),
            };
            builder.append_value(value);
        }
    }

    let schema = Schema::new(
        layout
            .header()
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    );
    let columns: Vec<ArrayRef> = builders
        .iter_mut()
        .map(|builder| Arc::new(builder.finish()) as ArrayRef)
        .collect();

    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Map header columns to record fields, by name or else by position.
fn resolve_columns(header: &[String], path: &Path) -> Result<Vec<usize>, StoreError> {
    let names: Vec<&str> = header.iter().map(|name| name.trim()).collect();

    let by_name: Option<Vec<usize>> = REQUIRED_FIELDS
        .iter()
        .map(|required| names.iter().position(|name| name == required))
        .collect();

    let columns = match by_name {
        Some(columns) => columns,
        None if names.len() >= REQUIRED_FIELDS.len() => {
            warn!(
                path = %path.display(),
                header = ?names,
                "Header does not name the record fields; using the first five columns"
            );
            (0..REQUIRED_FIELDS.len()).collect()
        }
        None => {
            return Err(StoreError::Malformed {
                path: path.to_path_buf(),
                reason: format!(
                    "expected columns {:?}, found {:?}",
                    REQUIRED_FIELDS, names
                ),
            })
        }
    };

    if names.len() > REQUIRED_FIELDS.len() {
        let extra: Vec<&str> = names
            .iter()
            .enumerate()
            .filter(|(index, _)| !columns.contains(index))
            .map(|(_, name)| *name)
            .collect();
        debug!(path = %path.display(), extra = ?extra, "Carrying extra dataset columns");
    }

    Ok(columns)
}

fn malformed(path: &Path, err: arrow::error::ArrowError) -> StoreError {
    StoreError::Malformed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
