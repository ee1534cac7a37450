//! Tabular dataset storage.
//!
//! Datasets live in delimited text files with a header row naming the record
//! fields. The [`RecordStore`] reads them into a [`crate::cases::Dataset`]
//! and writes them back.
//!
//! # Usage
//!
//! ```rust,ignore
//! use case_forge::storage::RecordStore;
//! use std::path::Path;
//!
//! let store = RecordStore::default();
//! let dataset = store.load(Path::new("cases.csv"))?;
//! store.save(&dataset, Path::new("cases_augmented.csv"))?;
//! ```

pub mod csv_store;

pub use csv_store::{dataset_to_batch, RecordStore, DEFAULT_DELIMITER, DEFAULT_QUOTE};
