//! Tabular dataset export: one row per player per run, appended to a CSV file.

pub mod accumulator;
pub mod export;
pub mod row;

pub use accumulator::DatasetAccumulator;
pub use export::CsvExporter;
pub use row::{DatasetRow, Provenance};
