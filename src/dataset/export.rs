use super::row::DatasetRow;
use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Appends dataset rows to a CSV file, writing the header only when the
/// file is created by this call.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `rows` and return the absolute path of the file.
    pub fn append(&self, rows: &[DatasetRow]) -> Result<PathBuf> {
        if rows.is_empty() {
            debug!("Nothing to append to {}", self.path.display());
            return self.absolute_path();
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let is_new = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);

        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!(
            "Appended {} row(s) to {}{}",
            rows.len(),
            self.path.display(),
            if is_new { " (new file)" } else { "" }
        );
        self.absolute_path()
    }

    fn absolute_path(&self) -> Result<PathBuf> {
        if self.path.exists() {
            Ok(fs::canonicalize(&self.path)?)
        } else if self.path.is_absolute() {
            Ok(self.path.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.path))
        }
    }
}
