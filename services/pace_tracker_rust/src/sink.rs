//! JSON-lines record log.
//!
//! Each emitted record is appended as one flat JSON array in
//! `LOG_RECORD_FIELDS` order, so the file can be loaded into a sheet or a
//! dataframe without a schema.

use log::debug;
use pace_rust_core::error::SinkError;
use pace_rust_core::models::LogRecord;
use pace_rust_core::sink::RecordSink;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
    name: String,
}

impl JsonLinesSink {
    /// Open (or create) the log for appending, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("record log opened at {}", path.display());
        Ok(Self {
            name: format!("jsonl:{}", path.display()),
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonLinesSink {
    fn write(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        let line = serde_json::to_string(&record.to_row())?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
