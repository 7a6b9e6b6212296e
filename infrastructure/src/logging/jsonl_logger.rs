//! JSONL file writer for completed runs.
//!
//! Each [`InteractionRecord`] is serialized as a single JSON line with a
//! `type` field, appended to the file via a buffered writer.

use consortium_application::ports::interaction_log::{
    InteractionLogError, InteractionLogger, InteractionRecord,
};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const RECORD_TYPE: &str = "consortium_run";

/// JSONL interaction logger that appends one JSON object per run.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Existing content is kept.
pub struct JsonlInteractionLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlInteractionLogger {
    /// Open `path` for appending, creating it (and parent directories) if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InteractionLogError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InteractionLogger for JsonlInteractionLogger {
    fn record(&self, record: &InteractionRecord) -> Result<(), InteractionLogError> {
        let mut value = serde_json::to_value(record)?;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(RECORD_TYPE.to_string()),
            );
        }
        let line = serde_json::to_string(&value)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| InteractionLogError::Unavailable("log writer poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        // One line per run; flush so a crash never loses a finished run
        writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonlInteractionLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
