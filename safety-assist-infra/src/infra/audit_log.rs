use parking_lot::Mutex;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("audit record must be a JSON object")]
    NotAnObject,
}

/// Append-only JSONL file of tool-call audit records.
pub struct FileAuditLog {
    log_path: PathBuf,
    file: Mutex<File>,
}

impl FileAuditLog {
    pub fn new<P: AsRef<Path>>(log_path: P) -> Result<Self, AuditLogError> {
        let log_path = log_path.as_ref().to_path_buf();

        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            log_path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn append(&self, record: &Value) -> Result<(), AuditLogError> {
        if !record.is_object() {
            return Err(AuditLogError::NotAnObject);
        }
        let line = serde_json::to_string(record)?;
        let mut file = self.file.lock();
        writeln!(file, "{}", line)?;
        file.sync_data()?;
        Ok(())
    }
}
