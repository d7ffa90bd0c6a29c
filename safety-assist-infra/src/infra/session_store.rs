use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid session id")]
    InvalidId,
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Descriptive record kept next to each transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub id: String,
    pub user_id: String,
    pub organization_id: String,
    pub persona: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only transcripts on disk: `<id>.jsonl` holds one message per line,
/// `<id>.meta.json` holds the [`SessionMeta`].
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, SessionStoreError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn check_id(session_id: &str) -> Result<(), SessionStoreError> {
        if session_id.is_empty()
            || session_id.contains("..")
            || session_id.contains('/')
            || session_id.contains('\\')
        {
            return Err(SessionStoreError::InvalidId);
        }
        Ok(())
    }

    fn transcript_path(&self, session_id: &str) -> Result<PathBuf, SessionStoreError> {
        Self::check_id(session_id)?;
        Ok(self.base_path.join(format!("{}.jsonl", session_id)))
    }

    fn meta_path(&self, session_id: &str) -> Result<PathBuf, SessionStoreError> {
        Self::check_id(session_id)?;
        Ok(self.base_path.join(format!("{}.meta.json", session_id)))
    }

    /// Create an empty session and return its metadata.
    pub fn create(
        &self,
        user_id: &str,
        organization_id: &str,
        persona: &str,
    ) -> Result<SessionMeta, SessionStoreError> {
        let meta = SessionMeta {
            id: uuid::Uuid::new_v4().simple().to_string(),
            user_id: user_id.to_string(),
            organization_id: organization_id.to_string(),
            persona: persona.to_string(),
            created_at: Utc::now(),
        };

        let meta_path = self.meta_path(&meta.id)?;
        let temp_path = meta_path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(serde_json::to_string_pretty(&meta)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &meta_path)?;
        File::create(self.transcript_path(&meta.id)?)?;

        debug!(session = %meta.id, user = %meta.user_id, "created session");
        Ok(meta)
    }

    /// Metadata of `session_id`, or `None` when no such session exists.
    pub fn meta(&self, session_id: &str) -> Result<Option<SessionMeta>, SessionStoreError> {
        let path = self.meta_path(session_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn load(&self, session_id: &str) -> Result<Vec<Value>, SessionStoreError> {
        let path = self.transcript_path(session_id)?;

        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut messages = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(msg) => messages.push(msg),
                Err(e) => warn!(session = %session_id, line = index + 1, "skipping corrupt transcript line: {}", e),
            }
        }

        Ok(messages)
    }

    /// Append one message. The session must have been created first.
    pub fn append(&self, session_id: &str, message: &Value) -> Result<(), SessionStoreError> {
        if !self.meta_path(session_id)?.exists() {
            return Err(SessionStoreError::NotFound(session_id.to_string()));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.transcript_path(session_id)?)?;

        let json = serde_json::to_string(message)?;
        writeln!(file, "{}", json)?;
        file.sync_all()?;

        Ok(())
    }

    /// Sessions owned by `user_id`, newest first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<SessionMeta>, SessionStoreError> {
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            let is_meta = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(".meta.json"))
                .unwrap_or(false);
            if !is_meta {
                continue;
            }

            let parsed = fs::read_to_string(&path)
                .map_err(SessionStoreError::from)
                .and_then(|c| serde_json::from_str::<SessionMeta>(&c).map_err(Into::into));
            match parsed {
                Ok(meta) if meta.user_id == user_id => sessions.push(meta),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), "skipping unreadable session metadata: {}", e),
            }
        }

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(sessions)
    }
}
