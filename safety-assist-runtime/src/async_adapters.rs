use crate::interfaces::{RuntimeError, SessionRecord, SessionStore as SessionStoreTrait};
use crate::types::ConversationMessage;
use async_trait::async_trait;
use safety_assist_infra::{FileAuditLog, FileSessionStore, SessionMeta, SessionStoreError};
use safety_assist_tools::AuditLogger;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Async wrapper for the blocking file store.
pub struct AsyncSessionStore {
    inner: Arc<FileSessionStore>,
}

impl AsyncSessionStore {
    pub fn new(inner: Arc<FileSessionStore>) -> Self {
        Self { inner }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, RuntimeError>
    where
        T: Send + 'static,
        F: FnOnce(&FileSessionStore) -> Result<T, SessionStoreError> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || op(&inner))
            .await
            .map_err(|e| RuntimeError::SessionError(e.to_string()))?
            .map_err(|e| RuntimeError::SessionError(e.to_string()))
    }
}

#[async_trait]
impl SessionStoreTrait for AsyncSessionStore {
    async fn create_session(
        &self,
        user_id: &str,
        organization_id: &str,
        persona: &str,
    ) -> Result<String, RuntimeError> {
        let (user, org, persona) = (
            user_id.to_string(),
            organization_id.to_string(),
            persona.to_string(),
        );
        self.blocking(move |store| store.create(&user, &org, &persona))
            .await
            .map(|meta| meta.id)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, RuntimeError> {
        let id = session_id.to_string();
        let loaded = self
            .blocking(move |store| {
                let Some(meta) = store.meta(&id)? else {
                    return Ok(None);
                };
                Ok(Some((meta, store.load(&id)?)))
            })
            .await?;

        Ok(loaded.map(|(meta, values)| {
            let messages = values
                .into_iter()
                .filter_map(|v| match serde_json::from_value::<ConversationMessage>(v) {
                    Ok(msg) => Some(msg),
                    Err(e) => {
                        warn!(session = %meta.id, "skipping unreadable message: {}", e);
                        None
                    }
                })
                .collect();
            SessionRecord { meta, messages }
        }))
    }

    async fn append_message(
        &self,
        session_id: &str,
        message: &ConversationMessage,
    ) -> Result<(), RuntimeError> {
        let id = session_id.to_string();
        let value = serde_json::to_value(message)?;
        self.blocking(move |store| store.append(&id, &value)).await
    }

    async fn list_sessions_for_user(&self, user_id: &str) -> Result<Vec<SessionMeta>, RuntimeError> {
        let user = user_id.to_string();
        self.blocking(move |store| store.list_for_user(&user)).await
    }
}

/// Audit sink writing executor records to a [`FileAuditLog`].
pub struct AsyncAuditLog {
    inner: Arc<FileAuditLog>,
}

impl AsyncAuditLog {
    pub fn new(inner: Arc<FileAuditLog>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AuditLogger for AsyncAuditLog {
    async fn log(&self, entry: Value) {
        let inner = self.inner.clone();
        let written = tokio::task::spawn_blocking(move || inner.append(&entry)).await;
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to write audit record: {}", e),
            Err(e) => warn!("audit writer task failed: {}", e),
        }
    }
}
