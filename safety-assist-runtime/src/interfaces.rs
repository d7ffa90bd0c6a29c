//! Abstract interfaces for runtime dependencies.

use crate::streaming::CompletedTurn;
use crate::types::ConversationMessage;
use async_trait::async_trait;
use safety_assist_infra::SessionMeta;
use safety_assist_tools::FunctionDeclaration;
use thiserror::Error;

/// Runtime errors.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Client not initialized")]
    NotInitialized,

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Failures talking to the model service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Network connection failed: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::RateLimited => true,
            ProviderError::Api { status, .. } => *status >= 500,
            ProviderError::Parse(_) => false,
        }
    }
}

/// Everything the provider needs for one model turn.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub system_instruction: &'a str,
    pub declarations: &'a [FunctionDeclaration],
    pub history: &'a [ConversationMessage],
}

/// Hosted model boundary.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Request one complete model turn.
    async fn generate(&self, request: ModelRequest<'_>) -> Result<CompletedTurn, ProviderError>;

    /// Request one model turn, surfacing text fragments through `on_text` as
    /// they arrive. Function calls are only available on the returned turn.
    async fn generate_stream(
        &self,
        request: ModelRequest<'_>,
        on_text: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<CompletedTurn, ProviderError> {
        let turn = self.generate(request).await?;
        if !turn.text.is_empty() {
            on_text(&turn.text);
        }
        Ok(turn)
    }
}

/// A stored transcript with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub meta: SessionMeta,
    pub messages: Vec<ConversationMessage>,
}

/// Durable transcript persistence. Load and append only.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create an empty session and return its id.
    async fn create_session(
        &self,
        user_id: &str,
        organization_id: &str,
        persona: &str,
    ) -> Result<String, RuntimeError>;

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, RuntimeError>;

    async fn append_message(
        &self,
        session_id: &str,
        message: &ConversationMessage,
    ) -> Result<(), RuntimeError>;

    /// Sessions owned by `user_id`, newest first.
    async fn list_sessions_for_user(&self, user_id: &str) -> Result<Vec<SessionMeta>, RuntimeError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::streaming::TurnAccumulator;

    struct CannedProvider;

    #[async_trait]
    impl ModelProvider for CannedProvider {
        async fn generate(&self, _request: ModelRequest<'_>) -> Result<CompletedTurn, ProviderError> {
            let mut acc = TurnAccumulator::new();
            acc.push_text("Three open incidents.");
            Ok(acc.finish())
        }
    }

    #[tokio::test]
    async fn test_default_stream_emits_whole_text_once() {
        let provider = CannedProvider;
        let mut chunks = Vec::new();
        let request = ModelRequest {
            system_instruction: "",
            declarations: &[],
            history: &[],
        };

        let turn = provider
            .generate_stream(request, &mut |t: &str| chunks.push(t.to_string()))
            .await
            .unwrap();

        assert_eq!(chunks, vec!["Three open incidents."]);
        assert_eq!(turn.text, "Three open incidents.");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Network("reset".into()).is_retryable());
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::Api { status: 503, message: String::new() }.is_retryable());
        assert!(!ProviderError::Api { status: 400, message: String::new() }.is_retryable());
        assert!(!ProviderError::Parse("eof".into()).is_retryable());
    }

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::SessionError("test error".to_string());
        assert_eq!(err.to_string(), "Session error: test error");

        let err: RuntimeError = ProviderError::RateLimited.into();
        assert_eq!(err.to_string(), "Provider error: Rate limit exceeded");
    }
}
