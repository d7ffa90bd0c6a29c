//! Safety Assist runtime core.
//!
//! Drives conversations between a hosted model and the safety tool executor.

pub mod async_adapters;
pub mod gemini;
pub mod interfaces;
pub mod metrics;
pub mod persona_config;
pub mod session_client;
pub mod streaming;
pub mod types;

pub use async_adapters::{AsyncAuditLog, AsyncSessionStore};
pub use gemini::{GeminiClient, GeminiConfig};
pub use interfaces::{
    ModelProvider, ModelRequest, ProviderError, RuntimeError, SessionRecord, SessionStore,
};
pub use persona_config::{load_persona_config, PersonaConfig};
pub use session_client::{ClientConfig, ClientPhase, SessionClient};
pub use streaming::{CompletedTurn, TurnAccumulator};
pub use types::{AssistantResponse, ConversationMessage, Role, TokenUsage, SCHEMA_VERSION};
