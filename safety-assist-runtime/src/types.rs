//! Conversation types shared by the session client and providers.

use chrono::{DateTime, Utc};
use safety_assist_tools::FunctionCallRequest;
use serde::{Deserialize, Serialize};

/// Schema version for persisted transcripts.
pub const SCHEMA_VERSION: u32 = 1;

/// Message role in conversation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    FunctionResult,
}

/// Response payload returned to the model for one requested call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FunctionResult {
    pub name: String,
    pub payload: serde_json::Value,
}

/// A single message in the conversation transcript.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConversationMessage {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub role: Role,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Calls the model requested in this turn (assistant messages only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCallRequest>,
    /// Result for a prior request, matched by name (function-result messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_result: Option<FunctionResult>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ConversationMessage {
    fn new(role: Role) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            role,
            content: String::new(),
            function_calls: Vec::new(),
            function_result: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new(Role::User)
        }
    }

    pub fn assistant(content: impl Into<String>, function_calls: Vec<FunctionCallRequest>) -> Self {
        Self {
            content: content.into(),
            function_calls,
            ..Self::new(Role::Assistant)
        }
    }

    pub fn function_result(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            function_result: Some(FunctionResult {
                name: name.into(),
                payload,
            }),
            ..Self::new(Role::FunctionResult)
        }
    }

    /// Validate schema version.
    pub fn validate_version(&self) -> Result<(), String> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                SCHEMA_VERSION, self.schema_version
            ));
        }
        Ok(())
    }
}

/// Token accounting reported by the provider for one model turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// What the caller gets back for one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub content: String,
    /// Every call executed during the turn, across all rounds, in request order.
    #[serde(default)]
    pub function_calls_performed: Vec<FunctionCallRequest>,
    /// Heuristic: high for a normal answer, 0 for a degraded or fallback reply.
    pub confidence: f32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::to_string(&Role::FunctionResult).unwrap(),
            r#""function_result""#
        );
    }

    #[test]
    fn test_user_message_omits_empty_fields() {
        let value = serde_json::to_value(ConversationMessage::user("Hello")).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"], "Hello");
        assert!(value.get("function_calls").is_none());
        assert!(value.get("function_result").is_none());
    }

    #[test]
    fn test_assistant_message_round_trip() {
        let msg = ConversationMessage::assistant(
            "",
            vec![FunctionCallRequest::new("get_recent_incidents", json!({"days": 7}))],
        );
        let parsed: ConversationMessage =
            serde_json::from_str(&serde_json::to_string(&msg).unwrap()).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_legacy_line_defaults() {
        let parsed: ConversationMessage =
            serde_json::from_str(r#"{"role": "assistant", "content": "Hi"}"#).unwrap();
        assert_eq!(parsed.schema_version, SCHEMA_VERSION);
        assert!(parsed.function_calls.is_empty());
        assert!(parsed.validate_version().is_ok());
    }

    #[test]
    fn test_version_mismatch_detected() {
        let mut msg = ConversationMessage::user("x");
        msg.schema_version = 99;
        assert!(msg.validate_version().is_err());
    }

    #[test]
    fn test_invalid_role_deserialization() {
        let result: Result<ConversationMessage, _> =
            serde_json::from_str(r#"{"role": "system", "content": "test"}"#);
        assert!(result.is_err());
    }
}
