use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ToolError;

/// One function call requested by the model in a single turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallRequest {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl FunctionCallRequest {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Uniform outcome of one tool call.
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "..."}`; exactly one of the two is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope", into = "RawEnvelope")]
pub enum ExecutionEnvelope {
    Success(Value),
    Failure(String),
}

impl ExecutionEnvelope {
    pub fn success(data: Value) -> Self {
        ExecutionEnvelope::Success(data)
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ExecutionEnvelope::Failure(error.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionEnvelope::Success(_))
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ExecutionEnvelope::Success(data) => Some(data),
            ExecutionEnvelope::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExecutionEnvelope::Success(_) => None,
            ExecutionEnvelope::Failure(error) => Some(error),
        }
    }

    /// Object-shaped payload for a function-result turn.
    ///
    /// Providers require function responses to be objects, so arrays and
    /// primitives are wrapped as `{"result": ...}`.
    pub fn response_payload(&self) -> Value {
        match self {
            ExecutionEnvelope::Success(data @ Value::Object(_)) => data.clone(),
            ExecutionEnvelope::Success(data) => json!({ "result": data }),
            ExecutionEnvelope::Failure(error) => json!({ "error": error }),
        }
    }
}

impl From<Result<Value, ToolError>> for ExecutionEnvelope {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(data) => ExecutionEnvelope::Success(data),
            Err(err) => ExecutionEnvelope::Failure(err.envelope_message()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<RawEnvelope> for ExecutionEnvelope {
    type Error = String;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        match (raw.success, raw.data, raw.error) {
            (true, data, None) => Ok(ExecutionEnvelope::Success(data.unwrap_or(Value::Null))),
            (false, None, Some(error)) => Ok(ExecutionEnvelope::Failure(error)),
            _ => Err("envelope must carry exactly one of data or error".to_string()),
        }
    }
}

impl From<ExecutionEnvelope> for RawEnvelope {
    fn from(envelope: ExecutionEnvelope) -> Self {
        match envelope {
            ExecutionEnvelope::Success(data) => RawEnvelope {
                success: true,
                data: Some(data),
                error: None,
            },
            ExecutionEnvelope::Failure(error) => RawEnvelope {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_format() {
        let ok = serde_json::to_value(ExecutionEnvelope::success(json!({"n": 1}))).unwrap();
        assert_eq!(ok, json!({"success": true, "data": {"n": 1}}));

        let failed = serde_json::to_value(ExecutionEnvelope::failure("tool not found")).unwrap();
        assert_eq!(failed, json!({"success": false, "error": "tool not found"}));
    }

    #[test]
    fn test_envelope_rejects_both_fields() {
        let raw = json!({"success": false, "data": 1, "error": "x"});
        assert!(serde_json::from_value::<ExecutionEnvelope>(raw).is_err());
    }

    #[test]
    fn test_response_payload_wraps_non_objects() {
        assert_eq!(
            ExecutionEnvelope::success(json!([1, 2])).response_payload(),
            json!({"result": [1, 2]})
        );
        assert_eq!(
            ExecutionEnvelope::success(json!(7)).response_payload(),
            json!({"result": 7})
        );
        assert_eq!(
            ExecutionEnvelope::success(json!({"a": 1})).response_payload(),
            json!({"a": 1})
        );
        assert_eq!(
            ExecutionEnvelope::failure("db down").response_payload(),
            json!({"error": "db down"})
        );
    }

    #[test]
    fn test_from_tool_error_keeps_message_only() {
        let envelope: ExecutionEnvelope = Err(ToolError::Execution("db down".into())).into();
        assert_eq!(envelope.error(), Some("db down"));
        assert!(envelope.data().is_none());
    }
}
