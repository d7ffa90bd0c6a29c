//! Gemini client struct, request building, and response parsing.

use serde_json::{json, Value};
use std::time::Duration;

use crate::interfaces::{ModelRequest, ProviderError};
use crate::streaming::{CompletedTurn, TurnAccumulator};
use crate::types::{ConversationMessage, Role, TokenUsage};

use super::config::GeminiConfig;

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub(crate) fn api_url(&self, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent?alt=sse"
        } else {
            "generateContent"
        };
        format!(
            "{}/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    /// Build the JSON request body for one model turn.
    pub(crate) fn build_request_body(&self, request: &ModelRequest<'_>) -> Value {
        let mut body = json!({
            "contents": history_to_contents(request.history),
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens,
                "temperature": self.config.temperature,
            }
        });

        if !request.system_instruction.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{ "text": request.system_instruction }]
            });
        }

        if !request.declarations.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": request.declarations }]);
        }

        body
    }

    /// Parse a blocking `generateContent` response.
    pub(crate) fn parse_response(&self, json: &Value) -> Result<CompletedTurn, ProviderError> {
        let candidates = json["candidates"]
            .as_array()
            .ok_or_else(|| ProviderError::Parse("no candidates in response".to_string()))?;
        if candidates.is_empty() {
            return Err(ProviderError::Parse("empty candidates".to_string()));
        }

        let mut acc = TurnAccumulator::new();
        ingest_chunk(&mut acc, json);
        Ok(acc.finish())
    }

    /// Backoff before retry `attempt` (0-based).
    pub(crate) fn retry_delay(&self, attempt: u32, err: &ProviderError) -> Duration {
        if matches!(err, ProviderError::RateLimited) {
            return Duration::from_secs((2_u64.saturating_pow(attempt + 1)).min(30));
        }
        Duration::from_millis((250_u64.saturating_mul(2_u64.saturating_pow(attempt))).min(5000))
    }
}

/// Feed one response (or SSE chunk) into `acc`; returns the text it carried.
pub(crate) fn ingest_chunk(acc: &mut TurnAccumulator, data: &Value) -> String {
    let mut text = String::new();

    if let Some(parts) = data["candidates"][0]["content"]["parts"].as_array() {
        for part in parts {
            if let Some(t) = part["text"].as_str() {
                // Thought summaries are not part of the answer.
                if part["thought"].as_bool() == Some(true) {
                    continue;
                }
                text.push_str(t);
            } else if part.get("functionCall").is_some() {
                acc.push_part(part.clone());
            }
        }
    }
    acc.push_text(&text);

    if let Some(meta) = data.get("usageMetadata") {
        acc.set_usage(TokenUsage {
            input_tokens: meta["promptTokenCount"].as_u64().unwrap_or(0),
            output_tokens: meta["candidatesTokenCount"].as_u64().unwrap_or(0),
        });
    }

    text
}

/// Map the transcript to Gemini `contents`. Consecutive function results are
/// grouped into a single turn, answering the preceding model turn's calls.
pub(crate) fn history_to_contents(history: &[ConversationMessage]) -> Vec<Value> {
    let mut contents: Vec<Value> = Vec::new();
    let mut pending_responses: Vec<Value> = Vec::new();

    let flush = |contents: &mut Vec<Value>, pending: &mut Vec<Value>| {
        if !pending.is_empty() {
            contents.push(json!({ "role": "user", "parts": std::mem::take(pending) }));
        }
    };

    for msg in history {
        match msg.role {
            Role::FunctionResult => {
                if let Some(result) = &msg.function_result {
                    pending_responses.push(json!({
                        "functionResponse": {
                            "name": result.name,
                            "response": result.payload,
                        }
                    }));
                }
            }
            Role::User => {
                flush(&mut contents, &mut pending_responses);
                contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": msg.content }]
                }));
            }
            Role::Assistant => {
                flush(&mut contents, &mut pending_responses);
                let mut parts = Vec::new();
                if !msg.content.is_empty() || msg.function_calls.is_empty() {
                    parts.push(json!({ "text": msg.content }));
                }
                for call in &msg.function_calls {
                    parts.push(json!({
                        "functionCall": { "name": call.name, "args": call.args }
                    }));
                }
                contents.push(json!({ "role": "model", "parts": parts }));
            }
        }
    }
    flush(&mut contents, &mut pending_responses);

    contents
}
