//! Server-sent event parsing and two-phase turn accumulation.
//!
//! A streamed model turn interleaves text fragments with structured parts.
//! Text can be surfaced immediately; structured parts are only interpreted
//! once the turn is complete, through [`TurnAccumulator::finish`].

use futures_util::StreamExt;
use safety_assist_tools::FunctionCallRequest;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;
use tracing::warn;

use crate::interfaces::ProviderError;
use crate::types::TokenUsage;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Parse an SSE stream from a reqwest response, calling `on_event` for each event.
pub async fn parse_sse_stream(
    response: reqwest::Response,
    on_event: impl FnMut(SseEvent),
) -> Result<(), ProviderError> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
    parse_sse_lines(reader, on_event).await
}

/// Line-level SSE parsing over any buffered reader.
pub async fn parse_sse_lines<R>(
    reader: R,
    mut on_event: impl FnMut(SseEvent),
) -> Result<(), ProviderError>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut current_event: Option<String> = None;
    let mut current_data = String::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?
    {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            if !current_data.is_empty() {
                on_event(SseEvent {
                    event: current_event.take(),
                    data: std::mem::take(&mut current_data),
                });
            }
            current_event = None;
            continue;
        }

        if let Some(event_type) = line.strip_prefix("event:") {
            current_event = Some(event_type.trim_start().to_string());
        } else if let Some(data) = line.strip_prefix("data:") {
            if !current_data.is_empty() {
                current_data.push('\n');
            }
            current_data.push_str(data.strip_prefix(' ').unwrap_or(data));
        }
        // id:, retry: and comments are ignored
    }

    if !current_data.is_empty() {
        on_event(SseEvent {
            event: current_event,
            data: current_data,
        });
    }

    Ok(())
}

/// Collects one model turn while it streams in.
#[derive(Debug, Default)]
pub struct TurnAccumulator {
    text: String,
    parts: Vec<Value>,
    usage: TokenUsage,
}

impl TurnAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }

    /// Record a structured (non-text) part for interpretation at the end of the turn.
    pub fn push_part(&mut self, part: Value) {
        self.parts.push(part);
    }

    pub fn set_usage(&mut self, usage: TokenUsage) {
        self.usage = usage;
    }

    /// Text received so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Close the turn and interpret its structured parts.
    pub fn finish(self) -> CompletedTurn {
        let function_calls = self
            .parts
            .iter()
            .filter_map(|part| part.get("functionCall"))
            .filter_map(|call| {
                let name = call.get("name").and_then(Value::as_str).unwrap_or_default();
                if name.is_empty() {
                    warn!("dropping function call part without a name");
                    return None;
                }
                let args = match call.get("args") {
                    Some(Value::Null) | None => Value::Object(Default::default()),
                    Some(args) => args.clone(),
                };
                Some(FunctionCallRequest::new(name, args))
            })
            .collect();

        CompletedTurn {
            text: self.text,
            function_calls,
            usage: self.usage,
        }
    }
}

/// A fully received model turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletedTurn {
    pub text: String,
    pub function_calls: Vec<FunctionCallRequest>,
    pub usage: TokenUsage,
}

impl CompletedTurn {
    pub fn has_function_calls(&self) -> bool {
        !self.function_calls.is_empty()
    }
}
