#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use parking_lot::Mutex;
use safety_assist_runtime::*;
use safety_assist_tools::*;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Replays a fixed list of model turns and records every request history.
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Result<CompletedTurn, ProviderError>>>,
    pub requests: Mutex<Vec<Vec<ConversationMessage>>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Result<CompletedTurn, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn next(&self, request: &ModelRequest<'_>) -> Result<CompletedTurn, ProviderError> {
        self.requests.lock().push(request.history.to_vec());
        self.turns
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Parse("script exhausted".into())))
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<CompletedTurn, ProviderError> {
        self.next(&request)
    }

    async fn generate_stream(
        &self,
        request: ModelRequest<'_>,
        on_text: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<CompletedTurn, ProviderError> {
        let turn = self.next(&request)?;
        for piece in turn.text.split_inclusive(' ') {
            on_text(piece);
            tokio::task::yield_now().await;
        }
        Ok(turn)
    }
}

pub fn text(content: &str) -> Result<CompletedTurn, ProviderError> {
    Ok(CompletedTurn {
        text: content.to_string(),
        ..Default::default()
    })
}

pub fn calls(names: &[&str]) -> Result<CompletedTurn, ProviderError> {
    calls_with_text("", names)
}

pub fn calls_with_text(content: &str, names: &[&str]) -> Result<CompletedTurn, ProviderError> {
    Ok(CompletedTurn {
        text: content.to_string(),
        function_calls: names
            .iter()
            .map(|n| FunctionCallRequest::new(*n, json!({})))
            .collect(),
        ..Default::default()
    })
}

/// Stub tool that counts invocations and can fail or stall.
pub struct StubTool {
    pub name: &'static str,
    pub invocations: Arc<AtomicUsize>,
    pub failure: Option<&'static str>,
    pub delay: Duration,
}

impl StubTool {
    pub fn ok(name: &'static str) -> Self {
        Self {
            name,
            invocations: Arc::new(AtomicUsize::new(0)),
            failure: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(name: &'static str, message: &'static str) -> Self {
        Self {
            failure: Some(message),
            ..Self::ok(name)
        }
    }

    pub fn slow(name: &'static str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::ok(name)
        }
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Stub"
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new()
    }

    async fn execute(&self, _args: Value, _ctx: ContextDescriptor) -> Result<Value, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.failure {
            Some(message) => Err(ToolError::Execution(message.to_string())),
            None => Ok(json!({ "tool": self.name })),
        }
    }
}

/// Registers the stubs under the organization category so every persona sees them.
pub fn executor(tools: Vec<StubTool>) -> Arc<ToolExecutor> {
    let registry = Arc::new(ToolRegistry::new());
    for tool in tools {
        registry.register(Arc::new(tool), ToolCategory::Organization);
    }
    Arc::new(ToolExecutor::new(registry, ExecutorConfig::default()))
}

pub fn context() -> ContextDescriptor {
    ContextDescriptor::new("org-1", "u1", Persona::Incident)
}

pub fn started_client(
    provider: Arc<ScriptedProvider>,
    executor: Arc<ToolExecutor>,
    max_tool_rounds: usize,
) -> SessionClient {
    let mut client = SessionClient::new(provider, executor, ClientConfig { max_tool_rounds });
    client
        .initialize_for_persona(context(), "You are a workplace safety assistant.")
        .unwrap();
    client.start_chat(Vec::new()).unwrap();
    client
}

/// Drive a streamed turn and return the response with every emitted fragment.
pub async fn stream(client: &mut SessionClient, message: &str) -> (AssistantResponse, Vec<String>) {
    let mut chunks = Vec::new();
    let response = client
        .stream_message(message, &mut |fragment: &str| chunks.push(fragment.to_string()))
        .await;
    (response, chunks)
}
