//! Model session client - the conversation state machine.
//!
//! Lifecycle: `Uninitialized -> Initialized -> ChatStarted`. Each user
//! message runs one turn: the model is asked for a reply, any function calls
//! it requests are executed as one concurrent round, the results are fed
//! back, and this repeats until the model answers in plain text or the round
//! bound is hit. Failures never escape a turn; they become degraded replies.

use safety_assist_tools::{
    ContextDescriptor, FunctionDeclaration, Persona, ToolExecutor,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::interfaces::{ModelProvider, ModelRequest, ProviderError, RuntimeError, SessionStore};
use crate::metrics::{self, MetricTimer};
use crate::types::{AssistantResponse, ConversationMessage};

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 6;

/// Reply when a message arrives before `initialize` and `start_chat`.
pub const DEGRADED_MESSAGE: &str =
    "The assistant is not ready yet. Please start a new conversation and try again.";
/// Reply when the model service cannot be reached.
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I could not reach the assistant service. Please try again in a moment.";
/// Reply when the model keeps requesting tools past the round bound.
pub const ROUND_LIMIT_MESSAGE: &str =
    "I could not complete this request. Please try a more specific question.";

pub const CONFIDENCE_NORMAL: f32 = 0.9;
pub const CONFIDENCE_ROUND_LIMIT: f32 = 0.5;
pub const CONFIDENCE_DEGRADED: f32 = 0.0;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Tool rounds allowed per user message.
    pub max_tool_rounds: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    Uninitialized,
    Initialized,
    ChatStarted,
}

struct Binding {
    context: ContextDescriptor,
    declarations: Vec<FunctionDeclaration>,
    system_prompt: String,
}

enum ClientState {
    Uninitialized,
    Initialized(Binding),
    ChatStarted {
        binding: Binding,
        history: Vec<ConversationMessage>,
    },
}

struct SessionBinding {
    store: Arc<dyn SessionStore>,
    session_id: String,
}

enum TurnEnd {
    Answer(String),
    RoundLimit(String),
    Transport(ProviderError),
}

type ChunkSink<'a> = Option<&'a mut (dyn for<'s> FnMut(&'s str) + Send)>;

/// One conversation. Not shared: callers hold one client per active session
/// and serialize turns through `&mut self`.
pub struct SessionClient {
    provider: Arc<dyn ModelProvider>,
    executor: Arc<ToolExecutor>,
    config: ClientConfig,
    state: ClientState,
    session: Option<SessionBinding>,
}

impl SessionClient {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        executor: Arc<ToolExecutor>,
        config: ClientConfig,
    ) -> Self {
        Self {
            provider,
            executor,
            config,
            state: ClientState::Uninitialized,
            session: None,
        }
    }

    /// Persist each completed turn to `store` under `session_id`.
    pub fn with_session_store(
        mut self,
        store: Arc<dyn SessionStore>,
        session_id: impl Into<String>,
    ) -> Self {
        self.session = Some(SessionBinding {
            store,
            session_id: session_id.into(),
        });
        self
    }

    pub fn phase(&self) -> ClientPhase {
        match self.state {
            ClientState::Uninitialized => ClientPhase::Uninitialized,
            ClientState::Initialized(_) => ClientPhase::Initialized,
            ClientState::ChatStarted { .. } => ClientPhase::ChatStarted,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    /// Transcript of the current chat; empty before `start_chat`.
    pub fn history(&self) -> &[ConversationMessage] {
        match &self.state {
            ClientState::ChatStarted { history, .. } => history,
            _ => &[],
        }
    }

    /// Bind persona, identity, tool declarations and system prompt. Any
    /// running chat is discarded.
    pub fn initialize(
        &mut self,
        persona: Persona,
        context: ContextDescriptor,
        tools: Vec<FunctionDeclaration>,
        system_prompt: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        if context.persona() != persona {
            return Err(RuntimeError::ConfigError(format!(
                "context persona {} does not match {}",
                context.persona(),
                persona
            )));
        }

        info!(%persona, tools = tools.len(), "session client initialized");
        self.state = ClientState::Initialized(Binding {
            context,
            declarations: tools,
            system_prompt: system_prompt.into(),
        });
        Ok(())
    }

    /// [`Self::initialize`] with the declarations the registry exposes to `persona`.
    pub fn initialize_for_persona(
        &mut self,
        context: ContextDescriptor,
        system_prompt: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        let persona = context.persona();
        let tools = self.executor.registry().declarations_for_persona(persona);
        self.initialize(persona, context, tools, system_prompt)
    }

    /// Seed the transcript. Calling it again resets the chat.
    pub fn start_chat(&mut self, history: Vec<ConversationMessage>) -> Result<(), RuntimeError> {
        let binding = match std::mem::replace(&mut self.state, ClientState::Uninitialized) {
            ClientState::Uninitialized => return Err(RuntimeError::NotInitialized),
            ClientState::Initialized(binding) => binding,
            ClientState::ChatStarted { binding, .. } => binding,
        };

        let history: Vec<ConversationMessage> = history
            .into_iter()
            .filter(|msg| match msg.validate_version() {
                Ok(()) => true,
                Err(e) => {
                    warn!("dropping history message: {}", e);
                    false
                }
            })
            .collect();

        debug!(messages = history.len(), "chat started");
        self.state = ClientState::ChatStarted { binding, history };
        Ok(())
    }

    /// Load the bound session's transcript and start the chat with it.
    /// Returns the number of messages restored.
    pub async fn resume(&mut self) -> Result<usize, RuntimeError> {
        let Some(session) = &self.session else {
            return Err(RuntimeError::ConfigError("no session store bound".to_string()));
        };
        let record = session
            .store
            .get_session(&session.session_id)
            .await?
            .ok_or_else(|| {
                RuntimeError::SessionError(format!("session not found: {}", session.session_id))
            })?;

        let context = match &self.state {
            ClientState::Uninitialized => return Err(RuntimeError::NotInitialized),
            ClientState::Initialized(binding) | ClientState::ChatStarted { binding, .. } => {
                &binding.context
            }
        };
        let meta = &record.meta;
        if meta.user_id != context.user_id()
            || meta.organization_id != context.organization_id()
            || meta.persona != context.persona().as_str()
        {
            warn!(session = %meta.id, "session does not belong to the current context");
            return Err(RuntimeError::SessionError(format!(
                "session not accessible: {}",
                meta.id
            )));
        }

        let count = record.messages.len();
        self.start_chat(record.messages)?;
        info!(session = %record.meta.id, messages = count, "session resumed");
        Ok(count)
    }

    /// Run one turn and return the final reply.
    pub async fn send_message(&mut self, text: &str) -> AssistantResponse {
        self.run_turn(text, None).await
    }

    /// Run one turn, surfacing text to `on_chunk` as it arrives. The returned
    /// content equals the concatenation of every fragment passed to `on_chunk`.
    pub async fn stream_message(
        &mut self,
        text: &str,
        on_chunk: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> AssistantResponse {
        self.run_turn(text, Some(on_chunk)).await
    }

    async fn run_turn(&mut self, text: &str, mut sink: ChunkSink<'_>) -> AssistantResponse {
        let phase = self.phase();
        let provider = self.provider.clone();
        let executor = self.executor.clone();
        let max_rounds = self.config.max_tool_rounds;
        let streaming = sink.is_some();

        let ClientState::ChatStarted { binding, history } = &mut self.state else {
            warn!(?phase, "message received before chat started");
            metrics::increment_degraded_responses();
            let mut emitted = String::new();
            emit(&mut sink, &mut emitted, DEGRADED_MESSAGE);
            return AssistantResponse {
                content: DEGRADED_MESSAGE.to_string(),
                function_calls_performed: Vec::new(),
                confidence: CONFIDENCE_DEGRADED,
            };
        };

        let turn_start = history.len();
        history.push(ConversationMessage::user(text));

        let mut emitted = String::new();
        let mut performed = Vec::new();
        let mut rounds = 0usize;

        let end = loop {
            let request = ModelRequest {
                system_instruction: &binding.system_prompt,
                declarations: &binding.declarations,
                history: history.as_slice(),
            };
            let result = match sink.as_deref_mut() {
                Some(on_chunk) => {
                    let mut forward = |fragment: &str| {
                        emitted.push_str(fragment);
                        on_chunk(fragment);
                    };
                    provider.generate_stream(request, &mut forward).await
                }
                None => provider.generate(request).await,
            };
            let turn = match result {
                Ok(turn) => turn,
                Err(e) => break TurnEnd::Transport(e),
            };

            if !turn.has_function_calls() {
                history.push(ConversationMessage::assistant(turn.text.clone(), Vec::new()));
                break TurnEnd::Answer(turn.text);
            }

            if rounds >= max_rounds {
                warn!(
                    rounds,
                    pending = turn.function_calls.len(),
                    "tool round limit reached, not executing further calls"
                );
                let shown = if turn.text.is_empty() {
                    ROUND_LIMIT_MESSAGE.to_string()
                } else {
                    turn.text.clone()
                };
                history.push(ConversationMessage::assistant(shown, Vec::new()));
                break TurnEnd::RoundLimit(turn.text);
            }

            rounds += 1;
            debug!(round = rounds, calls = turn.function_calls.len(), "resolving tool calls");
            history.push(ConversationMessage::assistant(
                turn.text.clone(),
                turn.function_calls.clone(),
            ));

            let timer = MetricTimer::new("tool_round_latency");
            let batch = executor
                .execute_many(&turn.function_calls, &binding.context)
                .await;
            drop(timer);
            metrics::increment_tool_rounds();

            // Results follow the model's request order, not completion order.
            for outcome in batch.iter() {
                history.push(ConversationMessage::function_result(
                    outcome.call.name.clone(),
                    outcome.envelope.response_payload(),
                ));
            }
            performed.extend(turn.function_calls);
        };

        let response = match end {
            TurnEnd::Answer(text) => AssistantResponse {
                content: if streaming { emitted } else { text },
                function_calls_performed: performed,
                confidence: CONFIDENCE_NORMAL,
            },
            TurnEnd::RoundLimit(text) => {
                let content = if streaming {
                    if text.is_empty() {
                        emit(&mut sink, &mut emitted, ROUND_LIMIT_MESSAGE);
                    }
                    emitted
                } else if text.is_empty() {
                    ROUND_LIMIT_MESSAGE.to_string()
                } else {
                    text
                };
                AssistantResponse {
                    content,
                    function_calls_performed: performed,
                    confidence: CONFIDENCE_ROUND_LIMIT,
                }
            }
            TurnEnd::Transport(e) => {
                warn!(rounds, "model request failed: {}", e);
                metrics::increment_degraded_responses();
                // Messages already appended stay; the notice closes the turn.
                history.push(ConversationMessage::assistant(FALLBACK_MESSAGE, Vec::new()));
                emit(&mut sink, &mut emitted, FALLBACK_MESSAGE);
                AssistantResponse {
                    content: if streaming {
                        emitted
                    } else {
                        FALLBACK_MESSAGE.to_string()
                    },
                    function_calls_performed: performed,
                    confidence: CONFIDENCE_DEGRADED,
                }
            }
        };

        info!(
            persona = %binding.context.persona(),
            rounds,
            calls = response.function_calls_performed.len(),
            "turn completed"
        );

        let new_messages = history[turn_start..].to_vec();
        self.persist(&new_messages).await;

        response
    }

    async fn persist(&self, messages: &[ConversationMessage]) {
        let Some(session) = &self.session else {
            return;
        };
        for msg in messages {
            if let Err(e) = session.store.append_message(&session.session_id, msg).await {
                warn!(session = %session.session_id, "failed to persist message: {}", e);
                return;
            }
        }
    }
}

fn emit(sink: &mut ChunkSink<'_>, emitted: &mut String, text: &str) {
    if let Some(on_chunk) = sink.as_deref_mut() {
        emitted.push_str(text);
        on_chunk(text);
    }
}
