//! Wires configuration into a ready-to-chat session client.

use anyhow::{Context, Result};
use safety_assist_infra::{FileAuditLog, FileSessionStore};
use safety_assist_runtime::{
    load_persona_config, AsyncAuditLog, AsyncSessionStore, ClientConfig, GeminiClient,
    GeminiConfig, ModelProvider, SessionClient, SessionStore,
};
use safety_assist_tools::{
    builtin_tools, ContextDescriptor, ExecutorConfig, Locale, ToolExecutor, ToolRegistry,
};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::data::JsonOperationalData;

pub struct Assistant {
    pub client: SessionClient,
    pub store: Arc<dyn SessionStore>,
    pub context: ContextDescriptor,
    pub tool_count: usize,
}

/// Gemini provider built from `[provider]`, keyed from the environment.
pub fn gemini_provider(config: &Config) -> Result<Arc<dyn ModelProvider>> {
    let section = &config.provider;
    let mut gemini = GeminiConfig::new(config.api_key()?)
        .with_model(section.model.clone())
        .with_max_output_tokens(section.max_output_tokens)
        .with_temperature(section.temperature)
        .with_max_retries(section.max_retries);
    if let Some(base_url) = &section.base_url {
        gemini = gemini.with_base_url(base_url.clone());
    }
    let client = GeminiClient::new(gemini).context("Failed to build Gemini client")?;
    Ok(Arc::new(client))
}

/// Build the assistant. With `resume`, the transcript of that session is
/// loaded; otherwise a new session is created for the configured user.
pub async fn build_assistant(
    config: &Config,
    provider: Arc<dyn ModelProvider>,
    resume: Option<&str>,
) -> Result<Assistant> {
    let persona_path = config.assistant.persona_config.to_string_lossy();
    let persona = load_persona_config(&persona_path)
        .with_context(|| format!("Failed to load persona config {}", persona_path))?;

    let data = JsonOperationalData::load(&config.assistant.data_file)?;
    let registry = Arc::new(ToolRegistry::new());
    registry.register_many(builtin_tools(Arc::new(data)));
    let tool_count = registry.count();

    let mut executor = ToolExecutor::new(
        registry,
        ExecutorConfig {
            tool_timeout: config.executor.tool_timeout(),
            max_argument_bytes: config.executor.max_argument_bytes,
        },
    );
    if let Some(path) = &config.executor.audit_log {
        let log = FileAuditLog::new(path)
            .with_context(|| format!("Failed to open audit log {}", path.display()))?;
        executor = executor.with_audit(Arc::new(AsyncAuditLog::new(Arc::new(log))));
    }

    let file_store = FileSessionStore::new(&config.session.sessions_dir).with_context(|| {
        format!(
            "Failed to open sessions dir {}",
            config.session.sessions_dir.display()
        )
    })?;
    let store: Arc<dyn SessionStore> = Arc::new(AsyncSessionStore::new(Arc::new(file_store)));

    let context = ContextDescriptor::new(
        config.assistant.organization_id.clone(),
        config.assistant.user_id.clone(),
        persona.persona,
    )
    .with_locale(Locale::from_tag(&config.assistant.locale));

    let max_tool_rounds = config
        .session
        .max_tool_rounds
        .or(persona.max_rounds)
        .unwrap_or(ClientConfig::default().max_tool_rounds);

    let session_id = match resume {
        Some(id) => id.to_string(),
        None => {
            store
                .create_session(
                    context.user_id(),
                    context.organization_id(),
                    context.persona().as_str(),
                )
                .await?
        }
    };

    let mut client = SessionClient::new(
        provider,
        Arc::new(executor),
        ClientConfig { max_tool_rounds },
    )
    .with_session_store(store.clone(), session_id.clone());
    client.initialize_for_persona(context.clone(), persona.instructions)?;

    if resume.is_some() {
        let restored = client
            .resume()
            .await
            .with_context(|| format!("Failed to resume session {}", session_id))?;
        info!(session = %session_id, messages = restored, "resumed session");
    } else {
        client.start_chat(Vec::new())?;
        info!(session = %session_id, persona = %context.persona(), "started session");
    }

    Ok(Assistant {
        client,
        store,
        context,
        tool_count,
    })
}
