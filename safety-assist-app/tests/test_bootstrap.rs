use async_trait::async_trait;
use safety_assist_app::bootstrap::build_assistant;
use safety_assist_app::config::Config;
use safety_assist_runtime::{
    ClientPhase, CompletedTurn, ConversationMessage, ModelProvider, ModelRequest, ProviderError,
};
use safety_assist_tools::{FunctionCallRequest, Persona};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct Scripted {
    turns: Mutex<VecDeque<CompletedTurn>>,
    seen: Mutex<Vec<Vec<ConversationMessage>>>,
    declared: Mutex<Vec<String>>,
}

impl Scripted {
    fn new(turns: Vec<CompletedTurn>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            seen: Mutex::new(Vec::new()),
            declared: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ModelProvider for Scripted {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<CompletedTurn, ProviderError> {
        self.seen.lock().unwrap().push(request.history.to_vec());
        *self.declared.lock().unwrap() =
            request.declarations.iter().map(|d| d.name.clone()).collect();
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Parse("script exhausted".into()))
    }
}

fn write_fixture(dir: &Path, persona: &str, locale: &str) -> Config {
    std::fs::create_dir_all(dir.join("personas")).unwrap();
    std::fs::write(
        dir.join("personas/assistant.yaml"),
        format!("persona: {}\ninstructions: assistant.md\nmax_rounds: 3\n", persona),
    )
    .unwrap();
    std::fs::write(dir.join("personas/assistant.md"), "You are a safety assistant.").unwrap();
    std::fs::write(
        dir.join("data.json"),
        json!({
            "organizations": {
                "org-1": {
                    "incidents": [{
                        "_id": "6650f1c2a1b2c3d4e5f60801",
                        "organizationId": "org-1",
                        "reference": "INC-2025-0012",
                        "title": "Forklift collision",
                        "status": "in_progress",
                        "severity": "high",
                        "occurredAt": chrono::Utc::now().to_rfc3339(),
                        "reporterId": "usr_1021"
                    }]
                }
            }
        })
        .to_string(),
    )
    .unwrap();

    let toml = format!(
        r#"
[executor]
audit_log = "audit.jsonl"

[session]
sessions_dir = "sessions"

[assistant]
persona_config = "personas/assistant.yaml"
data_file = "data.json"
organization_id = "org-1"
user_id = "u1"
locale = "{}"
"#,
        locale
    );
    let path = dir.join("safety-assist.toml");
    std::fs::write(&path, toml).unwrap();
    Config::load(&path).unwrap()
}

fn incident_call() -> CompletedTurn {
    CompletedTurn {
        function_calls: vec![FunctionCallRequest::new(
            "get_recent_incidents",
            json!({"days": 7}),
        )],
        ..Default::default()
    }
}

fn answer(text: &str) -> CompletedTurn {
    CompletedTurn {
        text: text.to_string(),
        ..Default::default()
    }
}

/// Audit records are written in the background.
async fn wait_for_audit(path: &Path) -> String {
    for _ in 0..100 {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if !content.is_empty() {
            return content;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("audit record never written");
}

#[tokio::test]
async fn test_turn_runs_catalog_tool_with_sanitized_output() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "incident_ai", "fr");
    let provider = Scripted::new(vec![incident_call(), answer("Un incident en cours.")]);

    let mut assistant = build_assistant(&config, provider.clone(), None).await.unwrap();
    assert_eq!(assistant.client.phase(), ClientPhase::ChatStarted);
    assert_eq!(assistant.context.persona(), Persona::Incident);

    let response = assistant.client.send_message("Incidents cette semaine ?").await;
    assert_eq!(response.content, "Un incident en cours.");
    assert_eq!(response.function_calls_performed.len(), 1);

    let declared = provider.declared.lock().unwrap().clone();
    assert!(declared.contains(&"get_recent_incidents".to_string()));
    assert!(!declared.contains(&"get_health_surveillance_due".to_string()));

    let seen = provider.seen.lock().unwrap();
    let payload: Value = seen[1][2].function_result.clone().unwrap().payload;
    assert_eq!(payload["count"], 1);
    let incident = &payload["incidents"][0];
    assert_eq!(incident["reference"], "INC-2025-0012");
    assert_eq!(incident["status"], "En cours");
    assert!(incident.get("_id").is_none());
    assert!(incident.get("organizationId").is_none());
    assert!(incident.get("reporterId").is_none());

    let audit = wait_for_audit(&dir.path().join("audit.jsonl")).await;
    assert!(audit.contains("get_recent_incidents"));
    assert!(!audit.contains("INC-2025-0012"));
}

#[tokio::test]
async fn test_session_is_persisted_and_resumable() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "general_ai", "en");

    let provider = Scripted::new(vec![answer("Hello.")]);
    let mut assistant = build_assistant(&config, provider, None).await.unwrap();
    assistant.client.send_message("hi").await;
    let session_id = assistant.client.session_id().unwrap().to_string();

    let sessions = assistant.store.list_sessions_for_user("u1").await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].persona, "general_ai");

    let provider = Scripted::new(vec![answer("Welcome back.")]);
    let resumed = build_assistant(&config, provider, Some(&session_id)).await.unwrap();
    assert_eq!(resumed.client.history().len(), 2);
    assert_eq!(resumed.client.history()[1].content, "Hello.");
}

#[tokio::test]
async fn test_resume_unknown_session_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "general_ai", "en");
    let provider = Scripted::new(vec![]);
    assert!(build_assistant(&config, provider, Some("missing")).await.is_err());
}

#[tokio::test]
async fn test_missing_persona_file_fails() {
    let dir = TempDir::new().unwrap();
    let mut config = write_fixture(dir.path(), "general_ai", "en");
    config.assistant.persona_config = dir.path().join("personas/none.yaml");
    let provider = Scripted::new(vec![]);
    assert!(build_assistant(&config, provider, None).await.is_err());
}
