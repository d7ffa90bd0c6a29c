use safety_assist_app::config::Config;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const MINIMAL: &str = r#"
[assistant]
persona_config = "personas/general.yaml"
data_file = "data.json"
organization_id = "org-1"
user_id = "u1"
"#;

#[test]
fn test_defaults_fill_missing_sections() {
    let config = Config::from_toml_str(MINIMAL).unwrap();

    assert_eq!(config.provider.model, "gemini-2.0-flash");
    assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
    assert_eq!(config.provider.max_retries, 2);
    assert_eq!(config.executor.tool_timeout(), Duration::from_secs(15));
    assert_eq!(config.executor.max_argument_bytes, 64 * 1024);
    assert!(config.executor.audit_log.is_none());
    assert_eq!(config.session.max_tool_rounds, None);
    assert_eq!(config.assistant.locale, "en");
}

#[test]
fn test_full_config() {
    let toml = r#"
[provider]
model = "gemini-1.5-pro"
api_key_env = "SAFETY_KEY"
base_url = "http://localhost:9000/models"
max_output_tokens = 512
temperature = 0.0
max_retries = 0

[executor]
tool_timeout_ms = 2500
max_argument_bytes = 1024

[session]
sessions_dir = "/var/lib/safety/sessions"
max_tool_rounds = 3

[assistant]
persona_config = "p.yaml"
data_file = "d.json"
organization_id = "org-9"
user_id = "u9"
locale = "fr-CA"
"#;
    let config = Config::from_toml_str(toml).unwrap();

    assert_eq!(config.provider.model, "gemini-1.5-pro");
    assert_eq!(config.provider.base_url.as_deref(), Some("http://localhost:9000/models"));
    assert_eq!(config.executor.tool_timeout(), Duration::from_millis(2500));
    assert_eq!(config.session.max_tool_rounds, Some(3));
    assert_eq!(config.assistant.locale, "fr-CA");
}

#[test]
fn test_validation_errors() {
    let blank_org = MINIMAL.replace("\"org-1\"", "\"  \"");
    assert!(Config::from_toml_str(&blank_org).is_err());

    let zero_rounds = format!("[session]\nmax_tool_rounds = 0\n{}", MINIMAL);
    assert!(Config::from_toml_str(&zero_rounds).is_err());

    let zero_timeout = format!("[executor]\ntool_timeout_ms = 0\n{}", MINIMAL);
    assert!(Config::from_toml_str(&zero_timeout).is_err());

    let hot = format!("[provider]\ntemperature = 3.5\n{}", MINIMAL);
    assert!(Config::from_toml_str(&hot).is_err());

    assert!(Config::from_toml_str("[provider]\nmodel = \"x\"\n").is_err());
}

#[test]
fn test_load_resolves_relative_paths() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("safety-assist.toml");
    let content = format!("[executor]\naudit_log = \"logs/audit.jsonl\"\n{}", MINIMAL);
    std::fs::write(&path, content).unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(
        config.assistant.persona_config,
        dir.path().join("personas/general.yaml")
    );
    assert_eq!(config.assistant.data_file, dir.path().join("data.json"));
    assert_eq!(config.session.sessions_dir, dir.path().join("./data/sessions"));
    assert_eq!(
        config.executor.audit_log.as_deref(),
        Some(dir.path().join("logs/audit.jsonl").as_path())
    );
}

#[test]
fn test_load_missing_file() {
    assert!(Config::load(Path::new("/nonexistent/safety-assist.toml")).is_err());
}

#[test]
fn test_api_key_from_named_variable() {
    let toml = format!(
        "[provider]\napi_key_env = \"SAFETY_ASSIST_TEST_KEY_PRESENT\"\n{}",
        MINIMAL
    );
    let config = Config::from_toml_str(&toml).unwrap();
    std::env::set_var("SAFETY_ASSIST_TEST_KEY_PRESENT", "k-123");
    assert_eq!(config.api_key().unwrap(), "k-123");

    let toml = format!(
        "[provider]\napi_key_env = \"SAFETY_ASSIST_TEST_KEY_MISSING\"\n{}",
        MINIMAL
    );
    let config = Config::from_toml_str(&toml).unwrap();
    assert!(config.api_key().is_err());
}
