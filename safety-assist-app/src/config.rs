use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "safety-assist.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub executor: ExecutorSection,
    #[serde(default)]
    pub session: SessionSection,
    pub assistant: AssistantSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: f64,
    pub max_retries: u32,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: None,
            max_output_tokens: 2048,
            temperature: 0.2,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSection {
    pub tool_timeout_ms: u64,
    pub max_argument_bytes: usize,
    pub audit_log: Option<PathBuf>,
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            tool_timeout_ms: 15_000,
            max_argument_bytes: 64 * 1024,
            audit_log: None,
        }
    }
}

impl ExecutorSection {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub sessions_dir: PathBuf,
    /// Overrides the persona file's `max_rounds` when set.
    pub max_tool_rounds: Option<usize>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            sessions_dir: PathBuf::from("./data/sessions"),
            max_tool_rounds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSection {
    pub persona_config: PathBuf,
    pub data_file: PathBuf,
    pub organization_id: String,
    pub user_id: String,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_locale() -> String {
    "en".to_string()
}

impl Config {
    /// Read, parse and validate a config file. Relative paths inside it are
    /// resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.resolve_paths(path.parent().unwrap_or_else(|| Path::new(".")));
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.assistant.organization_id.trim().is_empty() {
            bail!("assistant.organization_id cannot be empty");
        }
        if self.assistant.user_id.trim().is_empty() {
            bail!("assistant.user_id cannot be empty");
        }
        if self.provider.api_key_env.trim().is_empty() {
            bail!("provider.api_key_env cannot be empty");
        }
        if self.provider.model.trim().is_empty() {
            bail!("provider.model cannot be empty");
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            bail!("provider.temperature must be between 0 and 2");
        }
        if self.executor.tool_timeout_ms == 0 {
            bail!("executor.tool_timeout_ms must be positive");
        }
        if self.session.max_tool_rounds == Some(0) {
            bail!("session.max_tool_rounds must be at least 1");
        }
        Ok(())
    }

    /// API key from the environment variable named in `[provider]`.
    pub fn api_key(&self) -> Result<String> {
        let name = &self.provider.api_key_env;
        let key = std::env::var(name)
            .with_context(|| format!("Environment variable {} is not set", name))?;
        if key.trim().is_empty() {
            bail!("Environment variable {} is empty", name);
        }
        Ok(key)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.session.sessions_dir);
        resolve(&mut self.assistant.persona_config);
        resolve(&mut self.assistant.data_file);
        if let Some(audit) = self.executor.audit_log.as_mut() {
            resolve(audit);
        }
    }
}
