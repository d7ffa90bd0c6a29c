//! Persona configuration loader.

use crate::interfaces::RuntimeError;
use safety_assist_tools::Persona;
use serde::Deserialize;
use std::path::Path;

/// Persona configuration.
#[derive(Debug, Clone)]
pub struct PersonaConfig {
    pub persona: Persona,
    /// System instruction text loaded from the referenced markdown file.
    pub instructions: String,
    pub max_rounds: Option<usize>,
}

/// Raw config structure from YAML.
#[derive(Debug, Deserialize)]
struct RawConfig {
    persona: String,
    instructions: String,
    #[serde(default)]
    max_rounds: Option<usize>,
}

/// Load persona configuration from a YAML file.
///
/// # Errors
/// Returns `ConfigError` if the file is missing or empty, the persona is
/// unknown, or the instruction file cannot be found.
pub fn load_persona_config(config_path: &str) -> Result<PersonaConfig, RuntimeError> {
    let config_file = Path::new(config_path);

    if !config_file.exists() {
        return Err(RuntimeError::ConfigError(format!(
            "Config file not found: {}",
            config_path
        )));
    }

    let content = std::fs::read_to_string(config_file)?;

    if content.trim().is_empty() {
        return Err(RuntimeError::ConfigError("Config file is empty".to_string()));
    }

    let raw_config: RawConfig = serde_yaml::from_str(&content)
        .map_err(|e| RuntimeError::ConfigError(format!("Invalid YAML: {}", e)))?;

    let persona: Persona = raw_config
        .persona
        .parse()
        .map_err(|_| RuntimeError::ConfigError(format!("Unknown persona: {}", raw_config.persona)))?;

    if raw_config.instructions.is_empty() {
        return Err(RuntimeError::ConfigError(
            "Config missing required field: instructions".to_string(),
        ));
    }

    if raw_config.max_rounds == Some(0) {
        return Err(RuntimeError::ConfigError(
            "max_rounds must be at least 1".to_string(),
        ));
    }

    // Resolve instruction file relative to the config file
    let instructions_path = if Path::new(&raw_config.instructions).is_absolute() {
        Path::new(&raw_config.instructions).to_path_buf()
    } else {
        config_file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&raw_config.instructions)
    };

    if !instructions_path.exists() {
        return Err(RuntimeError::ConfigError(format!(
            "Instruction file not found: {}",
            instructions_path.display()
        )));
    }

    let instructions = std::fs::read_to_string(&instructions_path)?;

    Ok(PersonaConfig {
        persona,
        instructions,
        max_rounds: raw_config.max_rounds,
    })
}
