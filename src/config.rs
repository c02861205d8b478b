use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{AIProvider, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::context::DEFAULT_CONTEXT_WINDOW;
use crate::models;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ai: AiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub provider: String,
    pub model: String,
    /// Empty means the provider's default endpoint.
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Overrides the per-surface default for the short-message heuristic.
    #[serde(default)]
    pub clarify_short_messages: Option<bool>,
    /// Where session history is stored; defaults to `~/.elemental/sessions`.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_context_window() -> usize {
    DEFAULT_CONTEXT_WINDOW
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            clarify_short_messages: None,
            storage_dir: None,
        }
    }
}

impl SessionConfig {
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| Config::config_dir().join("sessions"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai: AiConfig {
                provider: "groq".to_string(),
                model: models::default_model(AIProvider::Groq).to_string(),
                api_url: String::new(),
                api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: DEFAULT_MAX_TOKENS,
            },
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".elemental")
    }

    pub fn get_config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::get_config_path();

        if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("ignoring unreadable config {}: {}", config_path.display(), e),
            }
        }

        Ok(Self::default())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_file(Self::get_config_path())
    }

    pub fn provider(&self) -> AIProvider {
        AIProvider::parse(&self.ai.provider)
    }

    /// Fill an empty API key from the provider's environment variable.
    fn apply_env(&mut self) {
        if !self.ai.api_key.is_empty() {
            return;
        }
        let var = match self.provider() {
            AIProvider::Groq => "GROQ_API_KEY",
            AIProvider::Gemini => "GEMINI_API_KEY",
        };
        if let Ok(key) = std::env::var(var) {
            self.ai.api_key = key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.ai.model = "llama3-8b-8192".to_string();
        config.ai.api_key = "secret".to_string();
        config.session.context_window = 3;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.ai.model, "llama3-8b-8192");
        assert_eq!(loaded.ai.api_key, "secret");
        assert_eq!(loaded.session.context_window, 3);
    }

    #[test]
    #[serial]
    fn missing_fields_take_defaults_and_env_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ai:\n  provider: gemini\n  model: gemini-2.0-flash\n").unwrap();

        std::env::set_var("GEMINI_API_KEY", "from-env");
        let loaded = Config::load_from_file(&path).unwrap();
        std::env::remove_var("GEMINI_API_KEY");

        assert_eq!(loaded.provider(), AIProvider::Gemini);
        assert_eq!(loaded.ai.api_key, "from-env");
        assert_eq!(loaded.ai.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(loaded.session.context_window, DEFAULT_CONTEXT_WINDOW);
        assert!(loaded.session.clarify_short_messages.is_none());
    }
}
