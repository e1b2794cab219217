use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const API_KEY_ENV: &str = "QUERYBOT_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("API key is not set (add [api].key to config.toml or set {API_KEY_ENV})")]
    MissingApiKey,
    #[error("Discord token is not set (add [discord].token to config.toml)")]
    MissingDiscordToken,
    #[error("Database file '{0}' not found, create and seed it first")]
    MissingDatabase(String),
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    api: ApiConfig,
    #[serde(default)]
    database: DatabaseConfig,
    #[serde(default)]
    query: QueryConfig,
    #[serde(default)]
    chat: ChatConfig,
    #[serde(default)]
    discord: DiscordConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiConfig {
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(default)]
    key: String,
    #[serde(default = "default_api_url")]
    url: String,
    model: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct QueryConfig {
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default)]
    strict_sanitizer: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            strict_sanitizer: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChatConfig {
    #[serde(default = "default_chat_temperature")]
    temperature: f64,
    #[serde(default = "default_chat_max_tokens")]
    max_tokens: u64,
    persona_prompt: Option<String>,
    analysis_prompt: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            temperature: default_chat_temperature(),
            max_tokens: default_chat_max_tokens(),
            persona_prompt: None,
            analysis_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DiscordConfig {
    #[serde(default)]
    token: String,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_api_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_database_path() -> String {
    "student.db".to_string()
}

fn default_top_k() -> usize {
    5
}

fn default_chat_temperature() -> f64 {
    0.7
}

fn default_chat_max_tokens() -> u64 {
    300
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_provider: String,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub api_timeout_secs: u64,
    pub database_path: PathBuf,
    pub top_k: usize,
    pub strict_sanitizer: bool,
    pub chat_temperature: f64,
    pub chat_max_tokens: u64,
    pub persona_prompt: Option<String>,
    pub analysis_prompt: Option<String>,
    pub discord_token: String,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config_file: ConfigFile = toml::from_str(content)?;

        let api_key = if config_file.api.key.is_empty() {
            std::env::var(API_KEY_ENV).unwrap_or_default()
        } else {
            config_file.api.key
        };

        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            api_provider: config_file.api.provider,
            api_key,
            api_url: config_file.api.url,
            model: config_file.api.model,
            api_timeout_secs: config_file.api.timeout_secs,
            database_path: config_file.database.path.into(),
            top_k: config_file.query.top_k,
            strict_sanitizer: config_file.query.strict_sanitizer,
            chat_temperature: config_file.chat.temperature,
            chat_max_tokens: config_file.chat.max_tokens,
            persona_prompt: config_file.chat.persona_prompt,
            analysis_prompt: config_file.chat.analysis_prompt,
            discord_token: config_file.discord.token,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Fails when the configured database file does not exist, so the query
    /// tool never starts against an empty, freshly created database.
    pub fn require_database(&self) -> Result<&Path, ConfigError> {
        if self.database_path.exists() {
            Ok(&self.database_path)
        } else {
            Err(ConfigError::MissingDatabase(
                self.database_path.display().to_string(),
            ))
        }
    }

    pub fn require_discord_token(&self) -> Result<&str, ConfigError> {
        if self.discord_token.trim().is_empty() {
            Err(ConfigError::MissingDiscordToken)
        } else {
            Ok(&self.discord_token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_defaults_for_optional_sections() {
        let config = Config::from_toml(
            r#"
            [api]
            key = "gsk_test"
            model = "llama-3.1-8b-instant"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_provider, "openai");
        assert_eq!(config.api_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.api_timeout_secs, 60);
        assert_eq!(config.database_path, PathBuf::from("student.db"));
        assert_eq!(config.top_k, 5);
        assert!(!config.strict_sanitizer);
        assert_eq!(config.chat_temperature, 0.7);
        assert_eq!(config.chat_max_tokens, 300);
        assert!(config.persona_prompt.is_none());
        assert!(config.discord_token.is_empty());
    }

    #[test]
    fn reads_every_section() {
        let config = Config::from_toml(
            r#"
            [api]
            provider = "anthropic"
            key = "sk-ant"
            url = "https://api.anthropic.com"
            model = "claude-haiku"
            timeout_secs = 15

            [database]
            path = "data/school.db"

            [query]
            top_k = 10
            strict_sanitizer = true

            [chat]
            temperature = 0.2
            max_tokens = 512
            persona_prompt = "You are terse."

            [discord]
            token = "discord-token"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_provider, "anthropic");
        assert_eq!(config.api_timeout_secs, 15);
        assert_eq!(config.database_path, PathBuf::from("data/school.db"));
        assert_eq!(config.top_k, 10);
        assert!(config.strict_sanitizer);
        assert_eq!(config.chat_max_tokens, 512);
        assert_eq!(config.persona_prompt.as_deref(), Some("You are terse."));
        assert!(config.analysis_prompt.is_none());
        assert_eq!(config.require_discord_token().unwrap(), "discord-token");
    }

    #[test]
    fn missing_database_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::from_toml(
            r#"
            [api]
            key = "k"
            model = "m"
            "#,
        )
        .unwrap();
        config.database_path = dir.path().join("absent.db");

        assert!(matches!(
            config.require_database(),
            Err(ConfigError::MissingDatabase(_))
        ));

        std::fs::write(&config.database_path, b"").unwrap();
        assert!(config.require_database().is_ok());
    }

    #[test]
    fn missing_discord_token_is_reported() {
        let config = Config::from_toml(
            r#"
            [api]
            key = "k"
            model = "m"
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.require_discord_token(),
            Err(ConfigError::MissingDiscordToken)
        ));
    }
}
