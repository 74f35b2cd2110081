// src/core/config_manager.rs
//! Configuration loading: config.yaml section per environment, then env overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const DEFAULT_DATABASE_PATH: &str = "data/profile_insights.db";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ADDRESS: &str = "0.0.0.0";
const DEFAULT_TEMPERATURE: f32 = 0.8;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment_name: String,
    /// The config.yaml that was read, if any.
    pub config_file: Option<PathBuf>,
    pub environment: EnvironmentConfig,
    pub server: ServerSettings,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub json: bool,
    pub filter: Option<String>,
}

// ===== config.yaml layout =====

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: FileSection,
    production: Option<FileSection>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct FileSection {
    database_path: Option<PathBuf>,
    address: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    llm: FileLlmSection,
    #[serde(default)]
    logging: FileLoggingSection,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct FileLlmSection {
    api_url: Option<String>,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct FileLoggingSection {
    json: Option<bool>,
    filter: Option<String>,
}

impl ConfigManager {
    /// Load configuration for the current environment from `config.yaml`
    /// (optional) and process environment variables.
    pub fn load() -> Result<Self> {
        let environment_name = Self::get_environment();
        let config_path = PathBuf::from("config.yaml");

        let (section, config_file) = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config.yaml")?;
            (
                Self::section_from_yaml(&content, &environment_name)?,
                Some(config_path),
            )
        } else {
            (FileSection::default(), None)
        };

        let mut config = Self::from_section(environment_name, section);
        config.config_file = config_file;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.environment.database_path = Self::resolve_path(&config.environment.database_path)?;

        Ok(config)
    }

    /// One-line description for the startup log. Loading runs before the
    /// subscriber exists, so the caller logs this once tracing is set up.
    pub fn summary(&self) -> String {
        let source = match &self.config_file {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        };
        format!(
            "Loaded configuration for environment: {} (from {}, LLM key {})",
            self.environment_name,
            source,
            if self.llm.api_key.is_some() { "set" } else { "missing" }
        )
    }

    /// Built-in defaults, no file and no environment.
    pub fn defaults() -> Self {
        Self::from_section("local".to_string(), FileSection::default())
    }

    fn get_environment() -> String {
        std::env::var("PROFILE_INSIGHTS_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn section_from_yaml(content: &str, environment: &str) -> Result<FileSection> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment {
            "production" => file
                .production
                .context("config.yaml has no 'production' section")?,
            _ => file.local,
        })
    }

    fn from_section(environment_name: String, section: FileSection) -> Self {
        Self {
            environment_name,
            config_file: None,
            environment: EnvironmentConfig {
                database_path: section
                    .database_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            },
            server: ServerSettings {
                address: section
                    .address
                    .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
                port: section.port.unwrap_or(DEFAULT_PORT),
            },
            llm: LlmConfig {
                api_url: section
                    .llm
                    .api_url
                    .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
                api_key: section.llm.api_key.filter(|k| !k.trim().is_empty()),
                temperature: section.llm.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                max_output_tokens: section
                    .llm
                    .max_output_tokens
                    .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
                timeout_seconds: section.llm.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            logging: LoggingConfig {
                json: section.logging.json.unwrap_or(false),
                filter: section.logging.filter,
            },
        }
    }

    /// Environment variables win over config.yaml.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DATABASE_PATH") {
            self.environment.database_path = PathBuf::from(path);
        }
        if let Some(address) = lookup("ROCKET_ADDRESS") {
            self.server.address = address;
        }
        if let Some(port) = lookup("ROCKET_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;
        }
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup("GEMINI_API_URL") {
            self.llm.api_url = url;
        }
        if let Some(temperature) = lookup("GEMINI_TEMPERATURE") {
            self.llm.temperature = temperature
                .parse()
                .context("GEMINI_TEMPERATURE must be a number")?;
        }
        if let Some(tokens) = lookup("GEMINI_MAX_OUTPUT_TOKENS") {
            self.llm.max_output_tokens = tokens
                .parse()
                .context("GEMINI_MAX_OUTPUT_TOKENS must be a positive integer")?;
        }
        if let Some(timeout) = lookup("GEMINI_TIMEOUT_SECONDS") {
            self.llm.timeout_seconds = timeout
                .parse()
                .context("GEMINI_TIMEOUT_SECONDS must be a positive integer")?;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    /// Ensure the database directory exists
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.environment.database_path.parent() {
            tokio::fs::create_dir_all(db_parent).await.with_context(|| {
                format!(
                    "Failed to create database directory: {}",
                    db_parent.display()
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const YAML: &str = r#"
local:
  database_path: dev.db
  port: 9000
  llm:
    temperature: 0.5
production:
  database_path: /var/lib/profile-insights/profiles.db
  llm:
    api_url: https://example.test/generate
    max_output_tokens: 4096
  logging:
    json: true
"#;

    #[test]
    fn test_defaults() {
        let config = ConfigManager::defaults();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.llm.api_url, DEFAULT_GEMINI_API_URL);
        assert_eq!(config.llm.max_output_tokens, 2048);
        assert!(config.llm.api_key.is_none());
        assert!(!config.logging.json);
    }

    #[test]
    fn test_summary_names_environment_and_source() {
        let mut config = ConfigManager::defaults();
        assert_eq!(
            config.summary(),
            "Loaded configuration for environment: local (from built-in defaults, LLM key missing)"
        );

        config.config_file = Some(PathBuf::from("config.yaml"));
        config.llm.api_key = Some("secret".to_string());
        let summary = config.summary();
        assert!(summary.contains("from config.yaml"));
        assert!(summary.contains("LLM key set"));
        assert!(!summary.contains("secret"));
    }

    #[test]
    fn test_yaml_sections() {
        let local = ConfigManager::from_section(
            "local".to_string(),
            ConfigManager::section_from_yaml(YAML, "local").unwrap(),
        );
        assert_eq!(local.environment.database_path, PathBuf::from("dev.db"));
        assert_eq!(local.server.port, 9000);
        assert!((local.llm.temperature - 0.5).abs() < f32::EPSILON);

        let production = ConfigManager::from_section(
            "production".to_string(),
            ConfigManager::section_from_yaml(YAML, "production").unwrap(),
        );
        assert_eq!(production.llm.api_url, "https://example.test/generate");
        assert_eq!(production.llm.max_output_tokens, 4096);
        assert!(production.logging.json);
        assert_eq!(production.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_missing_production_section() {
        let err = ConfigManager::section_from_yaml("local: {}\n", "production").unwrap_err();
        assert!(err.to_string().contains("production"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "secret"),
            ("ROCKET_PORT", "8123"),
            ("GEMINI_MAX_OUTPUT_TOKENS", "1024"),
            ("LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = ConfigManager::defaults();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.llm.max_output_tokens, 1024);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = ConfigManager::defaults();
        let err = config
            .apply_overrides(|key| (key == "ROCKET_PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("ROCKET_PORT"));
    }
}
