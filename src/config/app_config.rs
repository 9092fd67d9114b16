use serde::Deserialize;

use crate::domain::workflow::WorkflowConfig;

/// Application configuration
///
/// Loaded once at process start from `config/default.toml`,
/// `config/local.toml`, and `APP__`-prefixed environment variables, then
/// passed by reference into constructors. Workflow logic never reads
/// configuration ambiently.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub models: ModelSettings,
    #[serde(default)]
    pub websearch: WebSearchSettings,
    #[serde(default)]
    pub evidence: EvidenceSettings,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Model roles consumed by the workflow's graders and generator
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// OpenAI-compatible endpoint; the official API when unset
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_grading_model")]
    pub grading_model: String,
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    #[serde(default = "default_validation_model")]
    pub validation_model: String,
    #[serde(default)]
    pub temperature: f32,
}

fn default_grading_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_generation_model() -> String {
    "gpt-4o".to_string()
}

fn default_validation_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            grading_model: default_grading_model(),
            generation_model: default_generation_model(),
            validation_model: default_validation_model(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    3
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceSettings {
    #[serde(default = "default_collection")]
    pub default_collection: String,
}

fn default_collection() -> String {
    "default".to_string()
}

impl Default for EvidenceSettings {
    fn default() -> Self {
        Self {
            default_collection: default_collection(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
