//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EvidenceSettings, LogFormat, LoggingConfig, ModelSettings, ServerConfig,
    WebSearchSettings,
};
