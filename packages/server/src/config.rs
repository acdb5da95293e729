use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec![],
            max_age: 3600,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Log every SQL statement through `tracing`. Default: false.
    #[serde(default)]
    pub sqlx_logging: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploaded images are written to. Default: "./uploads".
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Largest accepted upload in bytes. Default: 10 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}
fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// Vision/LLM backend speaking the OpenAI chat-completions protocol.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// When false every analysis short-circuits to "unavailable". Default: true.
    #[serde(default = "default_llm_enabled")]
    pub enabled: bool,
    /// Base URL; `/chat/completions` is appended. Default: "http://localhost:1234/v1".
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Sent as a bearer token. Default: "not-needed" (local servers ignore it).
    #[serde(default = "default_llm_api_key")]
    pub api_key: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    /// Per-call timeout for image analysis. Default: 60.
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,
    /// Per-call timeout for text-only prompts. Default: 30.
    #[serde(default = "default_text_timeout_secs")]
    pub text_timeout_secs: u64,
}

fn default_llm_enabled() -> bool {
    true
}
fn default_llm_api_url() -> String {
    "http://localhost:1234/v1".into()
}
fn default_llm_model() -> String {
    "llava".into()
}
fn default_llm_api_key() -> String {
    "not-needed".into()
}
fn default_llm_temperature() -> f32 {
    0.7
}
fn default_llm_max_tokens() -> u32 {
    500
}
fn default_image_timeout_secs() -> u64 {
    60
}
fn default_text_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_llm_enabled(),
            api_url: default_llm_api_url(),
            model: default_llm_model(),
            api_key: default_llm_api_key(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            image_timeout_secs: default_image_timeout_secs(),
            text_timeout_secs: default_text_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Default: 50.
    #[serde(default = "default_text_limit")]
    pub default_text_limit: u64,
    /// Default: 100.
    #[serde(default = "default_max_text_limit")]
    pub max_text_limit: u64,
    /// Default: 10.
    #[serde(default = "default_image_limit")]
    pub default_image_limit: usize,
    /// Default: 50.
    #[serde(default = "default_max_image_limit")]
    pub max_image_limit: usize,
    /// Default: 0.5.
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,
}

fn default_text_limit() -> u64 {
    50
}
fn default_max_text_limit() -> u64 {
    100
}
fn default_image_limit() -> usize {
    10
}
fn default_max_image_limit() -> usize {
    50
}
fn default_threshold() -> f32 {
    0.5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_text_limit: default_text_limit(),
            max_text_limit: default_max_text_limit(),
            default_image_limit: default_image_limit(),
            max_image_limit: default_max_image_limit(),
            default_threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("INVENTORY_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        Self::builder()?
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., INVENTORY__LLM__API_KEY)
            .add_source(Environment::with_prefix("INVENTORY").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("database.url", "sqlite://inventory.db?mode=rwc")?
            .set_default("storage.upload_dir", "./uploads")
    }
}
