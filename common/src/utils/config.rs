use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Local,
    Memory,
    Gcs,
}

fn default_storage_kind() -> StorageKind {
    StorageKind::Local
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_query_model")]
    pub query_model: String,
    #[serde(default = "default_storage_kind")]
    pub storage: StorageKind,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub gcs_bucket: Option<String>,
    #[serde(default)]
    pub gcs_credentials_base64: Option<String>,
    #[serde(default)]
    pub corpus_prefix: Option<String>,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_chunk_parts")]
    pub chunk_parts: usize,
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: usize,
    #[serde(default = "default_retry_base_units")]
    pub retry_base_units: u64,
    #[serde(default = "default_retry_unit_ms")]
    pub retry_unit_ms: u64,
    #[serde(default)]
    pub retry_synthesis: bool,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: default_base_url(),
            query_model: default_query_model(),
            storage: default_storage_kind(),
            data_dir: default_data_dir(),
            gcs_bucket: None,
            gcs_credentials_base64: None,
            corpus_prefix: None,
            http_port: default_http_port(),
            chunk_parts: default_chunk_parts(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_units: default_retry_base_units(),
            retry_unit_ms: default_retry_unit_ms(),
            retry_synthesis: false,
            request_timeout_secs: None,
        }
    }
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_query_model() -> String {
    "gpt-4o-mini-2024-07-18".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_chunk_parts() -> usize {
    8
}

fn default_retry_max_attempts() -> usize {
    5
}

fn default_retry_base_units() -> u64 {
    2
}

fn default_retry_unit_ms() -> u64 {
    1000
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
