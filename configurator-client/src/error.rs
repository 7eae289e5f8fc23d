use thiserror::Error;

pub type ConfiguratorResult<T> = Result<T, ConfiguratorError>;

#[derive(Error, Debug)]
pub enum ConfiguratorError {
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to encode share token: {0}")]
    Encode(String),

    #[error("Failed to decode share token: {0}")]
    Decode(String),

    #[error("Canonicalization failed: {0}")]
    Canonicalize(String),

    #[error("Storage error for key '{key}': {reason}")]
    Storage { key: String, reason: String },

    #[error("No element with class '{class}' in the preview document")]
    ElementNotFound { class: String },

    #[error("Block loader failed for '{block}': {reason}")]
    Loader { block: String, reason: String },

    #[error("Configurator block is missing its first row (block name)")]
    MissingBlockName,

    #[error("Configurator block is missing a JSON schema link in its second row")]
    MissingSchemaLink,

    #[error("Tool {0} is not mounted")]
    ToolNotFound(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration value for {key}: {reason}")]
    Config { key: String, reason: String },
}
