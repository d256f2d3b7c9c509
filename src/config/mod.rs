// Configuration management module
// Handles the TOML settings file and environment secret overrides

pub mod settings;

pub use settings::{
    CompletionConfig, Config, ConfigError, EmbeddingConfig, IndexConfig, ServerConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("docsearch"))
        .ok_or(ConfigError::DirectoryError)
}
