use crate::config::types::{Config, DATABASE_ENV_VAR};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is stored with each run record so runs made with different
/// target lists or tuning constants can be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads a configuration and returns both the config and the hash of the
/// exact bytes that were parsed
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

/// Resolves the progress store location
///
/// A non-empty `env_override` (the value of `NOVEL_INGEST_DATABASE`) wins over
/// `[store] database-path`. Having neither is a fatal startup condition.
pub fn resolve_database_path(
    config: &Config,
    env_override: Option<String>,
) -> Result<String, ConfigError> {
    env_override
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            config
                .store
                .database_path
                .clone()
                .filter(|value| !value.trim().is_empty())
        })
        .ok_or_else(|| {
            ConfigError::MissingValue(format!(
                "store database path (set [store] database-path or {})",
                DATABASE_ENV_VAR
            ))
        })
}
