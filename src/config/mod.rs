//! Configuration module for Novel-Ingest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use novel_ingest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Tracking {} novels", config.novels.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, IngestConfig, NovelTarget, OutputConfig, SelectorConfig, SiteConfig, StoreConfig,
    UserAgentConfig, DATABASE_ENV_VAR,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, resolve_database_path};
