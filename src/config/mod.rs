//! Configuration management for dist-archive
//!
//! Git-like user configuration stored in ~/.dist-archive/config.toml

pub mod dist_config;

// Re-export commonly used items
pub use dist_config::{ConfigKey, ConfigValue, DistConfig};
