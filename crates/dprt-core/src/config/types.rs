//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Property file read by the reduction engine
    pub property_file: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            property_file: PathBuf::from("~/.dprt/dprt.properties"),
        }
    }
}

/// Batch discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File extensions treated as FITS frames (case-insensitive)
    pub extensions: Vec<String>,

    /// Descend into subdirectories
    pub recursive: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["fits".to_string(), "fit".to_string(), "fts".to_string()],
            recursive: false,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
