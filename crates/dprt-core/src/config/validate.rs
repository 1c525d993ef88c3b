//! Configuration validation.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl Config {
    /// Validate configuration values.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.general.property_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "general.property_file must not be empty".into(),
            ));
        }
        if self.batch.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "batch.extensions must list at least one extension".into(),
            ));
        }
        if self.batch.extensions.iter().any(|ext| ext.is_empty() || ext.starts_with('.')) {
            return Err(ConfigError::ValidationError(
                "batch.extensions entries must be non-empty and have no leading '.'".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"json\" or \"jsonl\", got \"{}\"",
                self.output.format
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.batch.extensions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch.extensions"));
    }

    #[test]
    fn test_validate_rejects_dotted_extension() {
        let mut config = Config::default();
        config.batch.extensions = vec![".fits".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_output_format() {
        let mut config = Config::default();
        config.output.format = "csv".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".into();
        assert!(config.validate().is_ok());
        config.logging.level = "loud".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_validate_rejects_empty_property_file() {
        let mut config = Config::default();
        config.general.property_file = Default::default();
        assert!(config.validate().is_err());
    }
}
