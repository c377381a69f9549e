use std::time::Duration;

use crate::config::types::Config;
use crate::error::{ConfigError, Result};

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.reporter.interval == Duration::ZERO {
            return Err(ConfigError::InvalidDuration {
                field: "reporter.interval".to_string(),
                duration: self.reporter.interval,
            }
            .into());
        }

        if self.reporter.separator.is_empty() {
            return Err(ConfigError::MissingField {
                field: "reporter.separator".to_string(),
            }
            .into());
        }

        if self.reporter.scope.iter().any(|segment| segment.trim().is_empty()) {
            return Err(ConfigError::MissingField {
                field: "reporter.scope".to_string(),
            }
            .into());
        }

        if self.recorder.separator.is_whitespace() {
            return Err(ConfigError::MissingField {
                field: "recorder.separator".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.reporter.interval, Duration::from_secs(5));
        assert_eq!(config.reporter.separator, "/");
        assert_eq!(config.recorder.separator, '.');
    }

    #[test]
    fn test_parses_humantime_durations() {
        let config = Config::from_toml_str(
            r#"
            [reporter]
            interval = "250ms"
            scope = ["node", "pipelines"]

            [recorder]
            separator = ":"
            "#,
        )
        .unwrap();

        assert_eq!(config.reporter.interval, Duration::from_millis(250));
        assert_eq!(config.reporter.scope, vec!["node", "pipelines"]);
        assert_eq!(config.reporter.separator, "/");
        assert_eq!(config.recorder.separator, ':');
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = Config::from_toml_str("[reporter]\ninterval = \"0s\"\n").unwrap_err();

        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidDuration { ref field, .. })
                if field == "reporter.interval"
        ));
    }

    #[test]
    fn test_rejects_empty_separator_and_scope_segment() {
        let mut config = Config::default();
        config.reporter.separator.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.reporter.scope = vec!["node".to_string(), " ".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.recorder.separator = ' ';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Config::from_toml_str("[reporter\ninterval = 5").unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from_file("/nonexistent/sluice.toml").unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::Read { .. })));
    }
}
