//! Logging configuration parsing from environment variables.

/// Logging environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    /// `EnvFilter` directive, e.g. `info` or `fapi_trader=debug`
    pub log_level: String,
    /// JSON log file; rotated daily, five files kept
    pub log_file: String,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: "bot.log".to_string(),
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup("LOG_LEVEL")
                .map(|level| level.to_lowercase())
                .unwrap_or(defaults.log_level),
            log_file: lookup("LOG_FILE").unwrap_or(defaults.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_lookup(|_| None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_file, "bot.log");
    }

    #[test]
    fn test_log_level_is_lowercased() {
        let config = ObservabilityEnvConfig::from_lookup(|key| {
            (key == "LOG_LEVEL").then(|| "DEBUG".to_string())
        });
        assert_eq!(config.log_level, "debug");
    }
}
