//! FMP configuration
//!
//! Loads FMP credentials from environment variables.

use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// FMP connector configuration
#[derive(Debug, Clone)]
pub struct FmpConfig {
    pub api_key: String,
}

impl FmpConfig {
    /// Load configuration from environment variables
    ///
    /// Required:
    /// - `FMP_API_KEY`: API key for the FMP websocket feed
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("FMP_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("FMP_API_KEY".to_string()))?;

        Ok(Self { api_key })
    }

    /// Create configuration with explicit values (for testing)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = FmpConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
    }

    // Single test so parallel test threads never race on FMP_API_KEY.
    #[test]
    fn test_config_from_env() {
        env::remove_var("FMP_API_KEY");
        match FmpConfig::from_env() {
            Err(ConfigError::MissingEnvVar(var)) => assert_eq!(var, "FMP_API_KEY"),
            _ => panic!("Expected MissingEnvVar error"),
        }

        env::set_var("FMP_API_KEY", "my-api-key");
        let config = FmpConfig::from_env().unwrap();
        assert_eq!(config.api_key, "my-api-key");

        env::remove_var("FMP_API_KEY");
    }
}
