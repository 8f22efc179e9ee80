use std::env;

use crate::error::ResolverError;
use crate::traits::KeyResolver;

/// Resolves credentials from environment variables
pub struct EnvResolver;

impl EnvResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyResolver for EnvResolver {
    /// Parses "env:VAR" and returns the variable's value
    fn resolve(&self, source: &str) -> Result<String, ResolverError> {
        let prefix = "env:";
        let var = source
            .strip_prefix(prefix)
            .ok_or_else(|| {
                ResolverError::UnsupportedSource(format!(
                    "expected 'env:' prefix, got: {}",
                    source
                ))
            })?
            .trim();

        if var.is_empty() {
            return Err(ResolverError::UnsupportedSource(
                "empty env source".to_string(),
            ));
        }

        env::var(var).map_err(|_| ResolverError::MissingKey(var.to_string()))
    }
}
