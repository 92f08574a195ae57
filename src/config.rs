//! Configuration management for Signflow
//!
//! This module handles loading, parsing, and validating sign-in
//! configuration from YAML files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignFlowError};

/// Sign-in configuration.
///
/// Scope semantics match the flow itself: an absent `scopes` list means
/// "use the default profile+email set at request time"; an explicit
/// empty list means "request no scopes".
///
/// # Examples
///
/// ```
/// use signflow::SignInConfig;
///
/// let config: SignInConfig = serde_yaml::from_str(
///     "provider_client_id: client-123\nforce_refresh_code: true\n",
/// ).unwrap();
/// config.validate().unwrap();
/// assert!(config.scopes.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInConfig {
    /// Provider client identifier of the calling application.
    pub provider_client_id: String,

    /// Scopes to request; absent means the default set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,

    /// Always mint a fresh offline/refresh code instead of reusing a
    /// cached grant.
    #[serde(default)]
    pub force_refresh_code: bool,
}

impl SignInConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SignFlowError::Config`] when the file cannot be read
    /// and [`SignFlowError::Yaml`] when it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SignFlowError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: SignInConfig = serde_yaml::from_str(&contents).map_err(SignFlowError::from)?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SignFlowError::Config`] when the client id is empty or
    /// an explicit scope entry is blank.
    pub fn validate(&self) -> Result<()> {
        if self.provider_client_id.trim().is_empty() {
            return Err(SignFlowError::Config("provider_client_id must not be empty".to_string()).into());
        }
        if let Some(scopes) = &self.scopes {
            if scopes.iter().any(|scope| scope.trim().is_empty()) {
                return Err(SignFlowError::Config("scope entries must not be blank".to_string()).into());
            }
        }
        Ok(())
    }
}
