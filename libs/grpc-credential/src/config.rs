use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// Defaults applied to credentials built by this process.
///
/// ```yaml
/// credentials:
///   require_transport_security: true
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialConfig {
    /// Refuse to send credentials over plaintext connections.
    pub require_transport_security: bool,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            require_transport_security: true,
        }
    }
}

impl CredentialConfig {
    /// Configuration section this struct is read from.
    pub const SECTION: &'static str = "credentials";

    /// Extract the `credentials` section, falling back to defaults when the
    /// section is absent.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the section exists but does not match the
    /// expected shape.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        if !figment.contains(Self::SECTION) {
            return Ok(Self::default());
        }
        Ok(figment.extract_inner(Self::SECTION)?)
    }
}
