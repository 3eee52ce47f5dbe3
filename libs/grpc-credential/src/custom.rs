use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use crate::config::CredentialConfig;
use crate::error::CredentialError;
use crate::keys::{CUSTOM_CREDENTIAL_TYPE, TYPE_KEY};
use crate::provider::{CredentialMetadata, CredentialProvider};

/// Arbitrary key/value credential.
///
/// Emits its entries as-is plus the `credential_type` discriminator. A
/// caller-supplied discriminator wins over the `CustomCredential` default.
/// Custom credentials are emit-only: there is no fixed schema to parse back.
#[derive(Clone, PartialEq, Eq)]
pub struct CustomCredential {
    entries: BTreeMap<String, String>,
    require_transport_security: bool,
}

impl CustomCredential {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            require_transport_security: CredentialConfig::default().require_transport_security,
        }
    }

    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_transport_security(mut self, required: bool) -> Self {
        self.require_transport_security = required;
        self
    }

    #[must_use]
    pub fn with_config(self, config: &CredentialConfig) -> Self {
        self.with_transport_security(config.require_transport_security)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn to_metadata(&self) -> CredentialMetadata {
        let mut md = self.entries.clone();
        md.entry(TYPE_KEY.to_owned())
            .or_insert_with(|| CUSTOM_CREDENTIAL_TYPE.to_owned());
        md
    }
}

impl Default for CustomCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for CustomCredential
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |cred, (k, v)| cred.with_entry(k, v))
    }
}

// Values may be secrets of unknown shape; only keys are shown.
impl fmt::Debug for CustomCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCredential")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .field("require_transport_security", &self.require_transport_security)
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for CustomCredential {
    async fn request_metadata(&self, _uri: &str) -> Result<CredentialMetadata, CredentialError> {
        Ok(self.to_metadata())
    }

    fn require_transport_security(&self) -> bool {
        self.require_transport_security
    }
}
