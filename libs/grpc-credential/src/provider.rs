//! Credential provider contract and metadata helpers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue, MetadataMap};

use crate::error::CredentialError;
use crate::keys::{SECRET_KEYS, TYPE_KEY};

/// Key/value mapping emitted by a credential for one call.
pub type CredentialMetadata = BTreeMap<String, String>;

/// Shared, type-erased credential provider.
pub type CredentialProviderRef = Arc<dyn CredentialProvider>;

/// Attaches authentication metadata to outbound calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Produce the metadata to attach to a call targeting `uri`.
    ///
    /// # Errors
    /// Returns [`CredentialError`] when the provider cannot produce metadata.
    async fn request_metadata(&self, uri: &str) -> Result<CredentialMetadata, CredentialError>;

    /// Whether this credential may only be sent over a secure transport.
    fn require_transport_security(&self) -> bool;
}

/// Reconstructs a credential on the receiving side.
pub trait ParseCredential: Sized {
    /// Returns `None` when any required key is absent. A partially
    /// populated value is never produced.
    fn parse<M: MetadataSource + ?Sized>(metadata: &M) -> Option<Self>;
}

/// Read access to string metadata, either received gRPC metadata or an
/// emitted [`CredentialMetadata`] mapping.
pub trait MetadataSource {
    /// First value stored under `key`, if present and valid ASCII.
    fn get_str(&self, key: &str) -> Option<&str>;
}

impl MetadataSource for MetadataMap {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|value| value.to_str().ok())
    }
}

impl MetadataSource for CredentialMetadata {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Read the `credential_type` discriminator.
///
/// `None` means "type unknown", which callers must keep distinct from a
/// missing required key.
#[must_use]
pub fn parse_type<M: MetadataSource + ?Sized>(metadata: &M) -> Option<String> {
    metadata.get_str(TYPE_KEY).map(str::to_owned)
}

/// Copy an emitted mapping into outgoing gRPC metadata.
///
/// Every entry is validated before anything is inserted, so on error the
/// target map is left untouched. Secret values are marked sensitive.
///
/// # Errors
/// Returns [`CredentialError::InvalidMetadataKey`] or
/// [`CredentialError::InvalidMetadataValue`] when an entry is not valid ASCII
/// metadata.
pub fn apply_metadata(
    mapping: &CredentialMetadata,
    target: &mut MetadataMap,
) -> Result<(), CredentialError> {
    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = AsciiMetadataKey::from_bytes(key.as_bytes())
            .map_err(|_| CredentialError::InvalidMetadataKey(key.clone()))?;
        let mut value = value
            .parse::<AsciiMetadataValue>()
            .map_err(|_| CredentialError::InvalidMetadataValue { key: key.clone() })?;
        if SECRET_KEYS.contains(&key.as_str()) {
            value.set_sensitive(true);
        }
        entries.push((name, value));
    }

    for (name, value) in entries {
        target.insert(name, value);
    }
    Ok(())
}
