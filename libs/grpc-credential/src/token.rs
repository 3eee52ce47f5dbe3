use async_trait::async_trait;

use crate::config::CredentialConfig;
use crate::error::CredentialError;
use crate::keys::{TOKEN, TOKEN_CREDENTIAL_TYPE, TYPE_KEY};
use crate::provider::{CredentialMetadata, CredentialProvider, MetadataSource, ParseCredential};
use crate::secret::SecretString;

/// Opaque bearer-style token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCredential {
    token: SecretString,
    require_transport_security: bool,
}

impl TokenCredential {
    #[must_use]
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self {
            token: token.into(),
            require_transport_security: CredentialConfig::default().require_transport_security,
        }
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

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub fn to_metadata(&self) -> CredentialMetadata {
        CredentialMetadata::from([
            (TOKEN.to_owned(), self.token.expose().to_owned()),
            (TYPE_KEY.to_owned(), TOKEN_CREDENTIAL_TYPE.to_owned()),
        ])
    }
}

#[async_trait]
impl CredentialProvider for TokenCredential {
    async fn request_metadata(&self, _uri: &str) -> Result<CredentialMetadata, CredentialError> {
        Ok(self.to_metadata())
    }

    fn require_transport_security(&self) -> bool {
        self.require_transport_security
    }
}

impl ParseCredential for TokenCredential {
    fn parse<M: MetadataSource + ?Sized>(metadata: &M) -> Option<Self> {
        metadata.get_str(TOKEN).map(Self::new)
    }
}
