use async_trait::async_trait;

use crate::config::CredentialConfig;
use crate::error::CredentialError;
use crate::keys::{LOGIN_CREDENTIAL_TYPE, PASSWORD, TYPE_KEY, USERNAME};
use crate::provider::{CredentialMetadata, CredentialProvider, MetadataSource, ParseCredential};
use crate::secret::SecretString;

/// Username/password pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredential {
    username: String,
    password: SecretString,
    require_transport_security: bool,
}

impl LoginCredential {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
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
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }

    #[must_use]
    pub fn to_metadata(&self) -> CredentialMetadata {
        CredentialMetadata::from([
            (USERNAME.to_owned(), self.username.clone()),
            (PASSWORD.to_owned(), self.password.expose().to_owned()),
            (TYPE_KEY.to_owned(), LOGIN_CREDENTIAL_TYPE.to_owned()),
        ])
    }
}

#[async_trait]
impl CredentialProvider for LoginCredential {
    async fn request_metadata(&self, _uri: &str) -> Result<CredentialMetadata, CredentialError> {
        Ok(self.to_metadata())
    }

    fn require_transport_security(&self) -> bool {
        self.require_transport_security
    }
}

impl ParseCredential for LoginCredential {
    fn parse<M: MetadataSource + ?Sized>(metadata: &M) -> Option<Self> {
        let username = metadata.get_str(USERNAME)?;
        let password = metadata.get_str(PASSWORD)?;
        Some(Self::new(username, password))
    }
}
