use async_trait::async_trait;

use crate::config::CredentialConfig;
use crate::error::CredentialError;
use crate::keys::{APP_KEY, APP_SECRET, API_CREDENTIAL_TYPE, TYPE_KEY};
use crate::provider::{CredentialMetadata, CredentialProvider, MetadataSource, ParseCredential};
use crate::secret::SecretString;

/// Application key/secret pair identifying a calling application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredential {
    app_key: String,
    app_secret: SecretString,
    require_transport_security: bool,
}

impl ApiCredential {
    #[must_use]
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<SecretString>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
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
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    #[must_use]
    pub fn app_secret(&self) -> &SecretString {
        &self.app_secret
    }

    #[must_use]
    pub fn to_metadata(&self) -> CredentialMetadata {
        CredentialMetadata::from([
            (APP_KEY.to_owned(), self.app_key.clone()),
            (APP_SECRET.to_owned(), self.app_secret.expose().to_owned()),
            (TYPE_KEY.to_owned(), API_CREDENTIAL_TYPE.to_owned()),
        ])
    }
}

#[async_trait]
impl CredentialProvider for ApiCredential {
    async fn request_metadata(&self, _uri: &str) -> Result<CredentialMetadata, CredentialError> {
        Ok(self.to_metadata())
    }

    fn require_transport_security(&self) -> bool {
        self.require_transport_security
    }
}

impl ParseCredential for ApiCredential {
    fn parse<M: MetadataSource + ?Sized>(metadata: &M) -> Option<Self> {
        let app_key = metadata.get_str(APP_KEY)?;
        let app_secret = metadata.get_str(APP_SECRET)?;
        Some(Self::new(app_key, app_secret))
    }
}
