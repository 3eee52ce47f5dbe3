//! Closed set of credential variants and discriminator-driven parsing.

use async_trait::async_trait;

use crate::api::ApiCredential;
use crate::custom::CustomCredential;
use crate::error::{CredentialError, ParseError};
use crate::keys::CredentialType;
use crate::login::LoginCredential;
use crate::provider::{
    parse_type, CredentialMetadata, CredentialProvider, MetadataSource, ParseCredential,
};
use crate::token::TokenCredential;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Api(ApiCredential),
    Login(LoginCredential),
    Token(TokenCredential),
    Custom(CustomCredential),
}

impl Credential {
    #[must_use]
    pub fn credential_type(&self) -> CredentialType {
        match self {
            Self::Api(_) => CredentialType::Api,
            Self::Login(_) => CredentialType::Login,
            Self::Token(_) => CredentialType::Token,
            Self::Custom(_) => CredentialType::Custom,
        }
    }

    /// Reconstruct a credential from received metadata using the
    /// `credential_type` discriminator.
    ///
    /// # Errors
    /// - [`ParseError::MissingType`] when the discriminator is absent
    /// - [`ParseError::UnknownType`] when it names no known variant
    /// - [`ParseError::MissingKeys`] when a required key of the variant is absent
    /// - [`ParseError::Unsupported`] for custom credentials
    pub fn from_metadata<M: MetadataSource + ?Sized>(metadata: &M) -> Result<Self, ParseError> {
        let Some(raw) = parse_type(metadata) else {
            tracing::debug!("credential metadata has no type discriminator");
            return Err(ParseError::MissingType);
        };
        let kind = raw.parse::<CredentialType>().inspect_err(|_| {
            tracing::debug!(credential_type = %raw, "unknown credential type");
        })?;

        match kind {
            CredentialType::Api => parse_as(metadata, kind).map(Self::Api),
            CredentialType::Login => parse_as(metadata, kind).map(Self::Login),
            CredentialType::Token => parse_as(metadata, kind).map(Self::Token),
            CredentialType::Custom => Err(ParseError::Unsupported(kind)),
        }
    }
}

fn parse_as<T, M>(metadata: &M, kind: CredentialType) -> Result<T, ParseError>
where
    T: ParseCredential,
    M: MetadataSource + ?Sized,
{
    T::parse(metadata).ok_or_else(|| {
        let missing: Vec<&'static str> = kind
            .required_keys()
            .iter()
            .copied()
            .filter(|key| metadata.get_str(key).is_none())
            .collect();
        tracing::debug!(credential_type = %kind, ?missing, "credential metadata incomplete");
        ParseError::MissingKeys(missing)
    })
}

#[async_trait]
impl CredentialProvider for Credential {
    async fn request_metadata(&self, uri: &str) -> Result<CredentialMetadata, CredentialError> {
        match self {
            Self::Api(c) => c.request_metadata(uri).await,
            Self::Login(c) => c.request_metadata(uri).await,
            Self::Token(c) => c.request_metadata(uri).await,
            Self::Custom(c) => c.request_metadata(uri).await,
        }
    }

    fn require_transport_security(&self) -> bool {
        match self {
            Self::Api(c) => c.require_transport_security(),
            Self::Login(c) => c.require_transport_security(),
            Self::Token(c) => c.require_transport_security(),
            Self::Custom(c) => c.require_transport_security(),
        }
    }
}

impl From<ApiCredential> for Credential {
    fn from(c: ApiCredential) -> Self {
        Self::Api(c)
    }
}

impl From<LoginCredential> for Credential {
    fn from(c: LoginCredential) -> Self {
        Self::Login(c)
    }
}

impl From<TokenCredential> for Credential {
    fn from(c: TokenCredential) -> Self {
        Self::Token(c)
    }
}

impl From<CustomCredential> for Credential {
    fn from(c: CustomCredential) -> Self {
        Self::Custom(c)
    }
}
