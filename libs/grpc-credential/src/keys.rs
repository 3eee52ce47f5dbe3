//! Metadata keys and credential type discriminators.
//!
//! These names travel on the wire as gRPC header names and values, so they
//! must stay byte-for-byte stable.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

pub const APP_KEY: &str = "app_key";
pub const APP_SECRET: &str = "app_secret";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const TOKEN: &str = "token";

/// Discriminator key naming the credential variant carried by a call.
pub const TYPE_KEY: &str = "credential_type";

pub const API_CREDENTIAL_TYPE: &str = "APICredential";
pub const LOGIN_CREDENTIAL_TYPE: &str = "LoginCredential";
pub const TOKEN_CREDENTIAL_TYPE: &str = "TokenCredential";
pub const CUSTOM_CREDENTIAL_TYPE: &str = "CustomCredential";

/// Keys whose values are secrets and must be marked sensitive in metadata.
pub(crate) const SECRET_KEYS: [&str; 3] = [APP_SECRET, PASSWORD, TOKEN];

/// Closed set of credential variants understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialType {
    Api,
    Login,
    Token,
    Custom,
}

impl CredentialType {
    /// Wire literal stored under [`TYPE_KEY`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => API_CREDENTIAL_TYPE,
            Self::Login => LOGIN_CREDENTIAL_TYPE,
            Self::Token => TOKEN_CREDENTIAL_TYPE,
            Self::Custom => CUSTOM_CREDENTIAL_TYPE,
        }
    }

    /// Metadata keys that must all be present to reconstruct this variant.
    ///
    /// Custom credentials have no fixed schema and are never reconstructed.
    #[must_use]
    pub const fn required_keys(self) -> &'static [&'static str] {
        match self {
            Self::Api => &[APP_KEY, APP_SECRET],
            Self::Login => &[USERNAME, PASSWORD],
            Self::Token => &[TOKEN],
            Self::Custom => &[],
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            API_CREDENTIAL_TYPE => Ok(Self::Api),
            LOGIN_CREDENTIAL_TYPE => Ok(Self::Login),
            TOKEN_CREDENTIAL_TYPE => Ok(Self::Token),
            CUSTOM_CREDENTIAL_TYPE => Ok(Self::Custom),
            other => Err(ParseError::UnknownType(other.to_owned())),
        }
    }
}
