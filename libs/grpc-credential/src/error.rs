use thiserror::Error;
use tonic::Status;

use crate::keys::CredentialType;

/// Failure while producing or attaching credential metadata.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid metadata key: {0}")]
    InvalidMetadataKey(String),

    #[error("invalid metadata value for key {key}")]
    InvalidMetadataValue { key: String },

    #[error("credential requires transport security but the connection is insecure")]
    InsecureTransport,

    #[error("credential provider failed: {0}")]
    Provider(String),
}

impl From<CredentialError> for Status {
    fn from(err: CredentialError) -> Self {
        Status::unauthenticated(format!("per-RPC credentials failed: {err}"))
    }
}

/// Failure while reconstructing a credential from received metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("metadata carries no credential_type")]
    MissingType,

    #[error("unknown credential type: {0}")]
    UnknownType(String),

    #[error("missing credential metadata keys: {0:?}")]
    MissingKeys(Vec<&'static str>),

    #[error("{0} cannot be reconstructed from metadata")]
    Unsupported(CredentialType),
}

impl From<ParseError> for Status {
    fn from(err: ParseError) -> Self {
        Status::unauthenticated(err.to_string())
    }
}
