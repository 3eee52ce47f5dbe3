#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Per-RPC request credentials.
//!
//! A credential emits a metadata mapping that is attached to outgoing calls
//! and, for the fixed-schema variants, can be reconstructed on the receiving
//! side from the same metadata.

pub mod api;
pub mod config;
pub mod credential;
pub mod custom;
pub mod error;
pub mod keys;
pub mod login;
pub mod provider;
pub mod secret;
pub mod token;

pub use api::ApiCredential;
pub use config::{ConfigError, CredentialConfig};
pub use credential::Credential;
pub use custom::CustomCredential;
pub use error::{CredentialError, ParseError};
pub use keys::CredentialType;
pub use login::LoginCredential;
pub use provider::{
    apply_metadata, parse_type, CredentialMetadata, CredentialProvider, CredentialProviderRef,
    MetadataSource, ParseCredential,
};
pub use secret::SecretString;
pub use token::TokenCredential;
