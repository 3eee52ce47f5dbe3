//! Ready-made interceptors.

pub mod auth;
pub mod credentials;
pub mod logging;
pub mod retry;

pub use auth::{AuthInterceptor, CredentialValidator};
pub use credentials::CredentialInterceptor;
pub use logging::LoggingInterceptor;
pub use retry::{RetryConfig, RetryInterceptor};
