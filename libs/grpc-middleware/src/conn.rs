//! Client connection handle, stream descriptors and per-call options.

use std::fmt;
use std::sync::Arc;

use grpc_credential::CredentialProviderRef;

/// Connection a client call is issued on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConn {
    target: Arc<str>,
    transport_security: bool,
}

impl ClientConn {
    /// Transport security is inferred from an `https://` target.
    #[must_use]
    pub fn new(target: impl Into<Arc<str>>) -> Self {
        let target = target.into();
        let transport_security = target.starts_with("https://");
        Self {
            target,
            transport_security,
        }
    }

    #[must_use]
    pub fn with_transport_security(mut self, secure: bool) -> Self {
        self.transport_security = secure;
        self
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.transport_security
    }
}

impl fmt::Display for ClientConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target)
    }
}

/// Static description of a streaming method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDesc {
    pub stream_name: String,
    pub client_streams: bool,
    pub server_streams: bool,
}

impl StreamDesc {
    #[must_use]
    pub fn new(stream_name: impl Into<String>, client_streams: bool, server_streams: bool) -> Self {
        Self {
            stream_name: stream_name.into(),
            client_streams,
            server_streams,
        }
    }
}

/// Per-call option a client interceptor may add or inspect.
#[derive(Debug, Clone)]
pub enum CallOption {
    WaitForReady(bool),
    MaxRecvMessageSize(usize),
    MaxSendMessageSize(usize),
    /// Credentials attached to this call only.
    PerRpcCredentials(CredentialProviderRef),
}
