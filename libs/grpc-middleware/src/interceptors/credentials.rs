//! Client-side attachment of per-RPC credentials.

use std::sync::Arc;

use futures::future::BoxFuture;
use grpc_credential::{apply_metadata, CredentialError, CredentialProvider, CredentialProviderRef};
use tonic::Status;

use crate::chain::{Interceptor, Next};
use crate::conn::{CallOption, ClientConn};
use crate::context::CallContext;
use crate::shape::{StreamClient, StreamClientCall, UnaryClient, UnaryClientCall};

/// Attaches credential metadata to outgoing calls.
///
/// The interceptor's own provider, if any, is applied first, followed by every
/// [`CallOption::PerRpcCredentials`] on the call. Later providers overwrite
/// keys set by earlier ones.
#[derive(Debug, Clone, Default)]
pub struct CredentialInterceptor {
    provider: Option<CredentialProviderRef>,
}

impl CredentialInterceptor {
    #[must_use]
    pub fn new(provider: impl CredentialProvider + 'static) -> Self {
        Self {
            provider: Some(Arc::new(provider)),
        }
    }

    /// Only attach credentials passed as call options.
    #[must_use]
    pub fn per_call_only() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_ref(provider: CredentialProviderRef) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    fn providers<'a>(
        &'a self,
        options: &'a [CallOption],
    ) -> impl Iterator<Item = &'a CredentialProviderRef> + 'a {
        self.provider.iter().chain(options.iter().filter_map(|option| match option {
            CallOption::PerRpcCredentials(provider) => Some(provider),
            _ => None,
        }))
    }

    async fn attach(
        &self,
        ctx: &mut CallContext,
        conn: &ClientConn,
        method: &str,
        options: &[CallOption],
    ) -> Result<(), Status> {
        let uri = format!("{}{method}", conn.target().trim_end_matches('/'));
        for provider in self.providers(options) {
            if provider.require_transport_security() && !conn.is_secure() {
                tracing::warn!(
                    method,
                    target = conn.target(),
                    "refusing to send credentials over an insecure connection"
                );
                return Err(CredentialError::InsecureTransport.into());
            }
            let mapping = provider.request_metadata(&uri).await?;
            apply_metadata(&mapping, ctx.metadata_mut())?;
        }
        Ok(())
    }
}

impl<Req, Reply> Interceptor<UnaryClient<Req, Reply>> for CredentialInterceptor
where
    Req: Send + 'static,
    Reply: Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        mut call: UnaryClientCall<Req>,
        _info: &'a (),
        next: Next<'a, UnaryClient<Req, Reply>>,
    ) -> BoxFuture<'a, Result<Reply, Status>> {
        Box::pin(async move {
            self.attach(&mut call.ctx, &call.conn, &call.method, &call.options)
                .await?;
            next.run(call).await
        })
    }
}

impl<Cs> Interceptor<StreamClient<Cs>> for CredentialInterceptor
where
    Cs: Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        mut call: StreamClientCall,
        _info: &'a (),
        next: Next<'a, StreamClient<Cs>>,
    ) -> BoxFuture<'a, Result<Cs, Status>> {
        Box::pin(async move {
            self.attach(&mut call.ctx, &call.conn, &call.method, &call.options)
                .await?;
            next.run(call).await
        })
    }
}
