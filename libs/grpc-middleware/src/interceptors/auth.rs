//! Server-side credential checks.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use grpc_credential::Credential;
use tonic::Status;

use crate::chain::{Interceptor, Next};
use crate::context::CallContext;
use crate::shape::{
    StreamServer, StreamServerCall, StreamServerInfo, UnaryServer, UnaryServerCall,
    UnaryServerInfo,
};
use crate::stream::{BoxServerStream, WrappedServerStream};

/// Decides whether a parsed credential may call a method.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// # Errors
    /// Returns the status to reject the call with.
    async fn validate(&self, credential: &Credential, full_method: &str) -> Result<(), Status>;
}

#[async_trait]
impl<F> CredentialValidator for F
where
    F: Fn(&Credential, &str) -> Result<(), Status> + Send + Sync,
{
    async fn validate(&self, credential: &Credential, full_method: &str) -> Result<(), Status> {
        self(credential, full_method)
    }
}

/// Rejects calls that carry no valid credential.
///
/// On success the parsed [`Credential`] is stored in the call context so that
/// later links and the handler can read it with
/// [`CallContext::value`]. Stream calls see it through the context of a
/// wrapped stream.
#[derive(Clone)]
pub struct AuthInterceptor {
    validator: Arc<dyn CredentialValidator>,
}

impl AuthInterceptor {
    #[must_use]
    pub fn new(validator: impl CredentialValidator + 'static) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }

    /// Accept any credential that parses.
    #[must_use]
    pub fn any_credential() -> Self {
        Self::new(|_: &Credential, _: &str| -> Result<(), Status> { Ok(()) })
    }

    async fn authenticate(
        &self,
        ctx: &CallContext,
        full_method: &str,
    ) -> Result<Credential, Status> {
        let credential = Credential::from_metadata(ctx.metadata()).inspect_err(|err| {
            tracing::warn!(
                method = full_method,
                error = %err,
                "rejecting call without valid credential"
            );
        })?;
        self.validator
            .validate(&credential, full_method)
            .await
            .inspect_err(|status| {
                tracing::warn!(
                    method = full_method,
                    credential_type = %credential.credential_type(),
                    code = ?status.code(),
                    "credential rejected"
                );
            })?;
        tracing::debug!(
            method = full_method,
            credential_type = %credential.credential_type(),
            "credential accepted"
        );
        Ok(credential)
    }
}

impl fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInterceptor").finish_non_exhaustive()
    }
}

impl<Req, Resp> Interceptor<UnaryServer<Req, Resp>> for AuthInterceptor
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        mut call: UnaryServerCall<Req>,
        info: &'a UnaryServerInfo,
        next: Next<'a, UnaryServer<Req, Resp>>,
    ) -> BoxFuture<'a, Result<Resp, Status>> {
        Box::pin(async move {
            let credential = self.authenticate(&call.ctx, &info.full_method).await?;
            call.ctx.extensions_mut().insert(credential);
            next.run(call).await
        })
    }
}

impl Interceptor<StreamServer> for AuthInterceptor {
    fn intercept<'a>(
        &'a self,
        call: StreamServerCall,
        info: &'a StreamServerInfo,
        next: Next<'a, StreamServer>,
    ) -> BoxFuture<'a, Result<(), Status>> {
        Box::pin(async move {
            let mut ctx = call.stream.context().clone();
            let credential = self.authenticate(&ctx, &info.full_method).await?;
            ctx.extensions_mut().insert(credential);
            let stream: BoxServerStream = Box::new(WrappedServerStream::new(call.stream, ctx));
            next.run(StreamServerCall::new(call.service, stream)).await
        })
    }
}
