//! Stream abstractions seen by stream interceptors.

use async_trait::async_trait;
use tonic::Status;

use crate::context::CallContext;
use crate::shape::AnyMessage;

/// Server side of an open stream.
#[async_trait]
pub trait ServerStream: Send {
    /// Context of the call this stream belongs to.
    fn context(&self) -> &CallContext;

    async fn send_message(&mut self, message: AnyMessage) -> Result<(), Status>;

    /// `Ok(None)` once the peer has finished sending.
    async fn recv_message(&mut self) -> Result<Option<AnyMessage>, Status>;
}

pub type BoxServerStream = Box<dyn ServerStream>;

#[async_trait]
impl<T: ServerStream + ?Sized> ServerStream for Box<T> {
    fn context(&self) -> &CallContext {
        (**self).context()
    }

    async fn send_message(&mut self, message: AnyMessage) -> Result<(), Status> {
        (**self).send_message(message).await
    }

    async fn recv_message(&mut self) -> Result<Option<AnyMessage>, Status> {
        (**self).recv_message().await
    }
}

/// Server stream whose context has been replaced by an interceptor.
///
/// Messages pass through to the inner stream unchanged.
pub struct WrappedServerStream<S> {
    inner: S,
    ctx: CallContext,
}

impl<S: ServerStream> WrappedServerStream<S> {
    #[must_use]
    pub fn new(inner: S, ctx: CallContext) -> Self {
        Self { inner, ctx }
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: ServerStream> ServerStream for WrappedServerStream<S> {
    fn context(&self) -> &CallContext {
        &self.ctx
    }

    async fn send_message(&mut self, message: AnyMessage) -> Result<(), Status> {
        self.inner.send_message(message).await
    }

    async fn recv_message(&mut self) -> Result<Option<AnyMessage>, Status> {
        self.inner.recv_message().await
    }
}

/// Client side of an open stream.
#[async_trait]
pub trait ClientStream: Send {
    fn context(&self) -> &CallContext;

    async fn send_message(&mut self, message: AnyMessage) -> Result<(), Status>;

    async fn recv_message(&mut self) -> Result<Option<AnyMessage>, Status>;

    /// Half-close: no further messages will be sent.
    async fn close_send(&mut self) -> Result<(), Status>;
}

pub type BoxClientStream = Box<dyn ClientStream>;

#[async_trait]
impl<T: ClientStream + ?Sized> ClientStream for Box<T> {
    fn context(&self) -> &CallContext {
        (**self).context()
    }

    async fn send_message(&mut self, message: AnyMessage) -> Result<(), Status> {
        (**self).send_message(message).await
    }

    async fn recv_message(&mut self) -> Result<Option<AnyMessage>, Status> {
        (**self).recv_message().await
    }

    async fn close_send(&mut self) -> Result<(), Status> {
        (**self).close_send().await
    }
}
