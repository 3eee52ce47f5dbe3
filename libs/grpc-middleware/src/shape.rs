//! The four call shapes an interceptor chain can be built for.
//!
//! A shape fixes the argument bundle handed down the chain, the descriptive
//! info shared by every link, and the outcome returned back up. Message
//! parameters default to [`AnyMessage`] so that generic middleware can be
//! written once; typed services pick concrete message types instead.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use tonic::Status;

use crate::conn::{CallOption, ClientConn, StreamDesc};
use crate::context::CallContext;
use crate::stream::{BoxClientStream, BoxServerStream};

/// Type-erased request or response message.
///
/// Shared so that a call can be re-issued, e.g. by a retrying client
/// interceptor. Handlers read it with [`Arc::downcast`] or `downcast_ref`.
pub type AnyMessage = Arc<dyn Any + Send + Sync>;

/// Type-erased service implementation handed to stream handlers.
pub type ServiceRef = Arc<dyn Any + Send + Sync>;

/// Argument, info and outcome types of one call shape.
pub trait CallShape: Send + Sync + 'static {
    /// Values an interceptor may replace before calling `next`.
    type Args: Send + 'static;
    /// Immutable call description shared by every link.
    type Info: Send + Sync + 'static;
    /// Result flowing back up the chain.
    type Output: Send + 'static;
}

/// Server receiving a single request and producing a single response.
pub struct UnaryServer<Req = AnyMessage, Resp = AnyMessage>(PhantomData<fn(Req) -> Resp>);

/// Server handling a bidirectional message stream.
pub struct StreamServer<St = BoxServerStream>(PhantomData<fn(St)>);

/// Client issuing a single request and awaiting a single reply.
pub struct UnaryClient<Req = AnyMessage, Reply = AnyMessage>(PhantomData<fn(Req) -> Reply>);

/// Client opening a stream.
pub struct StreamClient<Cs = BoxClientStream>(PhantomData<fn() -> Cs>);

#[derive(Debug)]
pub struct UnaryServerCall<Req = AnyMessage> {
    pub ctx: CallContext,
    pub request: Req,
}

impl<Req> UnaryServerCall<Req> {
    #[must_use]
    pub fn new(ctx: CallContext, request: Req) -> Self {
        Self { ctx, request }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryServerInfo {
    /// `/package.Service/Method`
    pub full_method: String,
}

impl UnaryServerInfo {
    #[must_use]
    pub fn new(full_method: impl Into<String>) -> Self {
        Self {
            full_method: full_method.into(),
        }
    }
}

pub struct StreamServerCall<St = BoxServerStream> {
    pub service: ServiceRef,
    pub stream: St,
}

impl<St> StreamServerCall<St> {
    #[must_use]
    pub fn new(service: ServiceRef, stream: St) -> Self {
        Self { service, stream }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamServerInfo {
    pub full_method: String,
    pub is_client_stream: bool,
    pub is_server_stream: bool,
}

impl StreamServerInfo {
    #[must_use]
    pub fn new(full_method: impl Into<String>) -> Self {
        Self {
            full_method: full_method.into(),
            is_client_stream: true,
            is_server_stream: true,
        }
    }

    #[must_use]
    pub fn with_streaming(mut self, client: bool, server: bool) -> Self {
        self.is_client_stream = client;
        self.is_server_stream = server;
        self
    }
}

/// Client unary invocation. The reply travels back as the call outcome.
#[derive(Debug, Clone)]
pub struct UnaryClientCall<Req = AnyMessage> {
    pub ctx: CallContext,
    pub method: String,
    pub request: Req,
    pub conn: ClientConn,
    pub options: Vec<CallOption>,
}

impl<Req> UnaryClientCall<Req> {
    #[must_use]
    pub fn new(
        ctx: CallContext,
        conn: ClientConn,
        method: impl Into<String>,
        request: Req,
    ) -> Self {
        Self {
            ctx,
            method: method.into(),
            request,
            conn,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, option: CallOption) -> Self {
        self.options.push(option);
        self
    }
}

#[derive(Debug, Clone)]
pub struct StreamClientCall {
    pub ctx: CallContext,
    pub desc: StreamDesc,
    pub conn: ClientConn,
    pub method: String,
    pub options: Vec<CallOption>,
}

impl StreamClientCall {
    #[must_use]
    pub fn new(
        ctx: CallContext,
        desc: StreamDesc,
        conn: ClientConn,
        method: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            desc,
            conn,
            method: method.into(),
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, option: CallOption) -> Self {
        self.options.push(option);
        self
    }
}

impl<Req, Resp> CallShape for UnaryServer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    type Args = UnaryServerCall<Req>;
    type Info = UnaryServerInfo;
    type Output = Result<Resp, Status>;
}

impl<St> CallShape for StreamServer<St>
where
    St: Send + 'static,
{
    type Args = StreamServerCall<St>;
    type Info = StreamServerInfo;
    type Output = Result<(), Status>;
}

impl<Req, Reply> CallShape for UnaryClient<Req, Reply>
where
    Req: Send + 'static,
    Reply: Send + 'static,
{
    type Args = UnaryClientCall<Req>;
    type Info = ();
    type Output = Result<Reply, Status>;
}

impl<Cs> CallShape for StreamClient<Cs>
where
    Cs: Send + 'static,
{
    type Args = StreamClientCall;
    type Info = ();
    type Output = Result<Cs, Status>;
}
