//! Folding an ordered list of interceptors into one.
//!
//! Every shape shares the same machinery: an interceptor receives the call
//! arguments, the call info and a [`Next`] continuation. Calling
//! [`Next::run`] hands control to the following interceptor or, at the end
//! of the list, to the terminal handler. Not calling it short-circuits the
//! rest of the chain; calling it more than once re-enters the rest of the
//! chain each time.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::shape::{AnyMessage, CallShape, StreamClient, StreamServer, UnaryClient, UnaryServer};
use crate::stream::{BoxClientStream, BoxServerStream};

/// Middleware for one call shape.
pub trait Interceptor<S: CallShape>: Send + Sync {
    fn intercept<'a>(
        &'a self,
        args: S::Args,
        info: &'a S::Info,
        next: Next<'a, S>,
    ) -> BoxFuture<'a, S::Output>;
}

/// The handler or invoker a chain eventually delegates to.
pub trait Terminal<S: CallShape>: Send + Sync {
    fn call<'a>(&'a self, args: S::Args) -> BoxFuture<'a, S::Output>;
}

impl<S, F, Fut> Terminal<S> for F
where
    S: CallShape,
    F: Fn(S::Args) -> Fut + Send + Sync,
    Fut: Future<Output = S::Output> + Send + 'static,
{
    fn call<'a>(&'a self, args: S::Args) -> BoxFuture<'a, S::Output> {
        Box::pin(self(args))
    }
}

pub type InterceptorRef<S> = Arc<dyn Interceptor<S>>;

pub type UnaryServerInterceptor<Req = AnyMessage, Resp = AnyMessage> =
    InterceptorRef<UnaryServer<Req, Resp>>;
pub type StreamServerInterceptor<St = BoxServerStream> = InterceptorRef<StreamServer<St>>;
pub type UnaryClientInterceptor<Req = AnyMessage, Reply = AnyMessage> =
    InterceptorRef<UnaryClient<Req, Reply>>;
pub type StreamClientInterceptor<Cs = BoxClientStream> = InterceptorRef<StreamClient<Cs>>;

/// Continuation handed to an interceptor.
///
/// `Next` is `Copy`: an interceptor may run the remainder of the chain zero,
/// one or several times. Every run starts at the same position.
pub struct Next<'a, S: CallShape> {
    rest: &'a [InterceptorRef<S>],
    info: &'a S::Info,
    terminal: &'a dyn Terminal<S>,
}

impl<S: CallShape> Clone for Next<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: CallShape> Copy for Next<'_, S> {}

impl<'a, S: CallShape> Next<'a, S> {
    /// Continuation that goes straight to `terminal`.
    #[must_use]
    pub fn new(info: &'a S::Info, terminal: &'a dyn Terminal<S>) -> Self {
        Self {
            rest: &[],
            info,
            terminal,
        }
    }

    /// Number of interceptors still ahead of the terminal.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Run the rest of the chain with `args`.
    pub fn run(self, args: S::Args) -> BoxFuture<'a, S::Output> {
        match self.rest.split_first() {
            Some((head, rest)) => head.intercept(args, self.info, Next { rest, ..self }),
            None => self.terminal.call(args),
        }
    }
}

impl<S: CallShape> Terminal<S> for Next<'_, S> {
    fn call<'b>(&'b self, args: S::Args) -> BoxFuture<'b, S::Output> {
        self.run(args)
    }
}

/// Interceptor that only delegates. Chaining zero interceptors yields this.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<S: CallShape> Interceptor<S> for PassThrough {
    fn intercept<'a>(
        &'a self,
        args: S::Args,
        _info: &'a S::Info,
        next: Next<'a, S>,
    ) -> BoxFuture<'a, S::Output> {
        next.run(args)
    }
}

struct Chain<S: CallShape> {
    interceptors: Box<[InterceptorRef<S>]>,
}

impl<S: CallShape> Interceptor<S> for Chain<S> {
    fn intercept<'a>(
        &'a self,
        args: S::Args,
        info: &'a S::Info,
        next: Next<'a, S>,
    ) -> BoxFuture<'a, S::Output> {
        Box::pin(async move {
            Next {
                rest: &self.interceptors,
                info,
                terminal: &next,
            }
            .run(args)
            .await
        })
    }
}

/// Compose `interceptors` into one, the first element outermost.
///
/// An empty list yields [`PassThrough`] and a single element is returned
/// as-is. The chain is immutable once built and may be shared between
/// concurrent calls.
#[must_use]
pub fn chain<S: CallShape>(
    interceptors: impl IntoIterator<Item = InterceptorRef<S>>,
) -> InterceptorRef<S> {
    let mut interceptors: Vec<_> = interceptors.into_iter().collect();
    if interceptors.len() > 1 {
        return Arc::new(Chain {
            interceptors: interceptors.into_boxed_slice(),
        });
    }
    interceptors
        .pop()
        .unwrap_or_else(|| Arc::new(PassThrough) as InterceptorRef<S>)
}

#[must_use]
pub fn chain_unary_server<Req, Resp>(
    interceptors: impl IntoIterator<Item = UnaryServerInterceptor<Req, Resp>>,
) -> UnaryServerInterceptor<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    chain(interceptors)
}

#[must_use]
pub fn chain_stream_server<St>(
    interceptors: impl IntoIterator<Item = StreamServerInterceptor<St>>,
) -> StreamServerInterceptor<St>
where
    St: Send + 'static,
{
    chain(interceptors)
}

#[must_use]
pub fn chain_unary_client<Req, Reply>(
    interceptors: impl IntoIterator<Item = UnaryClientInterceptor<Req, Reply>>,
) -> UnaryClientInterceptor<Req, Reply>
where
    Req: Send + 'static,
    Reply: Send + 'static,
{
    chain(interceptors)
}

#[must_use]
pub fn chain_stream_client<Cs>(
    interceptors: impl IntoIterator<Item = StreamClientInterceptor<Cs>>,
) -> StreamClientInterceptor<Cs>
where
    Cs: Send + 'static,
{
    chain(interceptors)
}

/// Run a single (possibly chained) interceptor in front of `terminal`.
pub fn invoke<'a, S: CallShape>(
    interceptor: &'a dyn Interceptor<S>,
    args: S::Args,
    info: &'a S::Info,
    terminal: &'a dyn Terminal<S>,
) -> BoxFuture<'a, S::Output> {
    interceptor.intercept(args, info, Next::new(info, terminal))
}

/// Interceptor backed by a closure.
pub struct FnInterceptor<F>(F);

impl<S, F> Interceptor<S> for FnInterceptor<F>
where
    S: CallShape,
    F: for<'a> Fn(S::Args, &'a S::Info, Next<'a, S>) -> BoxFuture<'a, S::Output> + Send + Sync,
{
    fn intercept<'a>(
        &'a self,
        args: S::Args,
        info: &'a S::Info,
        next: Next<'a, S>,
    ) -> BoxFuture<'a, S::Output> {
        (self.0)(args, info, next)
    }
}

/// Wrap a closure as an interceptor.
///
/// ```ignore
/// let tag = interceptor_fn::<UnaryServer, _>(|call, _info, next| {
///     async move { next.run(call).await }.boxed()
/// });
/// ```
#[must_use]
pub fn interceptor_fn<S, F>(f: F) -> InterceptorRef<S>
where
    S: CallShape,
    F: for<'a> Fn(S::Args, &'a S::Info, Next<'a, S>) -> BoxFuture<'a, S::Output>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnInterceptor(f))
}
