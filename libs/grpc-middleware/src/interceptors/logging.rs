//! Structured logging of calls for every call shape.

use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tonic::Status;
use tracing::Instrument;

use crate::chain::{Interceptor, Next};
use crate::shape::{
    StreamClient, StreamClientCall, StreamServer, StreamServerCall, StreamServerInfo, UnaryClient,
    UnaryClientCall, UnaryServer, UnaryServerCall, UnaryServerInfo,
};

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn log_outcome<T>(kind: &'static str, method: &str, started: Instant, result: &Result<T, Status>) {
    let elapsed_ms = duration_to_u64_ms(started.elapsed());
    match result {
        Ok(_) => tracing::info!(kind, method, elapsed_ms, "gRPC call completed"),
        Err(status) => tracing::warn!(
            kind,
            method,
            elapsed_ms,
            code = ?status.code(),
            message = %status.message(),
            "gRPC call failed"
        ),
    }
}

/// Logs method, latency and status of every call it wraps.
///
/// Works for all four call shapes. Each call runs inside a `grpc_call`
/// debug span so that logs emitted further down the chain are attributed to
/// the method.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl LoggingInterceptor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<Req, Resp> Interceptor<UnaryServer<Req, Resp>> for LoggingInterceptor
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        call: UnaryServerCall<Req>,
        info: &'a UnaryServerInfo,
        next: Next<'a, UnaryServer<Req, Resp>>,
    ) -> BoxFuture<'a, Result<Resp, Status>> {
        let span = tracing::debug_span!(
            "grpc_call",
            kind = "unary_server",
            method = %info.full_method
        );
        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.run(call).await;
                log_outcome("unary_server", &info.full_method, started, &result);
                result
            }
            .instrument(span),
        )
    }
}

impl<St> Interceptor<StreamServer<St>> for LoggingInterceptor
where
    St: Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        call: StreamServerCall<St>,
        info: &'a StreamServerInfo,
        next: Next<'a, StreamServer<St>>,
    ) -> BoxFuture<'a, Result<(), Status>> {
        let span = tracing::debug_span!(
            "grpc_call",
            kind = "stream_server",
            method = %info.full_method,
            client_stream = info.is_client_stream,
            server_stream = info.is_server_stream,
        );
        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.run(call).await;
                log_outcome("stream_server", &info.full_method, started, &result);
                result
            }
            .instrument(span),
        )
    }
}

impl<Req, Reply> Interceptor<UnaryClient<Req, Reply>> for LoggingInterceptor
where
    Req: Send + 'static,
    Reply: Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        call: UnaryClientCall<Req>,
        _info: &'a (),
        next: Next<'a, UnaryClient<Req, Reply>>,
    ) -> BoxFuture<'a, Result<Reply, Status>> {
        let method = call.method.clone();
        let span = tracing::debug_span!(
            "grpc_call",
            kind = "unary_client",
            method = %method,
            target = %call.conn,
        );
        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.run(call).await;
                log_outcome("unary_client", &method, started, &result);
                result
            }
            .instrument(span),
        )
    }
}

impl<Cs> Interceptor<StreamClient<Cs>> for LoggingInterceptor
where
    Cs: Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        call: StreamClientCall,
        _info: &'a (),
        next: Next<'a, StreamClient<Cs>>,
    ) -> BoxFuture<'a, Result<Cs, Status>> {
        let method = call.method.clone();
        let span = tracing::debug_span!(
            "grpc_call",
            kind = "stream_client",
            method = %method,
            target = %call.conn,
            stream = %call.desc.stream_name,
        );
        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.run(call).await;
                log_outcome("stream_client", &method, started, &result);
                result
            }
            .instrument(span),
        )
    }
}
