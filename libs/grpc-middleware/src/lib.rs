#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Interceptor chaining for gRPC servers and clients.
//!
//! A server or client connection accepts one unary and one stream
//! interceptor. [`chain`] folds an ordered list of interceptors into that
//! single slot: the first interceptor is the outermost, so it sees the call
//! first and the outcome last.
//!
//! ```ignore
//! use grpc_middleware::interceptors::{AuthInterceptor, LoggingInterceptor};
//! use grpc_middleware::{with_unary_server_chain, ServerOptions};
//! use std::sync::Arc;
//!
//! let options = ServerOptions::new([with_unary_server_chain([
//!     Arc::new(LoggingInterceptor::new()) as _,
//!     Arc::new(AuthInterceptor::any_credential()) as _,
//! ])])?;
//! let reply = options.handle_unary(call, &info, &handler).await?;
//! ```

pub mod chain;
pub mod conn;
pub mod context;
pub mod interceptors;
pub mod options;
pub mod shape;
pub mod stream;

pub use chain::{
    chain, chain_stream_client, chain_stream_server, chain_unary_client, chain_unary_server,
    interceptor_fn, invoke, FnInterceptor, Interceptor, InterceptorRef, Next, PassThrough,
    StreamClientInterceptor, StreamServerInterceptor, Terminal, UnaryClientInterceptor,
    UnaryServerInterceptor,
};
pub use conn::{CallOption, ClientConn, StreamDesc};
pub use context::CallContext;
pub use options::{
    with_stream_client_chain, with_stream_server_chain, with_unary_client_chain,
    with_unary_server_chain, DialOption, DialOptions, OptionsError, ServerOption, ServerOptions,
};
pub use shape::{
    AnyMessage, CallShape, ServiceRef, StreamClient, StreamClientCall, StreamServer,
    StreamServerCall, StreamServerInfo, UnaryClient, UnaryClientCall, UnaryServer,
    UnaryServerCall, UnaryServerInfo,
};
pub use stream::{BoxClientStream, BoxServerStream, ClientStream, ServerStream, WrappedServerStream};
