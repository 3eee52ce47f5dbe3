//! Server and dial options carrying a chained interceptor.
//!
//! A server or client accepts at most one unary and one stream interceptor.
//! The `with_*_chain` builders fold a list into that single slot.

use std::fmt;

use futures::future::BoxFuture;
use thiserror::Error;
use tonic::Status;

use crate::chain::{
    chain_stream_client, chain_stream_server, chain_unary_client, chain_unary_server, invoke,
    StreamClientInterceptor, StreamServerInterceptor, Terminal, UnaryClientInterceptor,
    UnaryServerInterceptor,
};
use crate::shape::{
    AnyMessage, StreamClient, StreamClientCall, StreamServer, StreamServerCall, StreamServerInfo,
    UnaryClient, UnaryClientCall, UnaryServer, UnaryServerCall, UnaryServerInfo,
};
use crate::stream::BoxClientStream;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OptionsError {
    #[error("unary interceptor was already set and may not be reset")]
    UnaryInterceptorAlreadySet,
    #[error("stream interceptor was already set and may not be reset")]
    StreamInterceptorAlreadySet,
}

pub enum ServerOption {
    UnaryInterceptor(UnaryServerInterceptor),
    StreamInterceptor(StreamServerInterceptor),
}

pub enum DialOption {
    UnaryInterceptor(UnaryClientInterceptor),
    StreamInterceptor(StreamClientInterceptor),
}

/// Server option installing `interceptors` as one unary interceptor.
#[must_use]
pub fn with_unary_server_chain(
    interceptors: impl IntoIterator<Item = UnaryServerInterceptor>,
) -> ServerOption {
    ServerOption::UnaryInterceptor(chain_unary_server(interceptors))
}

/// Server option installing `interceptors` as one stream interceptor.
#[must_use]
pub fn with_stream_server_chain(
    interceptors: impl IntoIterator<Item = StreamServerInterceptor>,
) -> ServerOption {
    ServerOption::StreamInterceptor(chain_stream_server(interceptors))
}

/// Dial option installing `interceptors` as one unary interceptor.
#[must_use]
pub fn with_unary_client_chain(
    interceptors: impl IntoIterator<Item = UnaryClientInterceptor>,
) -> DialOption {
    DialOption::UnaryInterceptor(chain_unary_client(interceptors))
}

/// Dial option installing `interceptors` as one stream interceptor.
#[must_use]
pub fn with_stream_client_chain(
    interceptors: impl IntoIterator<Item = StreamClientInterceptor>,
) -> DialOption {
    DialOption::StreamInterceptor(chain_stream_client(interceptors))
}

/// Interceptors installed on a server.
#[derive(Default)]
pub struct ServerOptions {
    unary: Option<UnaryServerInterceptor>,
    stream: Option<StreamServerInterceptor>,
}

impl ServerOptions {
    /// # Errors
    /// Returns [`OptionsError`] when a slot is set twice.
    pub fn new(options: impl IntoIterator<Item = ServerOption>) -> Result<Self, OptionsError> {
        let mut this = Self::default();
        for option in options {
            this.apply(option)?;
        }
        Ok(this)
    }

    /// # Errors
    /// Returns [`OptionsError`] when the slot for `option` is already taken.
    pub fn apply(&mut self, option: ServerOption) -> Result<(), OptionsError> {
        match option {
            ServerOption::UnaryInterceptor(interceptor) => {
                if self.unary.is_some() {
                    return Err(OptionsError::UnaryInterceptorAlreadySet);
                }
                self.unary = Some(interceptor);
            }
            ServerOption::StreamInterceptor(interceptor) => {
                if self.stream.is_some() {
                    return Err(OptionsError::StreamInterceptorAlreadySet);
                }
                self.stream = Some(interceptor);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn unary_interceptor(&self) -> Option<&UnaryServerInterceptor> {
        self.unary.as_ref()
    }

    #[must_use]
    pub fn stream_interceptor(&self) -> Option<&StreamServerInterceptor> {
        self.stream.as_ref()
    }

    /// Dispatch a unary call through the installed interceptor, or straight
    /// to `handler` when none is installed.
    pub fn handle_unary<'a>(
        &'a self,
        call: UnaryServerCall,
        info: &'a UnaryServerInfo,
        handler: &'a dyn Terminal<UnaryServer>,
    ) -> BoxFuture<'a, Result<AnyMessage, Status>> {
        match &self.unary {
            Some(interceptor) => invoke(&**interceptor, call, info, handler),
            None => handler.call(call),
        }
    }

    pub fn handle_stream<'a>(
        &'a self,
        call: StreamServerCall,
        info: &'a StreamServerInfo,
        handler: &'a dyn Terminal<StreamServer>,
    ) -> BoxFuture<'a, Result<(), Status>> {
        match &self.stream {
            Some(interceptor) => invoke(&**interceptor, call, info, handler),
            None => handler.call(call),
        }
    }
}

impl fmt::Debug for ServerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerOptions")
            .field("unary", &self.unary.is_some())
            .field("stream", &self.stream.is_some())
            .finish()
    }
}

/// Interceptors installed on a client connection.
#[derive(Default)]
pub struct DialOptions {
    unary: Option<UnaryClientInterceptor>,
    stream: Option<StreamClientInterceptor>,
}

impl DialOptions {
    /// # Errors
    /// Returns [`OptionsError`] when a slot is set twice.
    pub fn new(options: impl IntoIterator<Item = DialOption>) -> Result<Self, OptionsError> {
        let mut this = Self::default();
        for option in options {
            this.apply(option)?;
        }
        Ok(this)
    }

    /// # Errors
    /// Returns [`OptionsError`] when the slot for `option` is already taken.
    pub fn apply(&mut self, option: DialOption) -> Result<(), OptionsError> {
        match option {
            DialOption::UnaryInterceptor(interceptor) => {
                if self.unary.is_some() {
                    return Err(OptionsError::UnaryInterceptorAlreadySet);
                }
                self.unary = Some(interceptor);
            }
            DialOption::StreamInterceptor(interceptor) => {
                if self.stream.is_some() {
                    return Err(OptionsError::StreamInterceptorAlreadySet);
                }
                self.stream = Some(interceptor);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn unary_interceptor(&self) -> Option<&UnaryClientInterceptor> {
        self.unary.as_ref()
    }

    #[must_use]
    pub fn stream_interceptor(&self) -> Option<&StreamClientInterceptor> {
        self.stream.as_ref()
    }

    /// Issue a unary call through the installed interceptor, or straight to
    /// `invoker` when none is installed.
    pub fn invoke_unary<'a>(
        &'a self,
        call: UnaryClientCall,
        invoker: &'a dyn Terminal<UnaryClient>,
    ) -> BoxFuture<'a, Result<AnyMessage, Status>> {
        match &self.unary {
            Some(interceptor) => invoke(&**interceptor, call, &(), invoker),
            None => invoker.call(call),
        }
    }

    pub fn new_stream<'a>(
        &'a self,
        call: StreamClientCall,
        streamer: &'a dyn Terminal<StreamClient>,
    ) -> BoxFuture<'a, Result<BoxClientStream, Status>> {
        match &self.stream {
            Some(interceptor) => invoke(&**interceptor, call, &(), streamer),
            None => streamer.call(call),
        }
    }
}

impl fmt::Debug for DialOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialOptions")
            .field("unary", &self.unary.is_some())
            .field("stream", &self.stream.is_some())
            .finish()
    }
}
