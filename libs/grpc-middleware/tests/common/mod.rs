#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use grpc_middleware::{
    AnyMessage, CallContext, CallShape, ClientStream, Interceptor, InterceptorRef, Next,
    ServerStream,
};
use parking_lot::Mutex;
use tonic::Status;

/// Shared, ordered record of what ran.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Records `id>` before delegating and `<id` after, for any call shape.
pub struct Tag {
    id: &'static str,
    log: Log,
}

impl<S: CallShape> Interceptor<S> for Tag {
    fn intercept<'a>(
        &'a self,
        args: S::Args,
        _info: &'a S::Info,
        next: Next<'a, S>,
    ) -> BoxFuture<'a, S::Output> {
        Box::pin(async move {
            self.log.push(format!("{}>", self.id));
            let out = next.run(args).await;
            self.log.push(format!("<{}", self.id));
            out
        })
    }
}

pub fn tag<S: CallShape>(id: &'static str, log: &Log) -> InterceptorRef<S> {
    Arc::new(Tag {
        id,
        log: log.clone(),
    })
}

/// In-memory server stream fed from a queue.
pub struct MemoryServerStream {
    pub ctx: CallContext,
    pub inbound: VecDeque<AnyMessage>,
    pub sent: Log,
}

impl MemoryServerStream {
    pub fn new(ctx: CallContext, sent: &Log) -> Self {
        Self {
            ctx,
            inbound: VecDeque::new(),
            sent: sent.clone(),
        }
    }

    pub fn with_inbound(mut self, message: AnyMessage) -> Self {
        self.inbound.push_back(message);
        self
    }
}

#[async_trait]
impl ServerStream for MemoryServerStream {
    fn context(&self) -> &CallContext {
        &self.ctx
    }

    async fn send_message(&mut self, message: AnyMessage) -> Result<(), Status> {
        let text = message
            .downcast_ref::<String>()
            .ok_or_else(|| Status::invalid_argument("expected a String message"))?;
        self.sent.push(text.as_str());
        Ok(())
    }

    async fn recv_message(&mut self) -> Result<Option<AnyMessage>, Status> {
        Ok(self.inbound.pop_front())
    }
}

/// Client stream that records what is sent and never receives anything.
pub struct MemoryClientStream {
    pub ctx: CallContext,
    pub sent: Log,
    pub closed: bool,
}

impl MemoryClientStream {
    pub fn new(ctx: CallContext, sent: &Log) -> Self {
        Self {
            ctx,
            sent: sent.clone(),
            closed: false,
        }
    }
}

#[async_trait]
impl ClientStream for MemoryClientStream {
    fn context(&self) -> &CallContext {
        &self.ctx
    }

    async fn send_message(&mut self, message: AnyMessage) -> Result<(), Status> {
        if self.closed {
            return Err(Status::failed_precondition("send after close"));
        }
        let text = message
            .downcast_ref::<String>()
            .ok_or_else(|| Status::invalid_argument("expected a String message"))?;
        self.sent.push(text.as_str());
        Ok(())
    }

    async fn recv_message(&mut self) -> Result<Option<AnyMessage>, Status> {
        Ok(None)
    }

    async fn close_send(&mut self) -> Result<(), Status> {
        self.closed = true;
        Ok(())
    }
}
