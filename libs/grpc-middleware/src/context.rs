//! Per-call context threaded explicitly through interceptor chains.

use std::time::Duration;

use http::Extensions;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::metadata::MetadataMap;

/// Values an interceptor derives for downstream links.
///
/// The context is passed by value into `next`: what an interceptor hands to
/// `next` is exactly what the following link observes. Clones share the
/// cancellation token; [`child`](Self::child) derives an independently
/// cancellable scope.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    metadata: MetadataMap,
    extensions: Extensions,
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl CallContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_metadata(metadata: MetadataMap) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataMap {
        &mut self.metadata
    }

    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Attach a typed value, replacing any previous value of the same type.
    #[must_use]
    pub fn with_value<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    #[must_use]
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Set a deadline. An earlier existing deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Time left until the deadline, `None` when no deadline is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Copy of this context whose cancellation is a child of this one:
    /// cancelling the parent cancels the child, not the other way round.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            metadata: self.metadata.clone(),
            extensions: self.extensions.clone(),
            deadline: self.deadline,
            cancellation: self.cancellation.child_token(),
        }
    }
}
