// ── Reactive query snapshots ──

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::QuerySnapshot;
use crate::resource::Resource;

/// A subscription to one query's published state.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
pub struct QueryStream<R: Resource> {
    current: QuerySnapshot<R>,
    receiver: watch::Receiver<QuerySnapshot<R>>,
}

impl<R: Resource> QueryStream<R> {
    pub(crate) fn new(receiver: watch::Receiver<QuerySnapshot<R>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation (or the last `changed()`).
    pub fn current(&self) -> &QuerySnapshot<R> {
        &self.current
    }

    /// The latest published snapshot.
    pub fn latest(&self) -> QuerySnapshot<R> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the query has been dropped.
    pub async fn changed(&mut self) -> Option<QuerySnapshot<R>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> QueryWatchStream<R> {
        QueryWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct QueryWatchStream<R: Resource> {
    inner: WatchStream<QuerySnapshot<R>>,
}

impl<R: Resource> Stream for QueryWatchStream<R> {
    type Item = QuerySnapshot<R>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
