//! # Ordered composition of pending handles.
//!
//! Two ways to turn N asynchronous sources into one stream that yields in **source order**:
//!
//! | Helper                  | Subscription | Source K+1 first polled                 |
//! |-------------------------|--------------|-----------------------------------------|
//! | [`merge_sequential`]    | eager        | on the stream's first poll, with all others |
//! | [`concat_sequential`]   | lazy         | only after source K has yielded         |
//!
//! The difference matters whenever an earlier source depends on a later one. With the
//! release gate closed, two [`PendingHandle`](crate::PendingHandle)s followed by a source
//! that opens the gate complete under [`merge_sequential`] and hang forever under
//! [`concat_sequential`], because the releasing source is never started.
//!
//! ## Example
//! ```rust
//! use deferred_gate::merge::merge_sequential;
//! use futures::StreamExt;
//! use futures::future::ready;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let out: Vec<u32> = merge_sequential(vec![ready(1), ready(2)]).collect().await;
//! assert_eq!(out, vec![1, 2]);
//! # }
//! ```

use std::future::Future;

use futures::stream::{self, FuturesOrdered, Stream, StreamExt};

/// Eagerly polls every source and yields their outputs in source order.
///
/// Completes once all sources have yielded.
pub fn merge_sequential<I>(sources: I) -> FuturesOrdered<I::Item>
where
    I: IntoIterator,
    I::Item: Future,
{
    sources.into_iter().collect()
}

/// Polls one source at a time: the next source starts only after the previous one yielded.
pub fn concat_sequential<I>(sources: I) -> impl Stream<Item = <I::Item as Future>::Output>
where
    I: IntoIterator,
    I::Item: Future,
{
    stream::iter(sources).then(|source| source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::FutureExt;
    use futures::future::BoxFuture;

    fn tracked(started: &Arc<AtomicUsize>, delay_ms: u64, value: u32) -> BoxFuture<'static, u32> {
        let started = Arc::clone(started);
        async move {
            started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            value
        }
        .boxed()
    }

    #[tokio::test(start_paused = true)]
    async fn merge_starts_all_sources_and_keeps_order() {
        let started = Arc::new(AtomicUsize::new(0));
        let mut merged = merge_sequential(vec![
            tracked(&started, 300, 1),
            tracked(&started, 100, 2),
            tracked(&started, 200, 3),
        ]);

        assert_eq!(merged.next().await, Some(1));
        assert_eq!(started.load(Ordering::SeqCst), 3);
        assert_eq!(merged.collect::<Vec<_>>().await, vec![2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn concat_starts_sources_one_by_one() {
        let started = Arc::new(AtomicUsize::new(0));
        let mut concat = Box::pin(concat_sequential(vec![
            tracked(&started, 300, 1),
            tracked(&started, 100, 2),
        ]));

        assert_eq!(concat.next().await, Some(1));
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(concat.next().await, Some(2));
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(concat.next().await, None);
    }
}
