//! Streaming batch API: emit documents as they complete.
//!
//! ## Why stream?
//!
//! A batch mixing a 20 MB PDF with a handful of text files should not make the
//! caller wait for the PDF before showing the small ones. [`prepare_stream`]
//! does the same work as [`crate::Extractor::prepare_batch`] but yields each
//! [`BatchItem`] as soon as its file finishes, so items may arrive out of
//! input order. Sort by [`BatchItem::index`] if order matters.

use crate::extract::Extractor;
use crate::output::BatchItem;
use crate::pipeline::source::DocumentSource;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of batch items.
pub type BatchStream<'a> = Pin<Box<dyn Stream<Item = BatchItem> + Send + 'a>>;

/// Prepare many documents, yielding each one as it finishes.
///
/// At most `config.concurrency` files are in flight. The batch-level progress
/// events still fire: `on_batch_start` when the stream is created and
/// `on_batch_complete` when the last item is yielded.
pub fn prepare_stream<'a, S, I>(extractor: &'a Extractor, sources: I) -> BatchStream<'a>
where
    S: DocumentSource + 'a,
    I: IntoIterator<Item = S>,
{
    let sources: Vec<S> = sources.into_iter().collect();
    let total = sources.len();
    let callback = extractor.config().progress_callback.clone();
    if let Some(ref cb) = callback {
        cb.on_batch_start(total);
    }
    info!("Streaming {} documents", total);

    let finished = Arc::new(AtomicUsize::new(0));
    let succeeded = Arc::new(AtomicUsize::new(0));

    let s = stream::iter(sources.into_iter().enumerate().map(
        move |(index, source)| async move {
            let name = source.name().to_string();
            let result = extractor.prepare(&source).await;
            BatchItem {
                index,
                name,
                result,
            }
        },
    ))
    .buffer_unordered(extractor.config().concurrency)
    .inspect(move |item| {
        if item.is_ok() {
            succeeded.fetch_add(1, Ordering::SeqCst);
        }
        if finished.fetch_add(1, Ordering::SeqCst) + 1 == total {
            let success = succeeded.load(Ordering::SeqCst);
            info!("Stream complete: {}/{} documents", success, total);
            if let Some(ref cb) = callback {
                cb.on_batch_complete(total, success);
            }
        }
    });

    Box::pin(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::pipeline::source::MemorySource;
    use crate::progress::ExtractionProgressCallback;

    #[derive(Default)]
    struct BatchCounter {
        completed: AtomicUsize,
        success: AtomicUsize,
    }

    impl ExtractionProgressCallback for BatchCounter {
        fn on_batch_complete(&self, _total: usize, success: usize) {
            self.completed.fetch_add(1, Ordering::SeqCst);
            self.success.store(success, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn every_item_is_yielded_once() {
        let counter = Arc::new(BatchCounter::default());
        let config = ExtractorConfig::builder()
            .concurrency(3)
            .progress_callback(Arc::clone(&counter) as Arc<dyn ExtractionProgressCallback>)
            .build()
            .unwrap();
        let extractor = Extractor::without_pdf(config);
        let sources = vec![
            MemorySource::new("a.txt", "alpha"),
            MemorySource::new("b.txt", ""),
            MemorySource::new("c.txt", "gamma"),
        ];

        let mut items: Vec<BatchItem> = prepare_stream(&extractor, sources).collect().await;
        items.sort_by_key(|i| i.index);

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(!items[1].is_ok());
        assert_eq!(items[2].result.as_ref().unwrap().text, "gamma");
        assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
        assert_eq!(counter.success.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_batch_yields_nothing() {
        let extractor = Extractor::without_pdf(ExtractorConfig::default());
        let items: Vec<BatchItem> =
            prepare_stream(&extractor, Vec::<MemorySource>::new()).collect().await;
        assert!(items.is_empty());
    }
}
