//! Progress-callback trait for per-stage analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline extracts each dossier file, waits on the
//! model, and renders the report.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a WebSocket, or a terminal progress bar
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so it works correctly when
//! dossier files are extracted concurrently.

use std::sync::Arc;

/// Called by the analysis pipeline as it advances through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Extraction events may arrive concurrently from
/// different threads; implementations must protect shared mutable state.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once before any file is touched.
    fn on_analysis_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before text extraction starts for a file.
    fn on_document_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a file's text has been extracted.
    ///
    /// `chars` is the length of the extracted text; `0` means the file had
    /// no embedded text and will be skipped.
    fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
        let _ = (index, total, chars);
    }

    /// Called when extraction failed for a file (the analysis continues).
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called just before the model request is sent.
    fn on_model_start(&self, prompt_chars: usize) {
        let _ = prompt_chars;
    }

    /// Called when the model answered.
    fn on_model_complete(&self, report_chars: usize) {
        let _ = report_chars;
    }

    /// Called when the PDF report has been assembled.
    fn on_report_rendered(&self, pages: usize, bytes: usize) {
        let _ = (pages, bytes);
    }

    /// Called once at the end, whatever happened in between.
    fn on_analysis_complete(&self, extracted: usize, total: usize) {
        let _ = (extracted, total);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        documents: AtomicUsize,
        errors: AtomicUsize,
        model_calls: AtomicUsize,
        rendered_pages: AtomicUsize,
    }

    impl AnalysisProgressCallback for TrackingCallback {
        fn on_document_complete(&self, _index: usize, _total: usize, _chars: usize) {
            self.documents.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_error(&self, _index: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_model_complete(&self, _report_chars: usize) {
            self.model_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn on_report_rendered(&self, pages: usize, _bytes: usize) {
            self.rendered_pages.store(pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_analysis_start(2);
        cb.on_document_start(1, 2, "cctp.pdf");
        cb.on_document_complete(1, 2, 1024);
        cb.on_document_error(2, 2, "bad xref");
        cb.on_model_start(4096);
        cb.on_model_complete(2048);
        cb.on_report_rendered(3, 15_000);
        cb.on_analysis_complete(1, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            documents: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            model_calls: AtomicUsize::new(0),
            rendered_pages: AtomicUsize::new(0),
        };

        tracker.on_document_complete(1, 3, 100);
        tracker.on_document_complete(2, 3, 200);
        tracker.on_document_error(3, 3, "encrypted");
        tracker.on_model_complete(1500);
        tracker.on_report_rendered(2, 9000);

        assert_eq!(tracker.documents.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.model_calls.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.rendered_pages.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn AnalysisProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_analysis_start(1);
        cb.on_analysis_complete(1, 1);
    }
}
