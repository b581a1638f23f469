//! Progress-callback trait for run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::RunConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline classifies, converts, and drives the
//! two agent stages.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a log sink, or a UI
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync`; all methods have default
//! no-op implementations so callers only override what they care about.

use crate::pipeline::stages::Stage;
use std::sync::Arc;

/// Called by the pipeline as the run progresses.
///
/// Events arrive strictly in pipeline order: one `on_scan_complete`, then
/// conversion events per PDF, then stage events for analysis and report
/// generation, then one `on_run_complete`.
pub trait RunProgressCallback: Send + Sync {
    /// Called once after classification.
    ///
    /// # Arguments
    /// * `processable` — images plus convertible documents found
    /// * `skipped`     — entries excluded as unsupported
    fn on_scan_complete(&self, processable: usize, skipped: usize) {
        let _ = (processable, skipped);
    }

    /// Called just before a PDF is rendered.
    fn on_convert_start(&self, name: &str) {
        let _ = name;
    }

    /// Called when a PDF has been rendered to page images.
    fn on_convert_complete(&self, name: &str, pages: usize) {
        let _ = (name, pages);
    }

    /// Called when a PDF (or native image) is excluded after a conversion
    /// failure under the skip-and-warn policy.
    fn on_convert_error(&self, name: &str, detail: &str) {
        let _ = (name, detail);
    }

    /// Called just before an agent stage is invoked.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when an agent stage returns successfully.
    ///
    /// # Arguments
    /// * `chars` — byte length of the stage output
    fn on_stage_complete(&self, stage: Stage, chars: usize) {
        let _ = (stage, chars);
    }

    /// Called once when the report has been produced (and, via
    /// [`crate::run::run_to_file`], written).
    fn on_run_complete(&self, report_chars: usize) {
        let _ = report_chars;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        converts: AtomicUsize,
        stages: AtomicUsize,
        completed_chars: AtomicUsize,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_convert_complete(&self, _name: &str, _pages: usize) {
            self.converts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_stage_complete(&self, _stage: Stage, _chars: usize) {
            self.stages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_run_complete(&self, report_chars: usize) {
            self.completed_chars.store(report_chars, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_scan_complete(3, 1);
        cb.on_convert_start("b.pdf");
        cb.on_convert_complete("b.pdf", 2);
        cb.on_convert_error("bad.pdf", "corrupt");
        cb.on_stage_start(Stage::Analysis);
        cb.on_stage_complete(Stage::Analysis, 1024);
        cb.on_run_complete(2048);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            converts: AtomicUsize::new(0),
            stages: AtomicUsize::new(0),
            completed_chars: AtomicUsize::new(0),
        };

        tracker.on_scan_complete(2, 0);
        tracker.on_convert_start("b.pdf");
        tracker.on_convert_complete("b.pdf", 2);
        tracker.on_stage_start(Stage::Analysis);
        tracker.on_stage_complete(Stage::Analysis, 500);
        tracker.on_stage_start(Stage::Report);
        tracker.on_stage_complete(Stage::Report, 900);
        tracker.on_run_complete(900);

        assert_eq!(tracker.converts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.stages.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completed_chars.load(Ordering::SeqCst), 900);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn RunProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_scan_complete(1, 0);
        cb.on_stage_start(Stage::Report);
    }
}
