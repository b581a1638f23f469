//! Error types for the docsight library.
//!
//! Two distinct kinds of failure flow through the pipeline:
//!
//! * [`DocsightError`] — **Fatal**: the run cannot produce a report
//!   (documents directory missing, nothing to process, an agent stage
//!   failed, the report cannot be written). Returned as `Err(DocsightError)`
//!   from the top-level `run*` functions.
//!
//! * Per-file problems — a single unreadable image or malformed PDF.
//!   Under the default skip-and-warn policy these never become an `Err`;
//!   they are recorded as [`crate::output::SkippedFile`] entries so callers
//!   can see exactly which inputs were excluded and why.
//!
//! The split mirrors the propagation policy: local, per-file problems are
//! swallowed into warnings and exclusion; pipeline-stage problems abort the
//! run with an attributed message. No partial report is ever written.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docsight library.
///
/// Per-file skips under [`crate::config::ConversionFailurePolicy::SkipAndWarn`]
/// are recorded in [`crate::output::RunOutput::skipped`] rather than
/// propagated here.
#[derive(Debug, Error)]
pub enum DocsightError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The documents directory does not exist or cannot be read.
    #[error("Documents directory not usable: '{path}': {detail}\nCheck the path exists and is readable.")]
    InputPath { path: PathBuf, detail: String },

    /// Classification found no image and no convertible document.
    ///
    /// Raised before any LLM provider is resolved, so a broken or empty
    /// input directory never spends an API call.
    #[error("No processable files in '{path}'\nSupported: jpg, jpeg, png, gif, webp images and pdf documents.")]
    NoProcessableInput { path: PathBuf },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// A PDF could not be rendered, or a native image could not be read.
    ///
    /// Fatal only under [`crate::config::ConversionFailurePolicy::Abort`];
    /// the default policy downgrades this to a skip with a warning.
    #[error("Failed to convert '{path}': {detail}")]
    Conversion { path: PathBuf, detail: String },

    // ── Agent-stage errors ────────────────────────────────────────────────
    /// The analysis stage failed after all retries.
    #[error("Analysis stage failed: {detail}")]
    AnalysisStage { detail: String },

    /// The analysis stage call exceeded the configured timeout.
    #[error("Analysis stage timed out after {secs}s\nIncrease --api-timeout for large image sets.")]
    AnalysisTimeout { secs: u64 },

    /// The report-generation stage failed after all retries.
    #[error("Report stage failed: {detail}")]
    ReportStage { detail: String },

    /// The report-generation stage call exceeded the configured timeout.
    #[error("Report stage timed out after {secs}s")]
    ReportTimeout { secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory or write the report file.
    #[error("Failed to write report '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Provider errors ───────────────────────────────────────────────────
    /// The configured LLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_path_display_names_the_path() {
        let e = DocsightError::InputPath {
            path: PathBuf::from("/missing/documents"),
            detail: "No such file or directory".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("/missing/documents"), "got: {msg}");
        assert!(msg.contains("No such file or directory"));
    }

    #[test]
    fn no_processable_input_lists_supported_formats() {
        let e = DocsightError::NoProcessableInput {
            path: PathBuf::from("documents"),
        };
        let msg = e.to_string();
        assert!(msg.contains("jpg"));
        assert!(msg.contains("pdf"));
    }

    #[test]
    fn conversion_display_names_the_file() {
        let e = DocsightError::Conversion {
            path: PathBuf::from("report_q3.pdf"),
            detail: "corrupt xref table".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("report_q3.pdf"));
        assert!(msg.contains("corrupt xref table"));
    }

    #[test]
    fn analysis_timeout_display() {
        let e = DocsightError::AnalysisTimeout { secs: 120 };
        assert!(e.to_string().contains("120s"));
    }

    #[test]
    fn output_write_carries_source() {
        let e = DocsightError::OutputWrite {
            path: PathBuf::from("output/report.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(e.to_string().contains("output/report.md"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
