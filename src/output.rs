//! Output types: the generated report, run statistics, and skip records.

use crate::config::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Free-form findings produced by the analysis stage.
///
/// The pipeline does not inspect the structure of this text beyond
/// non-emptiness; it is handed verbatim to the report stage of the same
/// run and never cached across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The analysis text as returned by the model.
    pub text: String,
    /// Token and timing accounting for the stage call.
    pub usage: StageUsage,
}

/// The final report artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Target format the body is written in.
    pub format: ReportFormat,
    /// Full report text (post-processed).
    pub body: String,
    /// Token and timing accounting for the stage call.
    pub usage: StageUsage,
}

/// Per-stage token and timing accounting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StageUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
    /// Retries spent before the call succeeded.
    pub retries: u8,
}

/// A file excluded from the run, with the reason it was excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Why a file was excluded from processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Extension is not in the supported image set and not `.pdf`.
    UnsupportedFormat,
    /// PDF conversion failed under the skip-and-warn policy.
    ConversionFailed { detail: String },
    /// A native image file could not be read.
    Unreadable { detail: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedFormat => write!(f, "unsupported format"),
            SkipReason::ConversionFailed { detail } => {
                write!(f, "conversion failed: {detail}")
            }
            SkipReason::Unreadable { detail } => write!(f, "unreadable: {detail}"),
        }
    }
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Directory entries seen by the classifier.
    pub scanned_entries: usize,
    /// Entries classified as native images.
    pub native_images: usize,
    /// PDFs successfully converted.
    pub converted_documents: usize,
    /// Page images produced from those PDFs.
    pub converted_pages: usize,
    /// Images handed to the analysis stage (native + converted pages).
    pub images_analyzed: usize,
    /// Files excluded with a warning.
    pub skipped_files: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub convert_duration_ms: u64,
    pub analysis_duration_ms: u64,
    pub report_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub report: Report,
    pub stats: RunStats,
    pub skipped: Vec<SkippedFile>,
}
