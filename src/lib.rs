//! # docsight
//!
//! Turn a folder of images and PDFs into an LLM-generated insight report.
//!
//! ## Why this crate?
//!
//! A folder of screenshots, scans, charts, and PDF documents is opaque to
//! scripts and dashboards. docsight renders everything down to images,
//! lets a vision model read the set as a human would, and has a second
//! model pass turn those findings into a presentable Markdown or HTML
//! report — one file out, every run.
//!
//! ## Pipeline Overview
//!
//! ```text
//! documents/
//!  │
//!  ├─ 1. Classify  partition into images / PDFs / unsupported (warned)
//!  ├─ 2. Convert   rasterise PDF pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Assemble  base64 images + optional guidance, deterministic order
//!  ├─ 4. Analyze   one vision-model call over the whole image set
//!  ├─ 5. Report    one text-model call: findings → Markdown/HTML report
//!  └─ 6. Write     atomic write to output/report.{md,html}
//! ```
//!
//! The two agent calls are strictly sequential — the report stage only
//! ever runs on a successful analysis, and exactly one call is in flight
//! at a time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsight::{run_to_file, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = RunConfig::builder()
//!         .documents_path("documents")
//!         .output_path("output")
//!         .guidance("focus on costs")
//!         .build()?;
//!     let (path, output) = run_to_file(&config).await?;
//!     eprintln!(
//!         "{} — {} images analyzed, {} skipped",
//!         path.display(),
//!         output.stats.images_analyzed,
//!         output.stats.skipped_files
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsight` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docsight = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;
pub mod telemetry;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionFailurePolicy, ReportFormat, RunConfig, RunConfigBuilder};
pub use error::DocsightError;
pub use output::{AnalysisResult, Report, RunOutput, RunStats, SkipReason, SkippedFile, StageUsage};
pub use pipeline::stages::Stage;
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use run::{run, run_to_file};
pub use telemetry::{load_credentials, TracingCredentials};
