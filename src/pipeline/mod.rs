//! Pipeline stages for the document-analysis run.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! classify ──▶ render ──▶ assemble ──▶ stages ──▶ postprocess
//! (extensions) (pdfium)   (+ encode)   (2 LLM)    (cleanup)
//! ```
//!
//! 1. [`classify`]  — partition the documents directory into images,
//!    convertible PDFs, and unsupported entries
//! 2. [`render`]    — rasterise every PDF page; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`encode`]    — base64-wrap rendered pages and native image bytes
//!    for the multimodal request body
//! 4. [`assemble`]  — compose the ordered image bundle plus optional
//!    guidance into the analysis input
//! 5. [`stages`]    — drive the two sequential agent calls with
//!    retry/backoff/timeout; the only module with network I/O
//! 6. [`postprocess`] — deterministic text cleanup of the final report

pub mod assemble;
pub mod classify;
pub mod encode;
pub mod postprocess;
pub mod render;
pub mod stages;
