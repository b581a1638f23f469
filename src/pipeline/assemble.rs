//! Prompt assembly: merge native images and converted pages into the
//! ordered input bundle for the analysis stage.
//!
//! Filtering already happened at classification and conversion; this
//! stage is pure composition. The one I/O it performs is reading native
//! image bytes, which were deliberately left on disk until now so a run
//! that aborts during classification never touches them.
//!
//! Ordering is the invariant that matters here: images are sorted by
//! (directory entry index, page index) so the sequence presented to the
//! model is identical across repeated runs on an unchanged directory.

use crate::error::DocsightError;
use crate::pipeline::classify::{DocumentEntry, ImageKind};
use crate::pipeline::encode;
use edgequake_llm::ImageData;
use std::fmt;
use tracing::debug;

/// A single image ready for the analysis stage: either a native image or
/// one rendered PDF page.
#[derive(Clone)]
pub struct ConvertedImage {
    /// Index of the originating directory entry.
    pub entry_index: usize,
    /// 0 for native images, 1-based page number for PDF pages.
    pub page_index: usize,
    /// Namespaced label, e.g. `invoice_page_2` — unique across the run.
    pub label: String,
    /// Base64 payload with MIME type.
    pub data: ImageData,
}

impl fmt::Debug for ConvertedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedImage")
            .field("entry_index", &self.entry_index)
            .field("page_index", &self.page_index)
            .field("label", &self.label)
            .field("data", &"<ImageData>")
            .finish()
    }
}

/// The complete input bundle for the analysis stage.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Optional free-text guidance, forwarded verbatim.
    pub guidance: Option<String>,
    /// Images in deterministic (entry, page) order.
    pub images: Vec<ConvertedImage>,
}

/// Build the [`AnalysisContext`], restoring deterministic ordering.
///
/// Conversion may one day run PDFs in parallel; sorting here by
/// (entry_index, page_index) makes the assembled sequence independent of
/// completion order.
pub fn assemble(guidance: Option<String>, mut images: Vec<ConvertedImage>) -> AnalysisContext {
    images.sort_by_key(|img| (img.entry_index, img.page_index));
    debug!("Assembled analysis context with {} images", images.len());
    AnalysisContext { guidance, images }
}

/// Read and wrap a native image file.
///
/// # Errors
/// [`DocsightError::Conversion`] if the file cannot be read; the caller
/// applies the configured skip-vs-abort policy.
pub async fn load_native_image(
    entry: &DocumentEntry,
    kind: ImageKind,
) -> Result<ConvertedImage, DocsightError> {
    let bytes = tokio::fs::read(&entry.path)
        .await
        .map_err(|e| DocsightError::Conversion {
            path: entry.path.clone(),
            detail: e.to_string(),
        })?;

    Ok(ConvertedImage {
        entry_index: entry.index,
        page_index: 0,
        label: entry.stem(),
        data: encode::encode_native_image(&bytes, kind),
    })
}
