//! Document conversion: render every page of a PDF to an image via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the
//! blocking thread pool so the async worker threads never stall on
//! CPU-heavy rendering.
//!
//! ## Determinism
//!
//! The same PDF at the same DPI always yields the same page count and
//! ordering — pages are walked front to back and labelled
//! `{stem}_page_{n}` with a 1-based page number, so converted artifacts
//! never collide across documents.

use crate::config::RunConfig;
use crate::error::DocsightError;
use crate::pipeline::assemble::ConvertedImage;
use crate::pipeline::encode;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// US Letter width in PDF points; used to derive a pixel target from DPI.
const LETTER_WIDTH_POINTS: f32 = 612.0;

/// Render every page of a PDF into [`ConvertedImage`]s, in page order.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
///
/// # Errors
/// [`DocsightError::Conversion`] naming the offending file on any pdfium
/// failure; the caller applies the configured skip-vs-abort policy.
pub async fn render_document(
    pdf_path: &Path,
    entry_index: usize,
    config: &RunConfig,
) -> Result<Vec<ConvertedImage>, DocsightError> {
    let path = pdf_path.to_path_buf();
    let dpi = config.dpi;
    let max_pixels = config.max_rendered_pixels;
    let pages_dir = config
        .keep_page_images
        .then(|| config.output_path.join("pages"));

    tokio::task::spawn_blocking(move || {
        render_document_blocking(&path, entry_index, dpi, max_pixels, pages_dir.as_deref())
    })
    .await
    .map_err(|e| DocsightError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of document rendering.
fn render_document_blocking(
    pdf_path: &Path,
    entry_index: usize,
    dpi: u32,
    max_pixels: u32,
    pages_dir: Option<&Path>,
) -> Result<Vec<ConvertedImage>, DocsightError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| DocsightError::Conversion {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("{}: {} pages", pdf_path.display(), total_pages);

    // Target width follows the configured DPI, capped so an oversized page
    // cannot exhaust memory regardless of its physical dimensions.
    let target_width = ((dpi as f32 / 72.0) * LETTER_WIDTH_POINTS) as i32;
    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width.min(max_pixels as i32))
        .set_maximum_height(max_pixels as i32);

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let mut results = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| DocsightError::Conversion {
                path: pdf_path.to_path_buf(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| DocsightError::Conversion {
                    path: pdf_path.to_path_buf(),
                    detail: format!("page {}: {:?}", idx + 1, e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered {} page {} → {}x{} px",
            stem,
            idx + 1,
            image.width(),
            image.height()
        );

        let label = format!("{}_page_{}", stem, idx + 1);

        if let Some(dir) = pages_dir {
            persist_page_image(&image, dir, &label);
        }

        let data = encode::encode_rendered_page(&image).map_err(|e| DocsightError::Conversion {
            path: pdf_path.to_path_buf(),
            detail: format!("page {}: image encoding failed: {}", idx + 1, e),
        })?;

        results.push(ConvertedImage {
            entry_index,
            page_index: idx + 1,
            label,
            data,
        });
    }

    Ok(results)
}

/// Best-effort persistence of an intermediate page image.
///
/// The report never depends on these files, so a failure here is a
/// warning, not a run failure.
fn persist_page_image(image: &image::DynamicImage, dir: &Path, label: &str) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Could not create pages directory {}: {}", dir.display(), e);
        return;
    }
    let path: PathBuf = dir.join(format!("{label}.png"));
    if let Err(e) = image.save(&path) {
        warn!("Could not save page image {}: {}", path.display(), e);
    } else {
        debug!("Saved page image {}", path.display());
    }
}
