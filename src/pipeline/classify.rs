//! File classification: partition a directory into images, convertible
//! documents, and unsupported entries.
//!
//! Classification is purely extension-based and case-insensitive. The
//! supported image set matches what vision APIs accept directly
//! (jpg/jpeg/png/gif/webp); `.pdf` is convertible via the renderer;
//! everything else is excluded with a warning. The decision is made once
//! here so no later stage needs to re-filter.
//!
//! Entries are sorted by file name before indexing — `read_dir` order is
//! platform-dependent, and the assembled image sequence must be stable
//! across repeated runs on an unchanged directory.

use crate::error::DocsightError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single directory entry and its classification.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    /// Position in the sorted directory listing. Drives image ordering.
    pub index: usize,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl DocumentEntry {
    /// File name for log lines and skip records.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// File stem used to namespace converted-page artifacts.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }
}

/// Closed classification of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Natively supported image, sent to the analysis stage as-is.
    Image(ImageKind),
    /// PDF document, rendered to page images first.
    Convertible,
    /// Anything else; excluded with a warning.
    Unsupported,
}

/// The supported native image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// MIME type for the vision API payload.
    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    /// Map a lowercased extension to an image kind.
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "gif" => Some(ImageKind::Gif),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// Classify a path by its extension (case-insensitive).
pub fn classify_path(path: &Path) -> DocumentKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DocumentKind::Unsupported;
    };
    let ext = ext.to_ascii_lowercase();
    if let Some(kind) = ImageKind::from_extension(&ext) {
        return DocumentKind::Image(kind);
    }
    if ext == "pdf" {
        return DocumentKind::Convertible;
    }
    DocumentKind::Unsupported
}

/// Scan a directory (non-recursively) and classify every entry.
///
/// Entries are returned sorted by file name with their index assigned
/// after sorting, so the same directory always yields the same sequence.
/// Subdirectories and other non-file entries classify as unsupported.
///
/// # Errors
/// [`DocsightError::InputPath`] if the directory does not exist or cannot
/// be read.
pub fn scan_directory(dir: &Path) -> Result<Vec<DocumentEntry>, DocsightError> {
    let read = std::fs::read_dir(dir).map_err(|e| DocsightError::InputPath {
        path: dir.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut paths: Vec<(PathBuf, bool)> = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| DocsightError::InputPath {
            path: dir.to_path_buf(),
            detail: e.to_string(),
        })?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        paths.push((entry.path(), is_file));
    }

    paths.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

    let entries: Vec<DocumentEntry> = paths
        .into_iter()
        .enumerate()
        .map(|(index, (path, is_file))| {
            let kind = if is_file {
                classify_path(&path)
            } else {
                DocumentKind::Unsupported
            };
            debug!("Classified {} as {:?}", path.display(), kind);
            DocumentEntry { index, path, kind }
        })
        .collect();

    Ok(entries)
}

/// Count entries that will reach the pipeline (images + convertibles).
pub fn processable_count(entries: &[DocumentEntry]) -> usize {
    entries
        .iter()
        .filter(|e| !matches!(e.kind, DocumentKind::Unsupported))
        .count()
}
