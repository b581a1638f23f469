//! Report persistence: write the final report to the output directory.
//!
//! ## Naming and overwrite policy
//!
//! The report is always written to `report.md` / `report.html` inside the
//! output directory, overwriting any previous run's file. A fixed name
//! keeps reruns idempotent at the filesystem level — the newest report is
//! always at the same path — which is friendlier to scripts than
//! timestamped files that accumulate.
//!
//! ## Atomicity
//!
//! The body is written to a temp file and renamed into place, so an
//! interrupted run never leaves a partial report: either the complete
//! file exists, or no file was created.

use crate::error::DocsightError;
use crate::output::Report;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the report into `output_dir`, creating the directory if absent.
///
/// Returns the path of the written file.
///
/// # Errors
/// [`DocsightError::OutputWrite`] if the directory cannot be created or
/// the file cannot be written.
pub async fn write_report(report: &Report, output_dir: &Path) -> Result<PathBuf, DocsightError> {
    let path = output_dir.join(format!("report.{}", report.format.extension()));

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| DocsightError::OutputWrite {
            path: path.clone(),
            source: e,
        })?;

    let tmp_path = path.with_extension(format!("{}.tmp", report.format.extension()));
    tokio::fs::write(&tmp_path, &report.body)
        .await
        .map_err(|e| DocsightError::OutputWrite {
            path: path.clone(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| DocsightError::OutputWrite {
            path: path.clone(),
            source: e,
        })?;

    info!("Report written to {}", path.display());
    Ok(path)
}
