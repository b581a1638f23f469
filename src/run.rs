//! Top-level run orchestration: classify → convert → assemble →
//! analyze → report → write.
//!
//! One strictly sequential pass. Cost-avoidance shapes the ordering: the
//! LLM provider is resolved only *after* classification has proven there
//! is something to analyze, so a missing or empty documents directory
//! never spends an API call.

use crate::config::{ConversionFailurePolicy, RunConfig};
use crate::error::DocsightError;
use crate::output::{RunOutput, RunStats, SkipReason, SkippedFile};
use crate::pipeline::stages::Stage;
use crate::pipeline::{assemble, classify, postprocess, render, stages};
use crate::writer;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the full pipeline and return the generated report in memory.
///
/// # Errors
/// Any fatal [`DocsightError`]: unusable documents directory, nothing to
/// process, a conversion failure under the abort policy, either agent
/// stage failing, or (via [`run_to_file`]) an unwritable output path.
/// Per-file problems under the default skip-and-warn policy are returned
/// in [`RunOutput::skipped`], not as errors.
pub async fn run(config: &RunConfig) -> Result<RunOutput, DocsightError> {
    let total_start = Instant::now();
    info!("Starting run: {}", config.documents_path.display());

    if let Some(ref tracing) = config.tracing {
        if tracing.is_complete() {
            info!("Tracing credentials resolved; observability backend available");
        } else {
            debug!("Tracing credentials incomplete; running without tracing");
        }
    }

    // ── Step 1: Classify ─────────────────────────────────────────────────
    let entries = classify::scan_directory(&config.documents_path)?;
    let mut skipped: Vec<SkippedFile> = Vec::new();

    for entry in &entries {
        if entry.kind == classify::DocumentKind::Unsupported {
            warn!(
                "Skipping file {}: not a supported image format (jpg/jpeg/png/gif/webp) or pdf",
                entry.name()
            );
            skipped.push(SkippedFile {
                path: entry.path.clone(),
                reason: SkipReason::UnsupportedFormat,
            });
        }
    }

    let processable = classify::processable_count(&entries);
    if processable == 0 {
        return Err(DocsightError::NoProcessableInput {
            path: config.documents_path.clone(),
        });
    }
    info!(
        "Classified {} entries: {} processable, {} skipped",
        entries.len(),
        processable,
        skipped.len()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_complete(processable, skipped.len());
    }

    // ── Step 2: Convert ──────────────────────────────────────────────────
    let convert_start = Instant::now();
    let mut images = Vec::new();
    let mut native_images = 0usize;
    let mut converted_documents = 0usize;
    let mut converted_pages = 0usize;

    for entry in &entries {
        match entry.kind {
            classify::DocumentKind::Image(kind) => {
                match assemble::load_native_image(entry, kind).await {
                    Ok(img) => {
                        native_images += 1;
                        images.push(img);
                    }
                    Err(e) => handle_conversion_failure(
                        entry, e, config, &mut skipped,
                        SkipKind::Unreadable,
                    )?,
                }
            }
            classify::DocumentKind::Convertible => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_convert_start(&entry.name());
                }
                match render::render_document(&entry.path, entry.index, config).await {
                    Ok(pages) => {
                        converted_documents += 1;
                        converted_pages += pages.len();
                        if let Some(ref cb) = config.progress_callback {
                            cb.on_convert_complete(&entry.name(), pages.len());
                        }
                        images.extend(pages);
                    }
                    Err(e) => handle_conversion_failure(
                        entry, e, config, &mut skipped,
                        SkipKind::ConversionFailed,
                    )?,
                }
            }
            classify::DocumentKind::Unsupported => {}
        }
    }
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;

    // Every processable entry may have been skipped away by now.
    if images.is_empty() {
        return Err(DocsightError::NoProcessableInput {
            path: config.documents_path.clone(),
        });
    }
    info!(
        "Prepared {} images ({} native, {} converted pages) in {}ms",
        images.len(),
        native_images,
        converted_pages,
        convert_duration_ms
    );

    // ── Step 3: Assemble ─────────────────────────────────────────────────
    let context = assemble::assemble(config.guidance.clone(), images);
    let images_analyzed = context.images.len();

    // ── Step 4: Resolve provider ─────────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 5: Stage 1 — analysis ───────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(Stage::Analysis);
    }
    let analysis = stages::analyze(&provider, &context, config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(Stage::Analysis, analysis.text.len());
    }
    info!(
        "Analysis stage complete: {} chars in {}ms",
        analysis.text.len(),
        analysis.usage.duration_ms
    );

    // ── Step 6: Stage 2 — report generation ──────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(Stage::Report);
    }
    let mut report =
        stages::generate_report(&provider, &analysis, context.guidance.as_deref(), config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(Stage::Report, report.body.len());
    }

    // ── Step 7: Post-process ─────────────────────────────────────────────
    report.body = postprocess::clean_report(&report.body);

    // ── Step 8: Stats ────────────────────────────────────────────────────
    let stats = RunStats {
        scanned_entries: entries.len(),
        native_images,
        converted_documents,
        converted_pages,
        images_analyzed,
        skipped_files: skipped.len(),
        total_input_tokens: analysis.usage.input_tokens + report.usage.input_tokens,
        total_output_tokens: analysis.usage.output_tokens + report.usage.output_tokens,
        convert_duration_ms,
        analysis_duration_ms: analysis.usage.duration_ms,
        report_duration_ms: report.usage.duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Run complete: {} images analyzed, report {} chars, {}ms total",
        images_analyzed,
        report.body.len(),
        stats.total_duration_ms
    );

    Ok(RunOutput {
        report,
        stats,
        skipped,
    })
}

/// Run the full pipeline and persist the report.
///
/// Returns the written path alongside the run output. The write is
/// atomic (temp file + rename); if any stage fails, no output file is
/// created.
pub async fn run_to_file(config: &RunConfig) -> Result<(PathBuf, RunOutput), DocsightError> {
    let output = run(config).await?;
    let path = writer::write_report(&output.report, &config.output_path).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(output.report.body.len());
    }
    Ok((path, output))
}

// ── Internal helpers ─────────────────────────────────────────────────────

enum SkipKind {
    ConversionFailed,
    Unreadable,
}

/// Apply the configured skip-vs-abort policy to a per-file failure.
fn handle_conversion_failure(
    entry: &classify::DocumentEntry,
    error: DocsightError,
    config: &RunConfig,
    skipped: &mut Vec<SkippedFile>,
    kind: SkipKind,
) -> Result<(), DocsightError> {
    match config.on_conversion_error {
        ConversionFailurePolicy::Abort => Err(error),
        ConversionFailurePolicy::SkipAndWarn => {
            let detail = error.to_string();
            warn!("Skipping file {}: {}", entry.name(), detail);
            if let Some(ref cb) = config.progress_callback {
                cb.on_convert_error(&entry.name(), &detail);
            }
            skipped.push(SkippedFile {
                path: entry.path.clone(),
                reason: match kind {
                    SkipKind::ConversionFailed => SkipReason::ConversionFailed { detail },
                    SkipKind::Unreadable => SkipReason::Unreadable { detail },
                },
            });
            Ok(())
        }
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    and configured the provider entirely; used as-is. Useful in tests
///    or when the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) — reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`DOCSIGHT_LLM_PROVIDER` + `DOCSIGHT_MODEL`) —
///    both set means the execution environment (Makefile, CI) chose;
///    honoured before full auto-detection.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — scans all
///    known API key variables and picks the first available provider.
fn resolve_provider(config: &RunConfig) -> Result<Arc<dyn LLMProvider>, DocsightError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-mini");
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("DOCSIGHT_LLM_PROVIDER"),
        std::env::var("DOCSIGHT_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DocsightError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, DocsightError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DocsightError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
