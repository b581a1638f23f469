//! The two-stage agent pipeline: analysis, then report generation.
//!
//! The original design is a two-node dependency graph (analyzer →
//! report generator). Two sequential nodes do not justify a graph
//! executor, so the stages are expressed as an explicit typed sequence:
//! [`analyze`] consumes the [`AnalysisContext`] and produces an
//! [`AnalysisResult`]; [`generate_report`] consumes that result and
//! produces a [`Report`]. The report stage can only be reached through a
//! successful analysis value, so "stage 2 never runs before stage 1
//! succeeds" holds by construction.
//!
//! ## Retry strategy
//!
//! HTTP 429 / 503 errors from LLM APIs are transient. Exponential backoff
//! (`retry_backoff_ms * 2^attempt`) avoids hammering a recovering
//! endpoint: with the 500 ms base and 3 retries the wait sequence is
//! 500 ms → 1 s → 2 s. Every attempt additionally runs under
//! `tokio::time::timeout` because the external call has unbounded latency.

use crate::config::RunConfig;
use crate::error::DocsightError;
use crate::output::{AnalysisResult, Report, StageUsage};
use crate::pipeline::assemble::AnalysisContext;
use crate::prompts;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// One external agent call treated as an atomic unit of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analysis,
    Report,
}

impl Stage {
    /// Name used in log lines and progress events.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Analysis => "analysis",
            Stage::Report => "report",
        }
    }

    fn failure(&self, detail: String) -> DocsightError {
        match self {
            Stage::Analysis => DocsightError::AnalysisStage { detail },
            Stage::Report => DocsightError::ReportStage { detail },
        }
    }

    fn timeout(&self, secs: u64) -> DocsightError {
        match self {
            Stage::Analysis => DocsightError::AnalysisTimeout { secs },
            Stage::Report => DocsightError::ReportTimeout { secs },
        }
    }
}

/// Stage 1: send the full image bundle to the vision model.
///
/// ## Message layout
///
/// 1. **System message** — the analyzer prompt (or caller override)
/// 2. **User message** — the instruction text (guidance appended verbatim)
///    with every image of the run attached in assembled order
///
/// The response structure is not validated beyond non-emptiness; the text
/// is handed to stage 2 exactly as returned.
pub async fn analyze(
    provider: &Arc<dyn LLMProvider>,
    context: &AnalysisContext,
    config: &RunConfig,
) -> Result<AnalysisResult, DocsightError> {
    let system = config
        .analyzer_prompt
        .as_deref()
        .unwrap_or(prompts::ANALYZER_SYSTEM_PROMPT);
    let request = prompts::analysis_request(context.guidance.as_deref(), context.images.len());
    let images: Vec<ImageData> = context.images.iter().map(|i| i.data.clone()).collect();

    let messages = vec![
        ChatMessage::system(system),
        ChatMessage::user_with_images(request, images),
    ];

    let (text, usage) = call_stage(provider, &messages, config, Stage::Analysis).await?;
    Ok(AnalysisResult { text, usage })
}

/// Stage 2: turn the analysis findings into a formatted report.
///
/// Text-only call; the findings are passed verbatim, never re-fetched or
/// cached from a prior run, and the same optional guidance rides along
/// for tone and emphasis hints.
pub async fn generate_report(
    provider: &Arc<dyn LLMProvider>,
    analysis: &AnalysisResult,
    guidance: Option<&str>,
    config: &RunConfig,
) -> Result<Report, DocsightError> {
    let system = config
        .reporter_prompt
        .clone()
        .unwrap_or_else(|| prompts::reporter_system_prompt(config.format));
    let request = prompts::report_request(&analysis.text, guidance, config.format);

    let messages = vec![ChatMessage::system(system), ChatMessage::user(request)];

    let (body, usage) = call_stage(provider, &messages, config, Stage::Report).await?;
    Ok(Report {
        format: config.format,
        body,
        usage,
    })
}

/// Drive one stage call with timeout, retries, and backoff.
///
/// Exactly one call is in flight at any time; concurrency is never used
/// across or within stages.
async fn call_stage(
    provider: &Arc<dyn LLMProvider>,
    messages: &[ChatMessage],
    config: &RunConfig,
    stage: Stage,
) -> Result<(String, StageUsage), DocsightError> {
    let options = build_options(config);
    let start = Instant::now();
    let deadline = Duration::from_secs(config.api_timeout_secs);

    let mut last_err: Option<String> = None;
    let mut last_was_timeout = false;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "{} stage: retry {}/{} after {}ms",
                stage.name(),
                attempt,
                config.max_retries,
                backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(deadline, provider.chat(messages, Some(&options))).await {
            Err(_elapsed) => {
                warn!(
                    "{} stage: attempt {} timed out after {}s",
                    stage.name(),
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(format!("timed out after {}s", config.api_timeout_secs));
                last_was_timeout = true;
            }
            Ok(Err(e)) => {
                let err_msg = format!("{}", e);
                warn!(
                    "{} stage: attempt {} failed — {}",
                    stage.name(),
                    attempt + 1,
                    err_msg
                );
                last_err = Some(err_msg);
                last_was_timeout = false;
            }
            Ok(Ok(response)) => {
                if response.content.trim().is_empty() {
                    warn!("{} stage: attempt {} returned an empty response", stage.name(), attempt + 1);
                    last_err = Some("empty response".to_string());
                    last_was_timeout = false;
                    continue;
                }

                let duration = start.elapsed();
                debug!(
                    "{} stage: {} input tokens, {} output tokens, {:?}",
                    stage.name(),
                    response.prompt_tokens,
                    response.completion_tokens,
                    duration
                );

                let usage = StageUsage {
                    input_tokens: response.prompt_tokens as u64,
                    output_tokens: response.completion_tokens as u64,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt as u8,
                };
                return Ok((response.content, usage));
            }
        }
    }

    // All retries exhausted
    if last_was_timeout {
        Err(stage.timeout(config.api_timeout_secs))
    } else {
        Err(stage.failure(
            last_err.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

/// Build `CompletionOptions` from the run config.
fn build_options(config: &RunConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = RunConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(4096));
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Analysis.name(), "analysis");
        assert_eq!(Stage::Report.name(), "report");
    }

    #[test]
    fn stage_errors_are_attributed() {
        let e = Stage::Analysis.failure("boom".into());
        assert!(matches!(e, DocsightError::AnalysisStage { .. }));
        let e = Stage::Report.failure("boom".into());
        assert!(matches!(e, DocsightError::ReportStage { .. }));
        let e = Stage::Report.timeout(60);
        assert!(matches!(e, DocsightError::ReportTimeout { secs: 60 }));
    }
}
