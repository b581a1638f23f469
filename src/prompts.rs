//! System prompts for the two agent stages.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing what the analyzer looks for or
//!    what sections the report must contain requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can import and inspect prompts directly
//!    without spinning up a real model, making prompt regressions easy to catch.
//!
//! Callers can override either stage via
//! [`crate::config::RunConfig::analyzer_prompt`] /
//! [`crate::config::RunConfig::reporter_prompt`]; the constants here are
//! used only when no override is provided.

use crate::config::ReportFormat;

/// Default system prompt for the analysis stage.
pub const ANALYZER_SYSTEM_PROMPT: &str = r#"You are an image and document analysis expert. Analyze the provided image(s) and produce:

1. A summary of what each image or document page contains
2. Insights on any trends or themes you observe across the set
3. Notable metrics, figures, or anomalies worth surfacing

The information will be handed to a report-generation agent. Present it in
a well-structured format that is easy to consume and process. Do not
generate the report yourself; only provide the analysis."#;

/// Default system prompt for the report-generation stage.
///
/// Parameterised by the target format so Markdown and HTML runs get
/// format-appropriate structural instructions.
pub fn reporter_system_prompt(format: ReportFormat) -> String {
    let format_rules = match format {
        ReportFormat::Markdown => {
            "Write GitHub-flavoured Markdown. Use a single # title, ## section \
headings, and GFM tables for any tabular data. Output ONLY the Markdown \
document; do not wrap it in code fences."
        }
        ReportFormat::Html => {
            "Write a single self-contained HTML document with <html>, <head> \
(including a <title>), and <body>. Use semantic headings (<h1>, <h2>) and \
<table> for tabular data. Inline any styling. Output ONLY the HTML document; \
do not wrap it in code fences."
        }
    };

    format!(
        r#"You are a {label} report generation expert. Generate a report based on the provided analysis of the image(s). You will be given:

1. A summary of the analysis
2. Insights on any trends or themes

The report must contain a title, an executive summary, and a section per
document or insight. {format_rules}"#,
        label = format.label()
    )
}

/// Build the user message for the analysis stage.
///
/// The guidance string is appended verbatim so the caller's exact wording
/// reaches the model unmodified.
pub fn analysis_request(guidance: Option<&str>, image_count: usize) -> String {
    let mut text = format!(
        "Analyze the {image_count} provided image(s) and report your findings, \
insights, and any notable trends or metrics."
    );
    if let Some(guidance) = guidance {
        text.push_str("\n\nAdditional context for analysis: ");
        text.push_str(guidance);
    }
    text
}

/// Build the user message for the report-generation stage.
///
/// Carries the stage-1 findings verbatim plus the same optional guidance
/// for tone and emphasis hints.
pub fn report_request(analysis: &str, guidance: Option<&str>, format: ReportFormat) -> String {
    let mut text = format!(
        "Generate a {} report from the following analysis:\n\n{analysis}",
        format.label()
    );
    if let Some(guidance) = guidance {
        text.push_str("\n\nAdditional context for the report: ");
        text.push_str(guidance);
    }
    text
}
