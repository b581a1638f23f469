//! CLI binary for docsight.
//!
//! A thin shim over the library crate that maps CLI flags to `RunConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docsight::{
    load_credentials, ConversionFailurePolicy, ReportFormat, RunConfig, RunProgressCallback, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a steady spinner whose message tracks the current
/// pipeline phase, with per-file log lines printed above it.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning documents…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RunProgressCallback for CliProgress {
    fn on_scan_complete(&self, processable: usize, skipped: usize) {
        self.bar.set_prefix("Converting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "{processable} file(s) to analyze, {skipped} skipped"
            ))
        ));
    }

    fn on_convert_start(&self, name: &str) {
        self.bar.set_message(format!("rendering {name}"));
    }

    fn on_convert_complete(&self, name: &str, pages: usize) {
        self.bar.println(format!(
            "  {} {:<32} {}",
            green("✓"),
            name,
            dim(&format!("{pages} page(s)"))
        ));
    }

    fn on_convert_error(&self, name: &str, detail: &str) {
        let msg = truncate_display(detail, 79);
        self.bar
            .println(format!("  {} {:<32} {}", red("✗"), name, red(&msg)));
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(match stage {
            Stage::Analysis => "Analyzing",
            Stage::Report => "Reporting",
        });
        self.bar
            .set_message(format!("{} stage running…", stage.name()));
    }

    fn on_stage_complete(&self, stage: Stage, chars: usize) {
        self.bar.println(format!(
            "  {} {:<32} {}",
            green("✓"),
            format!("{} stage", stage.name()),
            dim(&format!("{chars} chars"))
        ));
    }

    fn on_run_complete(&self, _report_chars: usize) {
        self.bar.finish_and_clear();
    }
}

/// Truncate a message for single-line display, adding an ellipsis.
///
/// Error messages embed file paths, which may be non-ASCII; the cut
/// point backs up to the nearest char boundary so a multi-byte character
/// straddling `max_bytes` never causes a slice panic.
fn truncate_display(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut cut = max_bytes;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\u{2026}", &s[..cut])
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze ./documents, write ./output/report.md
  docsight

  # Guide the analysis
  docsight --context "focus on costs and quarterly trends"

  # Different folders, HTML output
  docsight --documents-path ./scans --output-path ./reports --format html

  # Pin provider and model
  docsight --provider anthropic --model claude-sonnet-4-20250514

  # Keep the rendered PDF pages next to the report
  docsight --keep-page-images

  # Fail instead of skipping when a PDF cannot be converted
  docsight --on-conversion-error abort

  # Machine-readable summary
  docsight --json > run.json

SUPPORTED INPUT FORMATS:
  Images       jpg, jpeg, png, gif, webp  (sent to the model as-is)
  Documents    pdf                        (rendered one PNG per page)
  Anything else is skipped with a warning.

OUTPUT:
  Exactly one file per run: <output-path>/report.md or report.html,
  overwriting the previous run's report. The write is atomic — a failed
  run never leaves a partial file.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  DOCSIGHT_LLM_PROVIDER   Override provider (openai, anthropic, gemini, ollama)
  DOCSIGHT_MODEL          Override model ID

CREDENTIALS FILE (optional, for the tracing backend):
  [langfuse]
  langfuse_public_key = pk-lf-...
  langfuse_secret_key = sk-lf-...
  langfuse_host = https://cloud.langfuse.com

  Missing file or keys simply disable tracing; the run never fails
  because tracing is unavailable.
"#;

/// Turn a folder of images and PDFs into an LLM-generated insight report.
#[derive(Parser, Debug)]
#[command(
    name = "docsight",
    version,
    about = "Turn a folder of images and PDFs into an LLM-generated insight report",
    long_about = "Scan a documents folder, render PDFs to page images, have a vision model \
analyze the whole set, and write a Markdown or HTML report of the findings. Supports OpenAI, \
Anthropic, Google Gemini, and any OpenAI-compatible endpoint.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Free-text guidance passed verbatim into the analysis stage.
    #[arg(long, env = "DOCSIGHT_CONTEXT")]
    context: Option<String>,

    /// Source directory for input files.
    #[arg(long, env = "DOCSIGHT_DOCUMENTS_PATH", default_value = "documents")]
    documents_path: PathBuf,

    /// Destination directory for the generated report.
    #[arg(long, env = "DOCSIGHT_OUTPUT_PATH", default_value = "output")]
    output_path: PathBuf,

    /// Report format.
    #[arg(long, env = "DOCSIGHT_FORMAT", value_enum, default_value = "markdown")]
    format: FormatArg,

    /// LLM model ID (e.g. gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "DOCSIGHT_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(
        long,
        env = "DOCSIGHT_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set."
    )]
    provider: Option<String>,

    /// PDF rendering DPI (72–400).
    #[arg(long, env = "DOCSIGHT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Policy when one file fails to convert.
    #[arg(long, env = "DOCSIGHT_ON_CONVERSION_ERROR", value_enum, default_value = "skip")]
    on_conversion_error: PolicyArg,

    /// Persist rendered PDF pages under <output-path>/pages/.
    #[arg(long, env = "DOCSIGHT_KEEP_PAGE_IMAGES")]
    keep_page_images: bool,

    /// Properties file with tracing-backend credentials.
    #[arg(
        long,
        env = "DOCSIGHT_CREDENTIALS_FILE",
        default_value = "credentials.properties"
    )]
    credentials_file: PathBuf,

    /// Per-stage LLM call timeout in seconds.
    #[arg(long, env = "DOCSIGHT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Retries per stage on LLM failure.
    #[arg(long, env = "DOCSIGHT_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Max LLM output tokens per stage.
    #[arg(long, env = "DOCSIGHT_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "DOCSIGHT_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Print the full run output (report, stats, skips) as JSON to stdout.
    #[arg(long, env = "DOCSIGHT_JSON")]
    json: bool,

    /// Disable the progress display.
    #[arg(long, env = "DOCSIGHT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSIGHT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCSIGHT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Markdown,
    Html,
}

impl From<FormatArg> for ReportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Html => ReportFormat::Html,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PolicyArg {
    Skip,
    Abort,
}

impl From<PolicyArg> for ConversionFailurePolicy {
    fn from(v: PolicyArg) -> Self {
        match v {
            PolicyArg::Skip => ConversionFailurePolicy::SkipAndWarn,
            PolicyArg::Abort => ConversionFailurePolicy::Abort,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress display is
    // active; the spinner provides all the feedback that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Tracing credentials (optional, degrade gracefully) ───────────────
    let credentials = load_credentials(&cli.credentials_file);
    if credentials.is_complete() && !cli.quiet {
        eprintln!("{}", dim("tracing backend configured"));
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgress::new);

    let mut builder = RunConfig::builder()
        .documents_path(&cli.documents_path)
        .output_path(&cli.output_path)
        .format(cli.format.clone().into())
        .dpi(cli.dpi)
        .on_conversion_error(cli.on_conversion_error.clone().into())
        .keep_page_images(cli.keep_page_images)
        .api_timeout_secs(cli.api_timeout)
        .max_retries(cli.max_retries)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .tracing(credentials);

    if let Some(ref context) = cli.context {
        builder = builder.guidance(context);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as docsight::ProgressCallback);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let result = docsight::run_to_file(&config).await;

    if let Some(ref cb) = progress {
        cb.finish();
    }

    let (path, output) = result.context("Run failed")?;

    if cli.json {
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialise run output")?;
        println!("{json}");
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} images analyzed, {} skipped  {}ms  →  {}",
            green("✔"),
            output.stats.images_analyzed,
            output.stats.skipped_files,
            output.stats.total_duration_ms,
            bold(&path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_display_passes_short_messages_through() {
        assert_eq!(truncate_display("corrupt xref table", 79), "corrupt xref table");
    }

    #[test]
    fn truncate_display_cuts_long_ascii_messages() {
        let long = "x".repeat(200);
        let msg = truncate_display(&long, 79);
        assert_eq!(msg.chars().count(), 80);
        assert!(msg.ends_with('\u{2026}'));
    }

    #[test]
    fn truncate_display_backs_up_over_multibyte_boundary() {
        // 'é' is 2 bytes and straddles the cut point; a byte slice at 79
        // would panic with "not a char boundary".
        let detail = format!("{}é and more detail after the boundary", "x".repeat(78));
        assert!(!detail.is_char_boundary(79));

        let msg = truncate_display(&detail, 79);
        assert!(msg.ends_with('\u{2026}'));
        assert!(msg.starts_with(&"x".repeat(78)));
        assert!(!msg.contains('é'));
    }

    #[test]
    fn truncate_display_keeps_multibyte_ending_on_the_boundary() {
        // Here 'é' ends exactly at byte 79, so it survives the cut.
        let detail = format!("{}é and more", "x".repeat(77));
        let msg = truncate_display(&detail, 79);
        assert!(msg.contains('é'));
        assert!(msg.ends_with('\u{2026}'));
    }
}
