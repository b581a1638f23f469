//! Configuration types for a document-analysis run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to thread the configuration through the pipeline stages, serialise the
//! interesting parts for logging, and diff two runs to understand why
//! their reports differ.

use crate::error::DocsightError;
use crate::progress::ProgressCallback;
use crate::telemetry::TracingCredentials;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a full analysis run.
///
/// Built via [`RunConfig::builder()`] or using [`RunConfig::default()`].
///
/// # Example
/// ```rust
/// use docsight::{ReportFormat, RunConfig};
///
/// let config = RunConfig::builder()
///     .documents_path("documents")
///     .output_path("output")
///     .guidance("focus on costs")
///     .format(ReportFormat::Html)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Directory scanned (non-recursively) for input files. Default: `documents`.
    pub documents_path: PathBuf,

    /// Directory the report is written into (created if absent). Default: `output`.
    pub output_path: PathBuf,

    /// Optional free-text guidance forwarded verbatim to the analysis stage.
    pub guidance: Option<String>,

    /// Output format of the generated report. Default: Markdown.
    pub format: ReportFormat,

    /// Rendering DPI used when rasterising PDF pages. Range: 72–400. Default: 200.
    ///
    /// 200 DPI keeps small print legible to the vision model while the
    /// per-page PNG stays well below typical API upload limits. Lower it
    /// to 96–150 for slide decks and posters where file size matters more
    /// than pixel density.
    pub dpi: u32,

    /// Maximum rendered page dimension (width or height) in pixels. Default: 2000.
    ///
    /// A safety cap independent of DPI: a 200-DPI render of an A0 poster
    /// would otherwise produce a 13 000 × 18 000 px image and exhaust
    /// memory. Either dimension is capped, the other scales proportionally.
    pub max_rendered_pixels: u32,

    /// What to do when one PDF fails to convert (or one image is unreadable).
    /// Default: [`ConversionFailurePolicy::SkipAndWarn`].
    pub on_conversion_error: ConversionFailurePolicy,

    /// Persist each rendered PDF page as `{output}/pages/{stem}_page_{n}.png`.
    /// Default: false.
    ///
    /// Off by default because the pages are only an intermediate artifact;
    /// turn it on to audit exactly what the analysis stage saw.
    pub keep_page_images: bool,

    /// LLM model identifier, e.g. "gpt-4.1-mini", "claude-sonnet-4-20250514".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected from
    /// environment API keys.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for both stage completions. Default: 0.2.
    ///
    /// Low temperature keeps the analysis faithful to what is actually in
    /// the images; the report stage tolerates a little more creativity but
    /// not enough to justify a second knob.
    pub temperature: f32,

    /// Maximum tokens either stage may generate. Default: 4096.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient stage failure. Default: 3.
    ///
    /// Most 5xx and timeout errors are transient. Permanent errors (bad
    /// API key, 400) surface immediately as stage errors after the retry
    /// budget is spent.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Per-stage LLM call timeout in seconds. Default: 120.
    ///
    /// The analysis stage carries every image of the run in one request,
    /// so its latency grows with the input set; 120 s covers a few dozen
    /// pages with comfortable margin.
    pub api_timeout_secs: u64,

    /// Custom analyzer system prompt. If None, uses the built-in default.
    pub analyzer_prompt: Option<String>,

    /// Custom report-generator system prompt. If None, uses the built-in
    /// default for the configured [`ReportFormat`].
    pub reporter_prompt: Option<String>,

    /// Tracing-backend credentials, resolved once at startup.
    ///
    /// Absence degrades gracefully: the run proceeds without tracing.
    pub tracing: Option<TracingCredentials>,

    /// Optional progress callback receiving run events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            documents_path: PathBuf::from("documents"),
            output_path: PathBuf::from("output"),
            guidance: None,
            format: ReportFormat::default(),
            dpi: 200,
            max_rendered_pixels: 2000,
            on_conversion_error: ConversionFailurePolicy::default(),
            keep_page_images: false,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 120,
            analyzer_prompt: None,
            reporter_prompt: None,
            tracing: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("documents_path", &self.documents_path)
            .field("output_path", &self.output_path)
            .field("guidance", &self.guidance)
            .field("format", &self.format)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("on_conversion_error", &self.on_conversion_error)
            .field("keep_page_images", &self.keep_page_images)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("tracing", &self.tracing)
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RunConfig`].
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn documents_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.documents_path = path.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn guidance(mut self, text: impl Into<String>) -> Self {
        self.config.guidance = Some(text.into());
        self
    }

    pub fn format(mut self, format: ReportFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn on_conversion_error(mut self, policy: ConversionFailurePolicy) -> Self {
        self.config.on_conversion_error = policy;
        self
    }

    pub fn keep_page_images(mut self, v: bool) -> Self {
        self.config.keep_page_images = v;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn analyzer_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.analyzer_prompt = Some(prompt.into());
        self
    }

    pub fn reporter_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.reporter_prompt = Some(prompt.into());
        self
    }

    pub fn tracing(mut self, credentials: TracingCredentials) -> Self {
        self.config.tracing = Some(credentials);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// DPI is clamped into the 72–400 range rather than rejected; hard
    /// errors are reserved for values with no sensible interpretation.
    pub fn build(mut self) -> Result<RunConfig, DocsightError> {
        self.config.dpi = self.config.dpi.clamp(72, 400);
        let c = &self.config;
        if c.api_timeout_secs == 0 {
            return Err(DocsightError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.documents_path.as_os_str().is_empty() {
            return Err(DocsightError::InvalidConfig(
                "documents_path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output format of the generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportFormat {
    /// GitHub-flavoured Markdown. (default)
    #[default]
    Markdown,
    /// Self-contained HTML document.
    Html,
}

impl ReportFormat {
    /// File extension used by the report writer.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }

    /// Human-readable name, used in prompts and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "Markdown",
            ReportFormat::Html => "HTML",
        }
    }
}

/// What to do when a single file fails to convert.
///
/// Skip-and-warn is the default so one bad file does not block the whole
/// batch, consistent with how unsupported extensions are handled. Abort is
/// for callers that would rather fail loudly than report on a partial set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConversionFailurePolicy {
    /// Exclude the offending file, log a warning, continue. (default)
    #[default]
    SkipAndWarn,
    /// Abort the run with [`crate::error::DocsightError::Conversion`].
    Abort,
}
