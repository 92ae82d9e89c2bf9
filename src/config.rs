//! Configuration types for dossier analysis.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks and to diff two runs to understand
//! why their reports differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::ScanAoError;
use crate::pipeline::llm::ReportModel;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one analysis request.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use scanao::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gemini-1.5-flash")
///     .max_retries(5)
///     .title("Rapport d'Analyse — Agence Sud")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Gemini model identifier. Default: `gemini-1.5-flash`.
    pub model: String,

    /// API key override. If `None`, the `GEMINI_API_KEY` environment
    /// variable is read when the client is built.
    pub api_key: Option<String>,

    /// Pre-constructed model backend. Takes precedence over `model` +
    /// `api_key`. Useful in tests or when the caller needs custom
    /// middleware (caching, rate-limiting).
    pub provider: Option<Arc<dyn ReportModel>>,

    /// Sampling temperature. Default: 0.0.
    ///
    /// The analysis must be reproducible dossier-to-dossier; creativity
    /// only makes the score drift between runs on identical input.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4096.
    ///
    /// A full four-section report on a large dossier runs 1 500–2 500
    /// output tokens; 4 096 leaves headroom without letting a runaway
    /// response bill for ten times the useful length.
    pub max_output_tokens: usize,

    /// Maximum retry attempts on a transient model failure. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-model-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Number of dossier files extracted concurrently. Default: 4.
    ///
    /// Extraction is CPU-bound and runs on the blocking thread pool; a
    /// small fan-out keeps multi-file dossiers fast without starving the
    /// pool for other work.
    pub concurrency: usize,

    /// Custom instruction block. If `None`, uses
    /// [`crate::prompts::ANALYST_PROMPT`].
    pub system_prompt: Option<String>,

    /// Report presentation options.
    pub report: ReportOptions,

    /// Optional progress callback for per-stage events.
    pub progress_callback: Option<ProgressCallback>,
}

/// Presentation options for the rendered PDF report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Header title printed on every page. Default: `Rapport d'Analyse ScanAO`.
    pub title: String,

    /// Optional logo shown on the first page.
    pub logo: Option<LogoSource>,

    /// Remove decorative symbols (the prompt's section emoji) before
    /// rendering instead of printing them as `?`. Default: true.
    pub strip_decorations: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Rapport d'Analyse ScanAO".to_string(),
            logo: None,
            strip_decorations: true,
        }
    }
}

/// Where the first-page logo comes from.
#[derive(Debug, Clone)]
pub enum LogoSource {
    /// A local image file (PNG or JPEG).
    Path(PathBuf),
    /// An HTTP/HTTPS URL, fetched into a temp dir at render time.
    Url(String),
}

impl LogoSource {
    /// Interpret a CLI-style string: URLs stay URLs, anything else is a path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            LogoSource::Url(s.to_string())
        } else {
            LogoSource::Path(PathBuf::from(s))
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            provider: None,
            temperature: 0.0,
            max_output_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 120,
            concurrency: 4,
            system_prompt: None,
            report: ReportOptions::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider", &self.provider.as_ref().map(|_| "<dyn ReportModel>"))
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("concurrency", &self.concurrency)
            .field("report", &self.report)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ReportModel>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
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

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.report.title = title.into();
        self
    }

    pub fn logo(mut self, source: LogoSource) -> Self {
        self.config.report.logo = Some(source);
        self
    }

    pub fn strip_decorations(mut self, v: bool) -> Self {
        self.config.report.strip_decorations = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, ScanAoError> {
        let c = &self.config;
        if c.model.is_empty() {
            return Err(ScanAoError::InvalidConfig("Model id must not be empty".into()));
        }
        if c.concurrency == 0 {
            return Err(ScanAoError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.max_output_tokens == 0 {
            return Err(ScanAoError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
