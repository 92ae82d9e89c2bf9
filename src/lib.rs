//! # scanao
//!
//! Analyse DCE tender dossiers ("Dossier de Consultation des Entreprises")
//! with an LLM and produce a scored, paginated PDF report.
//!
//! ## Why this crate?
//!
//! Reading a construction-bid dossier is an afternoon of cross-checking
//! clauses spread over several PDFs. scanao extracts the embedded text,
//! sends it to a model behind a fixed analyst prompt, pulls the `SCORE_IA`
//! go/no-go score back out of the answer, and lays the structured report out
//! as a downloadable PDF with a color-banded score banner.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF dossier(s)
//!  │
//!  ├─ 1. Input    validate paths and %PDF magic bytes
//!  ├─ 2. Extract  embedded text per file (pdf-extract, spawn_blocking)
//!  ├─ 3. Prompt   analyst instructions + "--- DOC: name ---" corpus
//!  ├─ 4. Model    Gemini generateContent with retry/backoff
//!  ├─ 5. Score    first SCORE_IA marker → value + band (high/mid/low)
//!  └─ 6. Report   paginated A4 PDF: banner, headings, bullets, footers
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scanao::{analyze, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY from the environment
//!     let config = AnalysisConfig::default();
//!     let output = analyze(&["dossier/rc.pdf", "dossier/cctp.pdf"], &config).await?;
//!     println!("GO/NOGO : {}", output.score_label);
//!     std::fs::write("Rapport_ScanAO.pdf", &output.pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scanao` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! scanao = { version = "0.4", default-features = false }
//! ```
//!
//! ## Failure policy
//!
//! Per-file extraction failures are recorded and skipped; the report text's
//! markup never errors (unclassifiable lines render as plain paragraphs,
//! unencodable characters become `?`); a missing logo is omitted. Only an
//! empty corpus, a missing API key, or a model dead after retries fail the
//! request — as one opaque error.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod score;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_text, analyze_to_file, extract_text};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, LogoSource, ReportOptions};
pub use error::{DocumentError, RenderError, ScanAoError};
pub use output::{AnalysisOutput, AnalysisStats, DocumentResult, ExtractionOutput};
pub use pipeline::llm::{GeminiClient, LlmError, ModelResponse, ReportModel};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{ReportRenderer, RenderedReport};
pub use score::{extract_score, format_score_label, ScoreBand};
