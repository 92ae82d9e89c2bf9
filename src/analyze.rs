//! Eager (full-request) analysis entry points.
//!
//! One request is one pass through the pipeline: validate inputs, extract
//! text, assemble the prompt, call the model once, pull the score back out,
//! render the PDF. There is no partial result above the per-file level —
//! a dead model or an empty corpus fails the whole request with a single
//! opaque error, per the product contract.

use crate::config::AnalysisConfig;
use crate::error::ScanAoError;
use crate::output::{AnalysisOutput, AnalysisStats, ExtractionOutput};
use crate::pipeline::extract::{self, ExtractedDocument};
use crate::pipeline::input;
use crate::pipeline::llm::{self, GeminiClient, ReportModel};
use crate::prompts;
use crate::report::{logo, ReportRenderer};
use crate::score::{extract_score, format_score_label, ScoreBand};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Analyse a set of dossier PDF files.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `inputs` — local paths to the dossier's PDF files
/// * `config` — analysis configuration
///
/// # Returns
/// `Ok(AnalysisOutput)` even if some files failed extraction (check
/// `output.documents`); the analysis runs on whatever text was recovered.
///
/// # Errors
/// Returns `Err(ScanAoError)` only for fatal conditions: bad input paths,
/// nothing extractable at all, no model configured, model dead after
/// retries, or report assembly failure.
pub async fn analyze<P: AsRef<Path>>(
    inputs: &[P],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, ScanAoError> {
    let total_start = Instant::now();

    // ── Step 1: Validate inputs ──────────────────────────────────────────
    let files = input::resolve_inputs(inputs)?;
    info!("Starting analysis: {} dossier file(s)", files.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start(files.len());
    }

    // ── Step 2: Extract text ─────────────────────────────────────────────
    let extract_start = Instant::now();
    let documents = extract::extract_documents(
        &files,
        config.concurrency,
        config.progress_callback.as_deref(),
    )
    .await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    let corpus = extract::build_corpus(&documents);
    if corpus.trim().is_empty() {
        return Err(ScanAoError::AllDocumentsEmpty {
            total: files.len(),
        });
    }

    run_analysis(corpus, documents, extract_duration_ms, total_start, config).await
}

/// Analyse already-extracted dossier text.
///
/// Same pipeline as [`analyze`], minus file validation and extraction.
/// Useful when the text comes from another extraction layer (or from tests
/// exercising the model and renderer without fixture PDFs).
pub async fn analyze_text(
    corpus: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, ScanAoError> {
    let total_start = Instant::now();
    if corpus.trim().is_empty() {
        return Err(ScanAoError::AllDocumentsEmpty { total: 0 });
    }
    run_analysis(corpus.to_string(), Vec::new(), 0, total_start, config).await
}

/// Analyse dossier files and write the PDF report to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn analyze_to_file<P: AsRef<Path>>(
    inputs: &[P],
    output_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, ScanAoError> {
    let output = analyze(inputs, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ScanAoError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &output.pdf)
        .await
        .map_err(|e| ScanAoError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ScanAoError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output)
}

/// Extract text only — no model call, no API key needed.
pub async fn extract_text<P: AsRef<Path>>(
    inputs: &[P],
    config: &AnalysisConfig,
) -> Result<ExtractionOutput, ScanAoError> {
    let files = input::resolve_inputs(inputs)?;
    let documents = extract::extract_documents(
        &files,
        config.concurrency,
        config.progress_callback.as_deref(),
    )
    .await?;
    let corpus = extract::build_corpus(&documents);
    Ok(ExtractionOutput {
        documents: documents.into_iter().map(|d| d.result).collect(),
        corpus,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Steps 3–6: prompt, model, score, report.
async fn run_analysis(
    corpus: String,
    documents: Vec<ExtractedDocument>,
    extract_duration_ms: u64,
    total_start: Instant,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, ScanAoError> {
    // ── Step 3: Assemble prompt ──────────────────────────────────────────
    let instructions = config
        .system_prompt
        .as_deref()
        .unwrap_or(prompts::ANALYST_PROMPT);
    let prompt = prompts::assemble_prompt(instructions, &corpus);
    debug!("Prompt assembled: {} chars", prompt.len());

    // ── Step 4: Call the model ───────────────────────────────────────────
    let model = resolve_model(config)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_model_start(prompt.len());
    }
    let llm_start = Instant::now();
    let response = llm::generate_report(&model, &prompt, config).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    info!(
        "Model '{}' answered: {} chars in {}ms",
        model.name(),
        response.text.len(),
        llm_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_model_complete(response.text.len());
    }

    // ── Step 5: Extract the score ────────────────────────────────────────
    let score = extract_score(&response.text);
    let score_label = format_score_label(score);
    let band = ScoreBand::from_score(score);
    debug!("Score: {} ({:?})", score, band);

    // ── Step 6: Render the report ────────────────────────────────────────
    let render_start = Instant::now();
    let logo = logo::resolve_logo(config.report.logo.as_ref(), config.api_timeout_secs).await;
    let renderer = ReportRenderer::with_logo(&config.report, logo);
    let rendered = renderer.render(&response.text, &score_label, score)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    if let Some(ref cb) = config.progress_callback {
        cb.on_report_rendered(rendered.pages, rendered.bytes.len());
    }

    // ── Stats ────────────────────────────────────────────────────────────
    let total_documents = documents.len();
    let extracted = documents.iter().filter(|d| d.result.contributed()).count();
    let stats = AnalysisStats {
        total_documents,
        extracted_documents: extracted,
        failed_documents: total_documents - extracted,
        prompt_chars: prompt.len(),
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        extract_duration_ms,
        llm_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Analysis complete: score {} on {} file(s), {}ms total",
        score_label, total_documents, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(extracted, total_documents);
    }

    Ok(AnalysisOutput {
        report_text: response.text,
        score,
        score_label,
        band,
        pdf: rendered.bytes,
        pages: rendered.pages,
        documents: documents.into_iter().map(|d| d.result).collect(),
        stats,
    })
}

/// Resolve the model backend, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    the backend entirely; used as-is. This is the test seam.
/// 2. **Configured key** (`config.api_key`) — a Gemini client on the
///    configured model.
/// 3. **Environment** — `GEMINI_API_KEY`, the zero-config path.
fn resolve_model(config: &AnalysisConfig) -> Result<Arc<dyn ReportModel>, ScanAoError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let api_key = config
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ScanAoError::ProviderNotConfigured {
            hint: "Set GEMINI_API_KEY, or pass api_key / a pre-built provider in AnalysisConfig."
                .to_string(),
        })?;

    let client = GeminiClient::new(
        api_key,
        config.model.clone(),
        config.temperature,
        config.max_output_tokens,
        config.api_timeout_secs,
    )?;
    Ok(Arc::new(client))
}
