//! CLI binary for scanao.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scanao::{
    analyze, analyze_to_file, extract_text, AnalysisConfig, AnalysisProgressCallback, LogoSource,
    ProgressCallback, ScoreBand,
};
use std::io::{self, Write};
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

/// The web app's score badge, re-expressed for a terminal.
fn verdict_line(band: ScoreBand, label: &str) -> String {
    let text = format!("GO/NOGO : {label}");
    match band {
        ScoreBand::High => green(&bold(&text)),
        ScoreBand::Mid => yellow(&bold(&text)),
        ScoreBand::Low => red(&bold(&text)),
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a bar over the extraction phase, then a steady
/// spinner while the model thinks.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Lecture");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_analysis_start(&self, total_documents: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:30.green/238}] {pos}/{len} fichiers  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_document_complete(&self, _index: usize, total: usize, chars: usize) {
        self.bar.inc(1);
        if self.bar.position() == total as u64 {
            self.bar.set_message(String::new());
        }
        let _ = chars;
    }

    fn on_document_error(&self, _index: usize, _total: usize, error: &str) {
        self.bar.println(format!("  {} {}", red("✗"), error));
        self.bar.inc(1);
    }

    fn on_model_start(&self, _prompt_chars: usize) {
        self.bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        self.bar.set_prefix("Analyse IA");
        self.bar.set_message("en cours…");
    }

    fn on_model_complete(&self, report_chars: usize) {
        self.bar
            .println(format!("  {} rapport reçu ({report_chars} caractères)", green("✓")));
    }

    fn on_report_rendered(&self, pages: usize, _bytes: usize) {
        self.bar
            .println(format!("  {} PDF généré ({pages} page(s))", green("✓")));
    }

    fn on_analysis_complete(&self, _extracted: usize, _total: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse a dossier and write Rapport_ScanAO.pdf
  scanao rc.pdf cctp.pdf

  # Choose the output file and a custom report title
  scanao dossier/*.pdf -o rapport.pdf --title "Rapport — Agence Sud"

  # Report text on stdout, no PDF
  scanao --text cctp.pdf

  # Structured JSON (score, band, stats, per-file results)
  scanao --json cctp.pdf

  # Extraction only, no API key needed
  scanao --extract-only cctp.pdf

  # First-page logo from a file or URL
  scanao --logo logo.png cctp.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY   Google Gemini API key (required unless --extract-only)
  SCANAO_MODEL     Override the model id (default: gemini-1.5-flash)
  SCANAO_LOGO      Default logo path or URL
  SCANAO_TITLE     Default report title

SETUP:
  1. Set API key:   export GEMINI_API_KEY=...
  2. Analyse:       scanao dossier/*.pdf -o rapport.pdf
"#;

/// Analyse DCE tender dossiers and generate a scored PDF report.
#[derive(Parser, Debug)]
#[command(
    name = "scanao",
    version,
    about = "Analyse DCE tender dossiers with an LLM and generate a scored PDF report",
    long_about = "Extract the text of a construction-bid dossier (one or more PDFs), run it \
through a fixed analyst prompt on Gemini, and produce a paginated PDF report with a \
color-banded GO/NOGO score.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files of the dossier, analysed together as one request.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write the PDF report to this file.
    #[arg(short, long, env = "SCANAO_OUTPUT", default_value = "Rapport_ScanAO.pdf")]
    output: PathBuf,

    /// Print the report text to stdout instead of writing a PDF.
    #[arg(long)]
    text: bool,

    /// Output structured JSON (score, band, stats) instead of a PDF.
    #[arg(long)]
    json: bool,

    /// Extract and print the dossier text only — no model call, no API key.
    #[arg(long)]
    extract_only: bool,

    /// Gemini model id.
    #[arg(long, env = "SCANAO_MODEL", default_value = "gemini-1.5-flash")]
    model: String,

    /// API key override (else the GEMINI_API_KEY environment variable).
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// First-page logo: image path or HTTP(S) URL.
    #[arg(long, env = "SCANAO_LOGO")]
    logo: Option<String>,

    /// Report title shown in the page header.
    #[arg(long, env = "SCANAO_TITLE")]
    title: Option<String>,

    /// Keep decorative emoji (rendered as '?') instead of stripping them.
    #[arg(long)]
    keep_decorations: bool,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// Max model output tokens.
    #[arg(long, default_value_t = 4096)]
    max_output_tokens: usize,

    /// Retries on transient model failure.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Per-model-call timeout in seconds.
    #[arg(long, default_value_t = 120)]
    api_timeout: u64,

    /// Files extracted concurrently.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the requested result.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.text;
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

    let config = build_config(&cli, show_progress)?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let extraction = extract_text(&cli.inputs, &config)
            .await
            .context("Extraction failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&extraction).context("Failed to serialise output")?
            );
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(extraction.corpus.as_bytes())
                .context("Failed to write to stdout")?;
            if !cli.quiet {
                let ok = extraction.documents.iter().filter(|d| d.contributed()).count();
                eprintln!(
                    "\n{} {}/{} fichier(s) extraits",
                    green("✔"),
                    ok,
                    extraction.documents.len()
                );
            }
        }
        return Ok(());
    }

    // ── Run the analysis ─────────────────────────────────────────────────
    if cli.text || cli.json {
        // Same pipeline, nothing written to disk.
        let output = analyze(&cli.inputs, &config)
            .await
            .context("Analysis failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?
            );
        } else {
            println!("{}", output.report_text);
            if !cli.quiet {
                eprintln!("{}", verdict_line(output.band, &output.score_label));
            }
        }
        return Ok(());
    }

    let output = analyze_to_file(&cli.inputs, &cli.output, &config)
        .await
        .context("Analysis failed")?;

    if !cli.quiet {
        eprintln!("{}", verdict_line(output.band, &output.score_label));
        eprintln!(
            "{}  {} page(s)  {}ms  →  {}",
            green("✔"),
            output.pages,
            output.stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        if output.stats.failed_documents > 0 {
            eprintln!(
                "{}  {}/{} fichier(s) sans texte exploitable",
                cyan("⚠"),
                output.stats.failed_documents,
                output.stats.total_documents,
            );
        }
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&output.stats.input_tokens.to_string()),
            dim(&output.stats.output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli, show_progress: bool) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder()
        .model(&cli.model)
        .temperature(cli.temperature)
        .max_output_tokens(cli.max_output_tokens)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .concurrency(cli.concurrency)
        .strip_decorations(!cli.keep_decorations);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title);
    }
    if let Some(ref logo) = cli.logo {
        builder = builder.logo(LogoSource::parse(logo));
    }
    if show_progress {
        let cb = CliProgressCallback::new();
        builder = builder.progress_callback(cb as ProgressCallback);
    }

    builder.build().context("Invalid configuration")
}
