//! Result types returned by the analysis pipeline.

use crate::error::DocumentError;
use crate::score::ScoreBand;
use serde::Serialize;

/// The complete result of one analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// The model's report, verbatim.
    pub report_text: String,

    /// Numeric score extracted from the report (0 when no marker was found).
    pub score: f64,

    /// Presentation label, e.g. `7.5/10`.
    pub score_label: String,

    /// Presentation band derived from the score.
    pub band: ScoreBand,

    /// The rendered PDF report, ready for download.
    ///
    /// Skipped in JSON output; callers wanting the file write it themselves
    /// (or use [`crate::analyze_to_file`]).
    #[serde(skip)]
    pub pdf: Vec<u8>,

    /// Number of pages in the rendered report.
    pub pages: usize,

    /// Per-input-file extraction results, in input order.
    pub documents: Vec<DocumentResult>,

    /// Timing and token accounting.
    pub stats: AnalysisStats,
}

/// Extraction outcome for a single dossier file.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// File name as shown in the prompt's `--- DOC: name ---` separator.
    pub name: String,

    /// Characters of text extracted (0 on failure or empty file).
    pub chars: usize,

    /// Set when extraction failed or found nothing; the file is then
    /// excluded from the corpus but the analysis continues.
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    /// Whether this file contributed text to the corpus.
    pub fn contributed(&self) -> bool {
        self.error.is_none() && self.chars > 0
    }
}

/// Aggregated statistics for one analysis request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    /// Input files given.
    pub total_documents: usize,
    /// Files that contributed text to the corpus.
    pub extracted_documents: usize,
    /// Files that failed extraction or were empty.
    pub failed_documents: usize,
    /// Characters in the assembled prompt.
    pub prompt_chars: usize,
    /// Model-reported prompt tokens.
    pub input_tokens: u64,
    /// Model-reported completion tokens.
    pub output_tokens: u64,
    /// Wall-clock time spent extracting text.
    pub extract_duration_ms: u64,
    /// Wall-clock time spent waiting on the model (including retries).
    pub llm_duration_ms: u64,
    /// Wall-clock time spent rendering the PDF.
    pub render_duration_ms: u64,
    /// Total request time.
    pub total_duration_ms: u64,
}

/// The result of extraction alone (no model call), for `--extract-only`.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// Per-file results, in input order.
    pub documents: Vec<DocumentResult>,

    /// The assembled corpus: each file's text behind its
    /// `--- DOC: name ---` separator.
    pub corpus: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributed_requires_text_and_no_error() {
        let ok = DocumentResult {
            name: "rc.pdf".into(),
            chars: 120,
            error: None,
        };
        assert!(ok.contributed());

        let empty = DocumentResult {
            name: "plan.pdf".into(),
            chars: 0,
            error: Some(DocumentError::NoText {
                name: "plan.pdf".into(),
            }),
        };
        assert!(!empty.contributed());
    }

    #[test]
    fn json_output_skips_pdf_bytes() {
        let output = AnalysisOutput {
            report_text: "SCORE_IA: 7/10".into(),
            score: 7.0,
            score_label: "7/10".into(),
            band: ScoreBand::High,
            pdf: vec![0x25, 0x50, 0x44, 0x46],
            pages: 1,
            documents: vec![],
            stats: AnalysisStats::default(),
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"score\":7.0"));
        assert!(!json.contains("pdf"));
        assert!(json.contains("\"band\":\"high\""));
    }
}
