//! Score extraction and banding.
//!
//! The analyst prompt asks the model to open its report with a
//! `SCORE_IA: X/10` line. This module pulls that number back out of the
//! free-text response and classifies it into the three presentation bands
//! used by the report banner and the CLI verdict line.
//!
//! Extraction is deliberately permissive: a report without a marker, or with
//! a mangled number, is a valid report that simply scores 0. The extractor
//! never errors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// First `SCORE_IA:` marker, case-insensitive, tolerant of whitespace on
/// either side of the colon. The capture is the leading numeric run only —
/// an optional sign, digits, and at most one `.` or `,` decimal separator —
/// so trailing text such as `/10` is ignored.
static SCORE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SCORE_IA\s*:\s*(-?\d+(?:[.,]\d+)?)").unwrap());

/// Extract the numeric score from a report.
///
/// Only the *first* marker in document order counts; later occurrences
/// (e.g. inside an echoed instruction block) are ignored. Absence of a
/// marker, or a token that fails to parse, yields `0.0` — silently, never
/// an error. The value is not clamped: negatives and scores above 10 pass
/// through untouched, banding is the only consumer of the magnitude.
pub fn extract_score(report: &str) -> f64 {
    SCORE_MARKER
        .captures(report)
        .and_then(|caps| caps[1].replace(',', ".").parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Format a score the way the banner and the verdict line show it.
pub fn format_score_label(score: f64) -> String {
    format!("{score}/10")
}

/// Three-tier presentation band derived from the numeric score.
///
/// Drives the banner fill in the PDF and the verdict color in the CLI.
/// Purely presentational — no business meaning beyond go / look closer / no-go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// Score ≥ 7.
    High,
    /// Neither high nor low.
    Mid,
    /// Score ≤ 4.
    Low,
}

impl ScoreBand {
    /// Classify a score. Boundaries are inclusive: 7 is high, 4 is low.
    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            ScoreBand::High
        } else if score <= 4.0 {
            ScoreBand::Low
        } else {
            ScoreBand::Mid
        }
    }

    /// Banner background, as an RGB triple.
    pub fn fill(self) -> (u8, u8, u8) {
        match self {
            ScoreBand::High => (220, 252, 231),
            ScoreBand::Low => (254, 226, 226),
            ScoreBand::Mid => (255, 237, 213),
        }
    }

    /// Banner text color, as an RGB triple.
    pub fn ink(self) -> (u8, u8, u8) {
        match self {
            ScoreBand::High => (22, 101, 52),
            ScoreBand::Low => (153, 27, 27),
            ScoreBand::Mid => (154, 52, 18),
        }
    }
}
