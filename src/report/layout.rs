//! Line classification and wrapping for the report's pseudo-markup dialect.
//!
//! The analyst prompt constrains the model to a narrow dialect: an optional
//! score line, `##` section headings, `- **Clé :** valeur` bullets, and
//! plain paragraphs. That dialect is fixed by contract with the prompt, so
//! the renderer classifies each line with ordered pattern priority instead
//! of parsing general Markdown. Anything that matches no rule is a plain
//! paragraph — malformed input degrades, it never errors.

use super::metrics::PT_PER_MM;
use super::writer::{latin1_bytes, Face};

/// One classified report line.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportLine {
    /// Empty after trimming — rendered as a small vertical gap.
    Blank,
    /// `##`-prefixed heading, marker run stripped.
    Heading(String),
    /// `- **Clé :** valeur` bullet. `key` carries the list marker and the
    /// colon (`- Clé :`), `value` is the trimmed remainder.
    KeyValue { key: String, value: String },
    /// Everything else, bold markers stripped where present.
    Paragraph(String),
}

/// Classify a raw report line. Rules apply in priority order; rule 5
/// (plain paragraph) is the universal fallback.
pub fn classify_line(raw: &str) -> ReportLine {
    let line = raw.trim();

    // Rule 1: blank
    if line.is_empty() {
        return ReportLine::Blank;
    }

    // Rule 2: heading — a run of two or more markers
    if line.starts_with("##") {
        return ReportLine::Heading(line.trim_start_matches('#').trim().to_string());
    }

    // Rule 3: bulleted bold key with a colon separator
    if let Some((key, value)) = split_key_value(line) {
        return ReportLine::KeyValue { key, value };
    }

    // Rule 4: stray bold emphasis — strip the markers
    if line.contains("**") {
        return ReportLine::Paragraph(line.replace("**", ""));
    }

    // Rule 5: plain paragraph, verbatim
    ReportLine::Paragraph(line.to_string())
}

/// Rule 3 matcher: list marker, then a bold marker, then a `:` somewhere.
fn split_key_value(line: &str) -> Option<(String, String)> {
    let rest = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix('-'))
        .or_else(|| line.strip_prefix("* "))?;
    let rest = rest.trim_start();
    if !rest.starts_with("**") || !rest.contains(':') {
        return None;
    }

    let flat = rest.replace("**", "");
    let (key, value) = flat.split_once(':')?;
    Some((format!("- {key}:"), value.trim().to_string()))
}

/// Remove decorative pictographs (the prompt's section emoji, dingbats,
/// variation selectors) so they don't surface as `?` in the Latin-1 output.
pub fn strip_decorations(text: &str) -> String {
    text.chars().filter(|&c| !is_decoration(c)).collect()
}

fn is_decoration(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF       // emoji & symbols supplement
        | 0x2600..=0x27BF       // misc symbols, dingbats
        | 0x2B00..=0x2BFF
        | 0xFE00..=0xFE0F       // variation selectors
        | 0x200D                // zero-width joiner
    )
}

// ── Wrapping ─────────────────────────────────────────────────────────────

/// A styled fragment of one visual line.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub face: Face,
    pub text: String,
}

impl Run {
    pub fn new(face: Face, text: impl Into<String>) -> Self {
        Self {
            face,
            text: text.into(),
        }
    }
}

/// Greedy word-wrap over styled runs.
///
/// Words keep their face across the wrap; inter-word spaces are a single
/// space regardless of face (the Helvetica family shares its space width).
/// A word wider than the whole column is hard-broken at the last fitting
/// character, so pathological tokens cannot push text off the page.
pub fn wrap_runs(runs: &[Run], width_mm: f32, size_pt: f32) -> Vec<Vec<Run>> {
    let space_mm = 278.0 / 1000.0 * size_pt / PT_PER_MM;
    let words: Vec<(Face, String)> = runs
        .iter()
        .flat_map(|r| {
            r.text
                .split_whitespace()
                .map(move |w| (r.face, w.to_string()))
        })
        .collect();

    let mut lines: Vec<Vec<(Face, String)>> = Vec::new();
    let mut cur: Vec<(Face, String)> = Vec::new();
    let mut cur_mm = 0.0_f32;

    for (face, word) in words {
        let mut word = word;
        loop {
            let word_mm = face.metrics().text_width_mm(&latin1_bytes(&word), size_pt);
            let lead = if cur.is_empty() { 0.0 } else { space_mm };

            if cur_mm + lead + word_mm <= width_mm {
                cur.push((face, word));
                cur_mm += lead + word_mm;
                break;
            }

            if cur.is_empty() {
                let (head, tail) = split_to_fit(face, &word, width_mm, size_pt);
                if head.is_empty() {
                    // column narrower than a single character; emit anyway
                    cur.push((face, word));
                    cur_mm = width_mm;
                    break;
                }
                lines.push(vec![(face, head)]);
                if tail.is_empty() {
                    break;
                }
                word = tail;
                continue;
            }

            lines.push(std::mem::take(&mut cur));
            cur_mm = 0.0;
        }
    }

    if !cur.is_empty() {
        lines.push(cur);
    }

    lines.into_iter().map(merge_words).collect()
}

/// Longest prefix of `word` that fits in `width_mm`, plus the remainder.
fn split_to_fit(face: Face, word: &str, width_mm: f32, size_pt: f32) -> (String, String) {
    let mut head = String::new();
    let mut head_mm = 0.0_f32;

    for (idx, c) in word.char_indices() {
        let c_mm = face
            .metrics()
            .text_width_mm(&latin1_bytes(&c.to_string()), size_pt);
        if head_mm + c_mm > width_mm && !head.is_empty() {
            return (head, word[idx..].to_string());
        }
        head.push(c);
        head_mm += c_mm;
    }
    (head, String::new())
}

/// Merge consecutive same-face words back into runs, single-spaced.
fn merge_words(words: Vec<(Face, String)>) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (face, word) in words {
        match runs.last_mut() {
            Some(last) if last.face == face => {
                last.text.push(' ');
                last.text.push_str(&word);
            }
            _ => runs.push(Run::new(face, word)),
        }
    }
    runs
}
