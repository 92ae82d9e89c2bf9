//! Analyst prompt for DCE dossier analysis.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the score marker (`SCORE_IA`), the section
//!    headings, and the scoring algorithm live in exactly one place. The
//!    score extractor and the report renderer both depend on this wording.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompt without
//!    calling a live model.
//!
//! Callers can override the instructions via
//! [`crate::config::AnalysisConfig::system_prompt`]; the constant here is
//! used only when no override is provided.

/// Default instruction block sent ahead of the extracted dossier text.
///
/// The structure it demands — a leading `SCORE_IA: X/10` line, then `##`
/// sections with `- **Clé :** valeur` bullets — is the pseudo-markup dialect
/// the report renderer understands.
pub const ANALYST_PROMPT: &str = r#"Tu es un Expert Analyse DCE BTP. Structure ton rapport ainsi :
SCORE_IA: X/10
## 📝 DESCRIPTION DU PROJET
## 💶 1. FINANCES
## 🗓️ 2. PLANNING
## 🚨 3. TECHNIQUE

Algorithme Score : Base 10. Malus: Public(-1), Réno(-1), Visite Obligatoire(-0.5), Pénalités >1000/j(-1). Bonus: Avance >10%(+0.5)."#;

/// Separator line inserted before each dossier file's text in the corpus.
pub fn document_separator(name: &str) -> String {
    format!("\n--- DOC: {name} ---\n")
}

/// Join the instruction block and the extracted corpus into one prompt.
pub fn assemble_prompt(instructions: &str, corpus: &str) -> String {
    format!("{instructions}\n\nDOCUMENTS :\n{corpus}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_declares_the_score_marker() {
        assert!(ANALYST_PROMPT.contains("SCORE_IA:"));
    }

    #[test]
    fn prompt_declares_the_four_sections() {
        for section in ["DESCRIPTION DU PROJET", "FINANCES", "PLANNING", "TECHNIQUE"] {
            assert!(ANALYST_PROMPT.contains(section), "missing section {section}");
        }
    }

    #[test]
    fn assembled_prompt_layout() {
        let p = assemble_prompt(ANALYST_PROMPT, "--- DOC: cctp.pdf ---\ntexte");
        assert!(p.starts_with(ANALYST_PROMPT));
        assert!(p.contains("\n\nDOCUMENTS :\n"));
        assert!(p.ends_with("texte"));
    }

    #[test]
    fn separator_names_the_file() {
        assert_eq!(document_separator("rc.pdf"), "\n--- DOC: rc.pdf ---\n");
    }
}
