//! Text extraction: pull embedded text out of each dossier file.
//!
//! ## Why spawn_blocking?
//!
//! `pdf-extract` is a synchronous, CPU-bound library.
//! `tokio::task::spawn_blocking` moves the work onto the blocking thread
//! pool so the async workers never stall on a big CCTP.
//!
//! ## Failure contract
//!
//! Extraction never fails the request on its own: a corrupt or scanned file
//! yields empty text plus a recorded [`DocumentError`], and the remaining
//! files carry the analysis. Only an entirely empty corpus is fatal — that
//! decision belongs to the caller in [`crate::analyze`].

use crate::error::{DocumentError, ScanAoError};
use crate::output::DocumentResult;
use crate::pipeline::input::DossierFile;
use crate::progress::AnalysisProgressCallback;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Text extracted from one dossier file, paired with its outcome record.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub result: DocumentResult,
    pub text: String,
}

/// Extract text from all dossier files, `concurrency` at a time.
///
/// Results come back in input order regardless of completion order, so the
/// prompt corpus is stable across runs.
pub async fn extract_documents(
    files: &[DossierFile],
    concurrency: usize,
    progress: Option<&dyn AnalysisProgressCallback>,
) -> Result<Vec<ExtractedDocument>, ScanAoError> {
    let total = files.len();

    let mut extracted: Vec<(usize, ExtractedDocument)> =
        stream::iter(files.iter().cloned().enumerate().map(|(idx, file)| async move {
            if let Some(cb) = progress {
                cb.on_document_start(idx + 1, total, &file.name);
            }
            let doc = extract_one(file).await;
            if let Some(cb) = progress {
                match &doc.result.error {
                    None => cb.on_document_complete(idx + 1, total, doc.result.chars),
                    Some(e) => cb.on_document_error(idx + 1, total, &e.to_string()),
                }
            }
            (idx, doc)
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    extracted.sort_by_key(|(idx, _)| *idx);
    debug!("Extracted {} of {} dossier files", extracted.len(), total);

    Ok(extracted.into_iter().map(|(_, doc)| doc).collect())
}

/// Extract one file on the blocking pool. Never errors; failures are
/// recorded on the returned [`DocumentResult`].
async fn extract_one(file: DossierFile) -> ExtractedDocument {
    let name = file.name.clone();
    let path = file.path.clone();

    let outcome = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path)).await;

    match outcome {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            let chars = text.len();
            debug!("'{}': {} chars extracted", name, chars);
            ExtractedDocument {
                result: DocumentResult {
                    name,
                    chars,
                    error: None,
                },
                text,
            }
        }
        Ok(Ok(_)) => {
            warn!("'{}': no embedded text", name);
            ExtractedDocument {
                result: DocumentResult {
                    name: name.clone(),
                    chars: 0,
                    error: Some(DocumentError::NoText { name }),
                },
                text: String::new(),
            }
        }
        Ok(Err(e)) => {
            warn!("'{}': extraction failed — {}", name, e);
            ExtractedDocument {
                result: DocumentResult {
                    name: name.clone(),
                    chars: 0,
                    error: Some(DocumentError::ExtractionFailed {
                        name,
                        detail: e.to_string(),
                    }),
                },
                text: String::new(),
            }
        }
        Err(join_err) => {
            warn!("'{}': extraction task panicked — {}", name, join_err);
            ExtractedDocument {
                result: DocumentResult {
                    name: name.clone(),
                    chars: 0,
                    error: Some(DocumentError::ExtractionFailed {
                        name,
                        detail: join_err.to_string(),
                    }),
                },
                text: String::new(),
            }
        }
    }
}

/// Join extracted texts into the prompt corpus, skipping files that
/// contributed nothing.
pub fn build_corpus(documents: &[ExtractedDocument]) -> String {
    let mut corpus = String::new();
    for doc in documents {
        if doc.result.contributed() {
            corpus.push_str(&crate::prompts::document_separator(&doc.result.name));
            corpus.push_str(&doc.text);
        }
    }
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DocumentResult;
    use std::io::Write;
    use std::path::PathBuf;

    fn doc(name: &str, text: &str) -> ExtractedDocument {
        ExtractedDocument {
            result: DocumentResult {
                name: name.to_string(),
                chars: text.len(),
                error: None,
            },
            text: text.to_string(),
        }
    }

    #[test]
    fn corpus_joins_files_with_separators() {
        let docs = vec![doc("rc.pdf", "règlement"), doc("cctp.pdf", "clauses")];
        let corpus = build_corpus(&docs);
        assert_eq!(
            corpus,
            "\n--- DOC: rc.pdf ---\nrèglement\n--- DOC: cctp.pdf ---\nclauses"
        );
    }

    #[test]
    fn corpus_skips_empty_files() {
        let mut empty = doc("plan.pdf", "");
        empty.result.error = Some(crate::error::DocumentError::NoText {
            name: "plan.pdf".into(),
        });
        let docs = vec![doc("rc.pdf", "texte"), empty];
        let corpus = build_corpus(&docs);
        assert!(corpus.contains("rc.pdf"));
        assert!(!corpus.contains("plan.pdf"));
    }

    #[tokio::test]
    async fn garbage_file_degrades_to_empty_text() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.4 but actually garbage").unwrap();
        let file = DossierFile {
            path: f.path().to_path_buf(),
            name: "garbage.pdf".into(),
        };
        let extracted = extract_documents(&[file], 2, None).await.unwrap();
        assert_eq!(extracted.len(), 1);
        assert!(extracted[0].text.is_empty());
        assert!(extracted[0].result.error.is_some());
    }

    #[tokio::test]
    async fn results_preserve_input_order() {
        // Both files fail extraction; order must still match the input.
        let mk = |name: &str| {
            let mut f = tempfile::NamedTempFile::new().unwrap();
            f.write_all(b"%PDF-1.4 stub").unwrap();
            let (_, path) = f.keep().unwrap();
            (path, name.to_string())
        };
        let (p1, n1) = mk("premier.pdf");
        let (p2, n2) = mk("second.pdf");
        let files = vec![
            DossierFile {
                path: p1.clone(),
                name: n1,
            },
            DossierFile {
                path: p2.clone(),
                name: n2,
            },
        ];
        let extracted = extract_documents(&files, 4, None).await.unwrap();
        assert_eq!(extracted[0].result.name, "premier.pdf");
        assert_eq!(extracted[1].result.name, "second.pdf");
        let _ = std::fs::remove_file(PathBuf::from(p1));
        let _ = std::fs::remove_file(PathBuf::from(p2));
    }
}
