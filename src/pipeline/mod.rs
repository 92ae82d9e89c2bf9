//! Pipeline stages for dossier analysis.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different extraction backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ prompt ──▶ llm ──▶ score ──▶ report
//! (paths)  (pdf-extract) (join)  (Gemini)  (regex)   (lopdf)
//! ```
//!
//! 1. [`input`]   — validate the user-supplied PDF paths
//! 2. [`extract`] — pull embedded text per file; runs in `spawn_blocking`
//!    because pdf-extract is synchronous and CPU-bound
//! 3. prompt      — [`crate::prompts`] joins instructions and corpus
//! 4. [`llm`]     — drive the model call with retry/backoff; the only stage
//!    with network I/O
//! 5. score       — [`crate::score`] pulls the `SCORE_IA` marker back out
//! 6. report      — [`crate::report`] lays the text out into a paginated PDF

pub mod extract;
pub mod input;
pub mod llm;
