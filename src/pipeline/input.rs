//! Input validation: check that each dossier path is a readable PDF.
//!
//! Validating the `%PDF` magic bytes up front means callers get a meaningful
//! error for a mislabelled file instead of an extraction failure halfway
//! through the request.

use crate::error::ScanAoError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated dossier file.
#[derive(Debug, Clone)]
pub struct DossierFile {
    pub path: PathBuf,
    /// File name used in the `--- DOC: name ---` prompt separator.
    pub name: String,
}

/// Validate a dossier path: it must exist, be readable, and start with
/// the `%PDF` magic bytes.
pub fn resolve_input(path_str: impl AsRef<Path>) -> Result<DossierFile, ScanAoError> {
    let path = path_str.as_ref().to_path_buf();

    if !path.exists() {
        return Err(ScanAoError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ScanAoError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ScanAoError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ScanAoError::FileNotFound { path });
        }
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Resolved dossier file: {}", path.display());
    Ok(DossierFile { path, name })
}

/// Validate a full input list. Empty input is a configuration error.
pub fn resolve_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<DossierFile>, ScanAoError> {
    if paths.is_empty() {
        return Err(ScanAoError::NoInput);
    }
    paths.iter().map(resolve_input).collect()
}
