//! Logo asset resolution.
//!
//! The logo is decorative: every failure here — missing file, dead URL,
//! undecodable image — degrades to "no logo" with a warning, never an
//! error. A URL fetch lands in a `TempDir` that is dropped as soon as the
//! bytes are read back, so the downloaded asset is released whether or not
//! decoding succeeds.

use crate::config::LogoSource;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, warn};

/// A decoded logo, ready for embedding: tightly packed RGB8.
#[derive(Debug, Clone)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl LogoImage {
    /// Height in mm when drawn `target_w_mm` wide, preserving aspect ratio.
    pub fn scaled_height_mm(&self, target_w_mm: f32) -> f32 {
        if self.width == 0 {
            return target_w_mm;
        }
        target_w_mm * self.height as f32 / self.width as f32
    }
}

/// Resolve the configured logo source, if any.
pub async fn resolve_logo(source: Option<&LogoSource>, timeout_secs: u64) -> Option<LogoImage> {
    match source {
        None => None,
        Some(LogoSource::Path(path)) => decode_local(path),
        Some(LogoSource::Url(url)) => {
            let data = fetch_remote(url, timeout_secs).await?;
            decode_bytes(&data, url)
        }
    }
}

fn decode_local(path: &Path) -> Option<LogoImage> {
    match std::fs::read(path) {
        Ok(data) => decode_bytes(&data, &path.display().to_string()),
        Err(e) => {
            warn!("Logo '{}' unreadable, skipping: {}", path.display(), e);
            None
        }
    }
}

/// Download a remote logo through a temp dir. The `TempDir` is dropped at
/// the end of this function, deleting the downloaded file in every path.
async fn fetch_remote(url: &str, timeout_secs: u64) -> Option<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .ok()?;

    let response = match client.get(url).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!("Logo download '{}' failed: HTTP {}", url, r.status());
            return None;
        }
        Err(e) => {
            warn!("Logo download '{}' failed: {}", url, e);
            return None;
        }
    };

    let bytes = response.bytes().await.ok()?;

    let tmp = TempDir::new().ok()?;
    let file_path = tmp.path().join("logo");
    std::fs::write(&file_path, &bytes).ok()?;
    let data = std::fs::read(&file_path).ok();
    debug!("Logo downloaded: {} bytes from {}", bytes.len(), url);
    data
}

fn decode_bytes(data: &[u8], origin: &str) -> Option<LogoImage> {
    match image::load_from_memory(data) {
        Ok(img) => {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            debug!("Logo decoded: {}x{} from {}", width, height, origin);
            Some(LogoImage {
                width,
                height,
                rgb: rgb.into_raw(),
            })
        }
        Err(e) => {
            warn!("Logo '{}' could not be decoded, skipping: {}", origin, e);
            None
        }
    }
}
