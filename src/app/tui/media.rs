use std::fs;
use std::sync::mpsc;

use tracing::{debug, warn};

use crate::catalog::is_http_url;
use crate::http::{FetchPolicy, get_bytes_with_retries};

/// Identifies which viewer session and which engine position a load was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct MediaTicket {
    pub(super) session: u64,
    pub(super) generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LoadedMedia {
    pub(super) kind: &'static str,
    pub(super) bytes: usize,
}

#[derive(Debug, Clone)]
pub(super) struct MediaLoadResult {
    pub(super) ticket: MediaTicket,
    pub(super) outcome: Result<LoadedMedia, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum MediaStatus {
    Loading,
    Ready(LoadedMedia),
    /// Shown as a fallback panel; playback carries on regardless.
    Failed(String),
}

pub(super) fn spawn_media_load(ticket: MediaTicket, image: String, tx: &mpsc::Sender<MediaLoadResult>) {
    let tx = tx.clone();
    std::thread::spawn(move || {
        let outcome = load_media(&image);
        match &outcome {
            Ok(media) => debug!(%image, kind = media.kind, bytes = media.bytes, "media loaded"),
            Err(err) => warn!(%image, error = %err, "media failed to load"),
        }
        let _ = tx.send(MediaLoadResult { ticket, outcome });
    });
}

fn load_media(image: &str) -> Result<LoadedMedia, String> {
    let bytes = if is_http_url(image) {
        get_bytes_with_retries(image, &FetchPolicy::media()).map_err(|err| err.to_string())?
    } else {
        let path = image.strip_prefix("file://").unwrap_or(image);
        fs::read(path).map_err(|err| format!("cannot read {path}: {err}"))?
    };
    if bytes.is_empty() {
        return Err("image is empty".to_string());
    }
    let kind = sniff_image_kind(&bytes).ok_or_else(|| "unrecognized image data".to_string())?;
    Ok(LoadedMedia {
        kind,
        bytes: bytes.len(),
    })
}

pub(super) fn sniff_image_kind(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("JPEG")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("PNG")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("GIF")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("WebP")
    } else if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && &bytes[8..12] == b"avif" {
        Some("AVIF")
    } else {
        None
    }
}

/// Keeps only results for `current`; anything else belongs to a position or a
/// viewer session that is gone.
pub(super) fn drain_media_results(
    rx: &mpsc::Receiver<MediaLoadResult>,
    current: MediaTicket,
) -> Option<Result<LoadedMedia, String>> {
    let mut latest = None;
    while let Ok(result) = rx.try_recv() {
        if result.ticket == current {
            latest = Some(result.outcome);
        } else {
            debug!(?result.ticket, ?current, "dropping stale media result");
        }
    }
    latest
}
