//! Conversion of the final event payload into a [`MediaUploadResult`].

use nip96_core::{Dimension, MediaUploadResult, PartialEvent};

use crate::error::{Nip96Error, Nip96Result};

/// Read `url`, `m`, `ox`, `dim` and `magnet` from the event tags.
///
/// The first occurrence of each tag that carries a value counts; tags without a
/// value are ignored like unknown ones and blank values read as absent. Never
/// fails; see [`require_url`].
pub fn normalize(event: &PartialEvent) -> MediaUploadResult {
    let owned = |name: &str| event.tag_value(name).map(str::to_string);

    MediaUploadResult {
        url: owned("url"),
        mime_type: owned("m"),
        sha256_hash: owned("ox"),
        dimension: event
            .tag_value("dim")
            .and_then(|d| d.parse::<Dimension>().ok()),
        magnet_link: owned("magnet"),
    }
}

/// A result without a URL is unusable even when the server reported success.
pub fn require_url(result: MediaUploadResult) -> Nip96Result<MediaUploadResult> {
    if result.url.is_none() {
        return Err(Nip96Error::MissingUrl);
    }
    Ok(result)
}
