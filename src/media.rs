// src/media.rs
//! Media link resolution: turns the free-form link cell into a
//! `(source, id)` pair the projector can build URLs from.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::event::{MediaRef, MediaSource};

/// Extract a media reference from a raw link cell.
///
/// Empty input yields `{id: None, source: None}`. A recognized video-hosting
/// URL yields the 11-character video token; a file-store path
/// (`.../file/d/<id>/...` or `...?id=<id>`) yields the file id. Anything else
/// falls back to `{id: <raw string>, source: Drive}`: editors paste bare
/// file ids into the sheet, and the lenient fallback keeps those working.
pub fn extract_media_ref(url: &str) -> MediaRef {
    let url = url.trim();
    if url.is_empty() {
        return MediaRef::default();
    }

    static RE_VIDEO: OnceCell<Regex> = OnceCell::new();
    let re_video = RE_VIDEO.get_or_init(|| {
        Regex::new(
            r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
        )
        .unwrap()
    });
    if let Some(caps) = re_video.captures(url) {
        return MediaRef {
            id: Some(caps[1].to_string()),
            source: Some(MediaSource::YouTube),
        };
    }

    static RE_FILE: OnceCell<Regex> = OnceCell::new();
    let re_file = RE_FILE.get_or_init(|| Regex::new(r"(?:/file/d/|[?&]id=)([\w-]+)").unwrap());
    if let Some(caps) = re_file.captures(url) {
        return MediaRef {
            id: Some(caps[1].to_string()),
            source: Some(MediaSource::Drive),
        };
    }

    MediaRef {
        id: Some(url.to_string()),
        source: Some(MediaSource::Drive),
    }
}
