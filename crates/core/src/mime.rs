//! Content type inference from file name extensions.
//!
//! Covers the media and document types that typically end up in a Drive
//! folder. Unknown extensions resolve to `None` so the storage backend can
//! sniff the content itself.

use std::path::Path;

/// Fallback used when a caller needs a concrete type for an unknown file.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension (lowercase, no dot) to content type.
const CONTENT_TYPES: &[(&str, &str)] = &[
    // images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("svg", "image/svg+xml"),
    // video
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("ts", "video/mp2t"),
    // audio
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    // documents
    ("pdf", "application/pdf"),
    ("txt", "text/plain; charset=utf-8"),
    ("csv", "text/csv; charset=utf-8"),
    ("html", "text/html; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("md", "text/markdown; charset=utf-8"),
    ("json", "application/json"),
    ("xml", "text/xml; charset=utf-8"),
    // archives
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
];

/// Look up the content type for a bare extension (with or without the dot).
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
}

/// Infer the content type of `path` from its extension.
pub fn content_type_for(path: impl AsRef<Path>) -> Option<&'static str> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(content_type_for_extension)
}
