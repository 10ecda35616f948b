//! MIME type resolution for output formats.
//!
//! [`convert_filetype`] accepts either a file extension or a MIME type and
//! returns a canonical MIME type:
//!
//! | Input | Result |
//! |---|---|
//! | `.jpg`, `photo.JPG` | `image/jpeg` (extension table, then common-types table) |
//! | `image/png` | `image/png` (must be a known type) |
//! | `application/vnd.ms-excel` | `application/vnd.ms-excel` (slash wins over the dot) |
//! | `.zzz` | [`MimeError::Lookup`] |
//! | `image/zzz`, `bogus` | [`MimeError::InvalidFormat`] |
//!
//! Anything containing `/` is treated as a MIME type before any `.` is looked
//! at, so dotted types such as `application/vnd.ms-excel` are accepted instead
//! of failing as an unknown `.ms-excel` extension. Otherwise anything containing `.`
//! is looked up by its suffix from the last `.`, ASCII-lowercased.

use image::ImageFormat;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MimeError {
    #[error("No MIME type registered for extension '{extension}'")]
    Lookup { extension: String },
    #[error("{reason}: {value}")]
    InvalidFormat { value: String, reason: &'static str },
    #[error("No image encoder for MIME type {mime}")]
    NoEncoder { mime: &'static str },
}

/// Extension → canonical MIME type.
const TYPES: &[(&str, &str)] = &[
    (".a", "application/octet-stream"),
    (".ai", "application/postscript"),
    (".aif", "audio/x-aiff"),
    (".aifc", "audio/x-aiff"),
    (".aiff", "audio/x-aiff"),
    (".au", "audio/basic"),
    (".avi", "video/x-msvideo"),
    (".avif", "image/avif"),
    (".bat", "text/plain"),
    (".bin", "application/octet-stream"),
    (".bmp", "image/bmp"),
    (".c", "text/plain"),
    (".css", "text/css"),
    (".csv", "text/csv"),
    (".dll", "application/octet-stream"),
    (".doc", "application/msword"),
    (".dvi", "application/x-dvi"),
    (".eml", "message/rfc822"),
    (".eps", "application/postscript"),
    (".exe", "application/octet-stream"),
    (".gif", "image/gif"),
    (".gtar", "application/x-gtar"),
    (".h", "text/plain"),
    (".heic", "image/heic"),
    (".heif", "image/heif"),
    (".htm", "text/html"),
    (".html", "text/html"),
    (".ico", "image/vnd.microsoft.icon"),
    (".ief", "image/ief"),
    (".jpe", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".js", "application/javascript"),
    (".json", "application/json"),
    (".latex", "application/x-latex"),
    (".m3u", "application/vnd.apple.mpegurl"),
    (".m3u8", "application/vnd.apple.mpegurl"),
    (".md", "text/markdown"),
    (".mjs", "application/javascript"),
    (".mov", "video/quicktime"),
    (".mp2", "audio/mpeg"),
    (".mp3", "audio/mpeg"),
    (".mp4", "video/mp4"),
    (".mpeg", "video/mpeg"),
    (".mpg", "video/mpeg"),
    (".pbm", "image/x-portable-bitmap"),
    (".pdf", "application/pdf"),
    (".pgm", "image/x-portable-graymap"),
    (".png", "image/png"),
    (".pnm", "image/x-portable-anymap"),
    (".ppm", "image/x-portable-pixmap"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (".ps", "application/postscript"),
    (".py", "text/x-python"),
    (".qt", "video/quicktime"),
    (".ras", "image/x-cmu-raster"),
    (".rgb", "image/x-rgb"),
    (".sh", "application/x-sh"),
    (".svg", "image/svg+xml"),
    (".swf", "application/x-shockwave-flash"),
    (".tar", "application/x-tar"),
    (".tex", "application/x-tex"),
    (".tif", "image/tiff"),
    (".tiff", "image/tiff"),
    (".tsv", "text/tab-separated-values"),
    (".txt", "text/plain"),
    (".vcf", "text/x-vcard"),
    (".wasm", "application/wasm"),
    (".wav", "audio/x-wav"),
    (".webm", "video/webm"),
    (".xbm", "image/x-xbitmap"),
    (".xls", "application/vnd.ms-excel"),
    (".xml", "text/xml"),
    (".xpm", "image/x-xpixmap"),
    (".xsl", "application/xml"),
    (".xwd", "image/x-xwindowdump"),
    (".zip", "application/zip"),
];

/// Extension → widespread but non-canonical MIME type. Consulted second.
const COMMON_TYPES: &[(&str, &str)] = &[
    (".jpg", "image/jpg"),
    (".mid", "audio/midi"),
    (".midi", "audio/midi"),
    (".pct", "image/pict"),
    (".pic", "image/pict"),
    (".pict", "image/pict"),
    (".rtf", "application/rtf"),
    (".webp", "image/webp"),
    (".xul", "text/xul"),
];

static TYPES_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| TYPES.iter().copied().collect());

static COMMON_TYPES_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| COMMON_TYPES.iter().copied().collect());

static KNOWN_TYPES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    TYPES
        .iter()
        .chain(COMMON_TYPES)
        .map(|(_, mime)| *mime)
        .collect()
});

/// Resolve a file extension or MIME type to a canonical MIME type.
pub fn convert_filetype(value: &str) -> Result<&'static str, MimeError> {
    if value.contains('/') {
        return KNOWN_TYPES
            .get(value)
            .copied()
            .ok_or_else(|| MimeError::InvalidFormat {
                value: value.to_string(),
                reason: "Unknown MIME-type",
            });
    }

    if let Some(dot) = value.rfind('.') {
        let extension = value[dot..].to_ascii_lowercase();
        return TYPES_MAP
            .get(extension.as_str())
            .or_else(|| COMMON_TYPES_MAP.get(extension.as_str()))
            .copied()
            .ok_or(MimeError::Lookup { extension });
    }

    Err(MimeError::InvalidFormat {
        value: value.to_string(),
        reason: "Invalid MIME-type",
    })
}

/// Resolve `value` like [`convert_filetype`] and map it to an encoder format.
pub fn image_format_for(value: &str) -> Result<ImageFormat, MimeError> {
    let mime = convert_filetype(value)?;
    ImageFormat::from_mime_type(mime).ok_or(MimeError::NoEncoder { mime })
}
