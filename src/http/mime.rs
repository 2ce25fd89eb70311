//! MIME type detection module
//!
//! Returns the Content-Type for a served file. The three artifact types a
//! WebAssembly build produces are pinned first; everything else goes through
//! the generic extension table.

use std::path::Path;

pub const WASM: &str = "application/wasm";
pub const JAVASCRIPT: &str = "application/javascript";
pub const HTML: &str = "text/html; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content-Type for a resolved file path
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("wasm") => WASM,
        Some("js") => JAVASCRIPT,
        Some("html") => HTML,
        other => get_content_type(other),
    }
}

/// Generic extension to Content-Type lookup
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => HTML,
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",

        // Scripts and data
        Some("js" | "mjs") => JAVASCRIPT,
        Some("json" | "map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("wasm") => WASM,

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg" | "oga") => "audio/ogg",
        Some("flac") => "audio/flac",

        // Video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Archives
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",

        _ => OCTET_STREAM,
    }
}
