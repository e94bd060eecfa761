/*!
 * MIME Detection
 * Extension lookup plus magic-byte sniffing of a file header
 */

/// MIME type reported for sniffed text
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// MIME type reported when nothing matches
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type for a file extension (with or without the leading dot)
///
/// Returns `None` for unknown extensions so callers can fall back to sniffing.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let normalized = ext.trim_start_matches('.').to_ascii_lowercase();

    let mime = match normalized.as_str() {
        // Video
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mpeg" | "mpg" => "video/mpeg",
        "ogv" => "video/ogg",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "3gp" => "video/3gpp",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",
        "mid" | "midi" => "audio/midi",
        "aif" | "aiff" => "audio/aiff",
        "weba" => "audio/webm",
        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "heic" => "image/heic",
        // Documents
        "pdf" => "application/pdf",
        "json" => "application/json",
        "xml" => "text/xml; charset=utf-8",
        "wasm" => "application/wasm",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        // Text
        "txt" => TEXT_PLAIN,
        "htm" | "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "vtt" => "text/vtt; charset=utf-8",
        _ => return None,
    };
    Some(mime)
}

/// Guess a MIME type from the first bytes of a file
///
/// Covers the families the classifier cares about (video, audio, image, pdf,
/// text) with the usual magic numbers. Anything without binary bytes is text.
pub fn sniff(header: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"%PDF-", "application/pdf"),
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xFF\xD8\xFF", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
        (b"\x00\x00\x01\x00", "image/x-icon"),
        (b"ID3", "audio/mpeg"),
        (b"fLaC", "audio/flac"),
        (b"MThd\x00\x00\x00\x06", "audio/midi"),
        (b"OggS\x00", "application/ogg"),
        (b"\x1A\x45\xDF\xA3", "video/webm"),
        (b"\x00\x00\x01\xBA", "video/mpeg"),
        (b"\x00\x00\x01\xB3", "video/mpeg"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1F\x8B\x08", "application/gzip"),
        (b"\x00asm", "application/wasm"),
    ];

    for &(magic, mime) in SIGNATURES {
        if header.starts_with(magic) {
            return mime;
        }
    }

    // RIFF containers: WAVE, AVI, WEBP
    if header.len() >= 12 && header.starts_with(b"RIFF") {
        match &header[8..12] {
            b"WAVE" => return "audio/wave",
            b"AVI " => return "video/avi",
            b"WEBP" => return "image/webp",
            _ => {}
        }
    }

    // FORM....AIFF
    if header.len() >= 12 && header.starts_with(b"FORM") && &header[8..12] == b"AIFF" {
        return "audio/aiff";
    }

    // ISO base media: ....ftyp<brand>
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return match &header[8..12] {
            b"M4A " => "audio/mp4",
            b"avif" => "image/avif",
            b"heic" => "image/heic",
            b"qt  " => "video/quicktime",
            _ => "video/mp4",
        };
    }

    // MP3 frame sync without an ID3 tag
    if header.len() >= 2 && header[0] == 0xFF && (header[1] & 0xE0) == 0xE0 {
        return "audio/mpeg";
    }

    let trimmed = trim_leading_whitespace(header);
    if starts_with_ignore_case(trimmed, b"<svg") {
        return "image/svg+xml";
    }
    if starts_with_ignore_case(trimmed, b"<!doctype html") || starts_with_ignore_case(trimmed, b"<html")
    {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if super::text::is_binary(header) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    &data[start..]
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}
