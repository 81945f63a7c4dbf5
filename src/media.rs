//! Content-type sniffing and download naming for stored blobs.

use axum::{
    body::Body,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};

const OCTET_STREAM: &str = "application/octet-stream";

/// Guesses a content type from the leading bytes of a stored file.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"BM") {
        "image/bmp"
    } else if bytes.starts_with(b"%PDF-") {
        "application/pdf"
    } else if bytes.starts_with(b"PK\x03\x04") {
        "application/zip"
    } else if looks_like_svg(bytes) {
        "image/svg+xml"
    } else {
        OCTET_STREAM
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let text = text.trim_start().to_ascii_lowercase();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// File extension (with the dot) for a content type, empty when unknown.
pub fn extension_for(content_type: &str) -> String {
    if content_type == OCTET_STREAM {
        return String::new();
    }
    let preferred = match content_type {
        "image/jpeg" => Some("jpg"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    };
    preferred
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first().copied())
        })
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Keeps letters, digits, spaces, `-` and `_`; anything else becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Raw bytes served inline with a sniffed content type.
pub struct Blob(pub Vec<u8>);

impl IntoResponse for Blob {
    fn into_response(self) -> Response {
        let content_type = sniff_content_type(&self.0);
        ([(header::CONTENT_TYPE, content_type)], Body::from(self.0)).into_response()
    }
}

/// A purchased file sent as an attachment named after the product.
pub struct Attachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn filename(&self) -> String {
        let content_type = sniff_content_type(&self.bytes);
        format!(
            "{}{}",
            sanitize_filename(&self.name),
            extension_for(content_type)
        )
    }
}

impl IntoResponse for Attachment {
    fn into_response(self) -> Response {
        let content_type = sniff_content_type(&self.bytes);
        let disposition = format!("attachment; filename=\"{}\"", self.filename());
        let disposition = HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
        (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from(self.bytes),
        )
            .into_response()
    }
}
