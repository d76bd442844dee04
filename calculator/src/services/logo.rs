//! # Logo Encoding
//!
//! Store logos travel as `data:image/<subtype>;base64,<payload>` strings, both
//! in the backend `logo` column and in the local store.

use crate::core::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// Largest accepted image, before base64 expansion.
pub const MAX_LOGO_BYTES: usize = 512 * 1024;

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Read an image file and encode it as a data URI.
pub fn encode_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
    encode_bytes(&bytes, path)
}

/// Encode image bytes as a data URI. `path` is only used as a type hint.
pub fn encode_bytes(bytes: &[u8], path: &Path) -> Result<String> {
    if bytes.is_empty() {
        return Err(AppError::Validation("Image file is empty".to_string()));
    }
    if bytes.len() > MAX_LOGO_BYTES {
        return Err(AppError::Validation(format!(
            "Image too large: {} bytes (max {} bytes)",
            bytes.len(),
            MAX_LOGO_BYTES
        )));
    }

    let mime = detect_mime(bytes, path).ok_or_else(|| {
        AppError::Validation(format!("Unsupported image format: {}", path.display()))
    })?;

    Ok(format!("data:{}{}{}", mime, BASE64_MARKER, STANDARD.encode(bytes)))
}

/// Image MIME type from magic bytes, falling back to the file extension.
pub fn detect_mime(bytes: &[u8], path: &Path) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "svg" => Some("image/svg+xml"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Check that `uri` is an image data URI with a decodable base64 payload.
///
/// Returns the decoded payload size.
pub fn validate_data_uri(uri: &str) -> Result<usize> {
    let rest = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| AppError::Validation("Logo must be an image data URI".to_string()))?;

    let (subtype, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| AppError::Validation("Logo data URI must be base64 encoded".to_string()))?;

    if subtype.is_empty() {
        return Err(AppError::Validation("Logo data URI has no image type".to_string()));
    }

    STANDARD
        .decode(payload)
        .map(|bytes| bytes.len())
        .map_err(|e| AppError::Validation(format!("Logo payload is not valid base64: {}", e)))
}
