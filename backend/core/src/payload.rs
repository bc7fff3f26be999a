//! Encoded still images, the unit of work for one recognition cycle.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LensError;

/// Raster types the recognition service accepts. Anything else is rejected
/// when the payload is built.
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// MIME type assumed when a data URL carries none.
const DEFAULT_DATA_URL_MIME: &str = "image/jpeg";

static DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/(png|jpeg|jpg|webp);base64,").unwrap());

/// Any `data:<mime>;base64,` header; used when decoding.
static DATA_URL_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:([^;,]+);base64,").unwrap());

/// Remove a `data:image/<png|jpeg|jpg|webp>;base64,` prefix if present.
///
/// Other prefixes are left in place.
pub fn strip_data_url_prefix(encoded: &str) -> &str {
    match DATA_URL_PREFIX.find(encoded) {
        Some(m) => &encoded[m.end()..],
        None => encoded,
    }
}

/// Strip a data-URL header naming any supported type, so heic/heif URLs
/// decode as well.
fn strip_supported_header(encoded: &str) -> &str {
    match DATA_URL_HEADER.captures(encoded) {
        Some(caps) if is_supported_mime(&caps[1]) => &encoded[caps[0].len()..],
        _ => encoded,
    }
}

/// Extract the declared MIME type from a data URL header
/// (`data:<mime>;base64,...`).
pub fn mime_from_data_url(url: &str) -> Option<&str> {
    let header = url.split(';').next()?;
    let mime = header.split(':').nth(1)?;
    if mime.is_empty() || mime.contains(',') {
        None
    } else {
        Some(mime)
    }
}

/// Whether `mime` is in [`SUPPORTED_MIME_TYPES`] (case-insensitive).
pub fn is_supported_mime(mime: &str) -> bool {
    SUPPORTED_MIME_TYPES
        .iter()
        .any(|m| m.eq_ignore_ascii_case(mime.trim()))
}

/// An encoded still image plus its declared MIME type.
///
/// Holds decoded binary data; base64 and data-URL input is decoded on
/// construction. Never mutated after it is built.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data: Bytes,
    mime_type: String,
}

impl ImagePayload {
    /// Build a payload from raw encoded image bytes.
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Result<Self, LensError> {
        let mime_type = normalize_mime(mime_type.into())?;
        let data = data.into();
        if data.is_empty() {
            return Err(LensError::InvalidPayload("image data is empty".into()));
        }
        Ok(Self { data, mime_type })
    }

    /// Build a payload from base64 text, stripping a data-URL prefix first.
    pub fn from_base64(encoded: &str, mime_type: impl Into<String>) -> Result<Self, LensError> {
        let mime_type = normalize_mime(mime_type.into())?;
        let clean = strip_supported_header(strip_data_url_prefix(encoded.trim()));
        let data = STANDARD
            .decode(clean)
            .map_err(|e| LensError::InvalidPayload(format!("invalid base64 image data: {e}")))?;
        Self::new(data, mime_type)
    }

    /// Build a payload from a full data URL. The MIME type comes from the URL
    /// header and defaults to `image/jpeg` when the header has none.
    pub fn from_data_url(url: &str) -> Result<Self, LensError> {
        let mime = mime_from_data_url(url).unwrap_or(DEFAULT_DATA_URL_MIME);
        Self::from_base64(url, mime.to_string())
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Plain base64 of the image data, without any prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

fn normalize_mime(mime: String) -> Result<String, LensError> {
    let mime = mime.trim().to_ascii_lowercase();
    if is_supported_mime(&mime) {
        Ok(mime)
    } else {
        Err(LensError::InvalidPayload(format!(
            "unsupported image type '{mime}' (expected one of: {})",
            SUPPORTED_MIME_TYPES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    #[test]
    fn strips_known_prefixes() {
        for kind in ["png", "jpeg", "jpg", "webp"] {
            let url = format!("data:image/{kind};base64,QUJD");
            assert_eq!(strip_data_url_prefix(&url), "QUJD");
        }
    }

    #[test]
    fn heic_data_url_decodes() {
        let payload =
            ImagePayload::from_data_url("data:image/heic;base64,AAAAGGZ0eXBoZWlj").unwrap();
        assert_eq!(payload.mime_type(), "image/heic");
        assert_eq!(&payload.data()[4..12], b"ftypheic");
        // The request-side prefix strip stays limited to the four web types.
        assert_eq!(
            strip_data_url_prefix("data:image/heic;base64,AAAA"),
            "data:image/heic;base64,AAAA"
        );
    }

    #[test]
    fn unsupported_data_url_is_rejected() {
        assert!(ImagePayload::from_data_url("data:image/gif;base64,R0lGODlh").is_err());
    }

    #[test]
    fn leaves_unknown_prefix() {
        let url = "data:image/gif;base64,QUJD";
        assert_eq!(strip_data_url_prefix(url), url);
        assert_eq!(strip_data_url_prefix("QUJD"), "QUJD");
    }

    #[test]
    fn prefixed_and_plain_base64_decode_identically() {
        let plain = STANDARD.encode(PIXEL);
        let prefixed = format!("data:image/png;base64,{plain}");
        let a = ImagePayload::from_base64(&plain, "image/png").unwrap();
        let b = ImagePayload::from_base64(&prefixed, "image/png").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.data().as_ref(), PIXEL);
    }

    #[test]
    fn data_url_mime_is_used() {
        let url = format!("data:image/webp;base64,{}", STANDARD.encode(PIXEL));
        let payload = ImagePayload::from_data_url(&url).unwrap();
        assert_eq!(payload.mime_type(), "image/webp");
    }

    #[test]
    fn missing_data_url_mime_defaults_to_jpeg() {
        assert_eq!(mime_from_data_url("QUJD"), None);
        let payload = ImagePayload::from_data_url(&STANDARD.encode(PIXEL)).unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");
    }

    #[test]
    fn rejects_unlisted_types() {
        let err = ImagePayload::new(PIXEL.to_vec(), "image/gif").unwrap_err();
        assert!(matches!(err, LensError::InvalidPayload(_)));
        assert!(ImagePayload::new(PIXEL.to_vec(), "image/bmp").is_err());
    }

    #[test]
    fn rejects_empty_data() {
        assert!(ImagePayload::new(Vec::<u8>::new(), "image/png").is_err());
        assert!(ImagePayload::from_base64("data:image/png;base64,", "image/png").is_err());
    }

    #[test]
    fn mime_is_case_insensitive() {
        let payload = ImagePayload::new(PIXEL.to_vec(), " IMAGE/JPEG ").unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");
    }

    #[test]
    fn data_url_round_trip_keeps_mime() {
        let payload = ImagePayload::new(PIXEL.to_vec(), "image/jpeg").unwrap();
        let again = ImagePayload::from_data_url(&payload.to_data_url()).unwrap();
        assert_eq!(payload, again);
    }
}
