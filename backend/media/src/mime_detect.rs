//! MIME type detection for image files.
//!
//! Content sniffing comes first; the file extension is the fallback.

use std::path::Path;

/// Guess the MIME type from the leading bytes of an image.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    // HEIF/HEIC carry an ftyp box the image crate does not know about.
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return match &bytes[8..12] {
            b"heic" | b"heix" | b"hevc" | b"hevx" => Some("image/heic"),
            b"mif1" | b"msf1" | b"heim" | b"heis" => Some("image/heif"),
            _ => None,
        };
    }
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Guess the MIME type from a file extension.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mime = match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}

/// Sniffed type if the content is recognizable, else the extension's type,
/// else `application/octet-stream`.
pub fn resolve_mime(path: &Path, bytes: &[u8]) -> &'static str {
    sniff_mime(bytes)
        .or_else(|| mime_from_extension(path))
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn sniffs_png_and_jpeg() {
        assert_eq!(sniff_mime(PNG_MAGIC), Some("image/png"));
        assert_eq!(sniff_mime(JPEG_MAGIC), Some("image/jpeg"));
    }

    #[test]
    fn sniffs_heic_brand() {
        let heic = [0, 0, 0, 0x18, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c'];
        assert_eq!(sniff_mime(&heic), Some("image/heic"));
    }

    #[test]
    fn content_beats_extension() {
        // A PNG saved with a .jpg name is still a PNG.
        assert_eq!(resolve_mime(&PathBuf::from("scan.jpg"), PNG_MAGIC), "image/png");
    }

    #[test]
    fn extension_fallback() {
        assert_eq!(resolve_mime(&PathBuf::from("photo.WEBP"), b"??"), "image/webp");
        assert_eq!(
            resolve_mime(&PathBuf::from("notes.txt"), b"hello"),
            "application/octet-stream"
        );
    }
}
