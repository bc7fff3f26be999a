use std::path::Path;

use lenstext_core::{ImagePayload, LensError};
use tracing::debug;

use crate::mime_detect::resolve_mime;

/// Read a user-chosen image file in full.
///
/// The MIME type is sniffed from the content, falling back to the extension.
/// Types outside the payload allow-list are rejected with `InvalidPayload`.
pub async fn load_from_file(path: impl AsRef<Path>) -> Result<ImagePayload, LensError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let mime = resolve_mime(path, &bytes);
    debug!(path = %path.display(), mime, bytes = bytes.len(), "Loaded image file");
    ImagePayload::new(bytes, mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn write_image(dir: &Path, name: &str, format: ImageFormat) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_pixel(4, 4, Rgb([200, 10, 10]));
        img.save_with_format(&path, format).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_png_with_sniffed_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "page.png", ImageFormat::Png);
        let payload = load_from_file(&path).await.unwrap();
        assert_eq!(payload.mime_type(), "image/png");
        assert!(!payload.is_empty());
    }

    #[tokio::test]
    async fn misnamed_jpeg_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "receipt.png", ImageFormat::Jpeg);
        let payload = load_from_file(&path).await.unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn gif_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        tokio::fs::write(&path, b"GIF89a\x04\x00\x04\x00\x80\x00\x00").await.unwrap();
        let err = load_from_file(&path).await.unwrap_err();
        assert!(matches!(err, LensError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        tokio::fs::write(&path, b"").await.unwrap();
        assert!(matches!(
            load_from_file(&path).await,
            Err(LensError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = load_from_file("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, LensError::Io(_)));
    }
}
