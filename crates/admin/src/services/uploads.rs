//! Product image storage.
//!
//! Images are written to the configured directory under a generated name:
//! `{slug of the original stem}-{uuid}.{ext}`. The extension comes from the
//! file's magic bytes; the client's file name and content type are not trusted.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use auxilia_core::slugify;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Errors from storing or removing an image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image exceeds {MAX_IMAGE_BYTES} bytes")]
    TooLarge,

    #[error("unsupported image type")]
    UnsupportedType,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Form error for rejected files; I/O faults are not the user's doing.
    #[must_use]
    pub const fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::TooLarge => Some("L'image ne doit pas dépasser 2 Mo."),
            Self::UnsupportedType => Some("Format d'image non supporté (JPEG, PNG ou WEBP)."),
            Self::Io(_) => None,
        }
    }
}

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// Identify the format from the leading bytes.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(PNG) {
            Some(Self::Png)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Build the stored file name for an upload.
fn stored_name(original: &str, kind: ImageKind) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_owned());

    format!("{stem}-{}.{}", Uuid::new_v4().simple(), kind.extension())
}

/// Resolve a stored name inside `dir`, refusing anything but a bare file name.
fn resolve(dir: &Path, name: &str) -> Option<PathBuf> {
    let is_bare = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && Path::new(name).file_name().is_some_and(|f| f == name);

    is_bare.then(|| dir.join(name))
}

/// Validate and write an uploaded image, returning its stored name.
///
/// # Errors
///
/// Returns `UploadError::TooLarge` or `UploadError::UnsupportedType` for a
/// rejected file, `UploadError::Io` if writing fails.
pub async fn save_image(dir: &Path, original: &str, bytes: &[u8]) -> Result<String, UploadError> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }
    let kind = ImageKind::detect(bytes).ok_or(UploadError::UnsupportedType)?;

    tokio::fs::create_dir_all(dir).await?;
    let name = stored_name(original, kind);
    tokio::fs::write(dir.join(&name), bytes).await?;

    tracing::info!(image = %name, size = bytes.len(), "Product image stored");
    Ok(name)
}

/// Remove a stored image. Missing files and unsafe names are ignored.
pub async fn delete_image(dir: &Path, name: &str) {
    let Some(path) = resolve(dir, name) else {
        tracing::warn!(image = %name, "Refusing to delete image outside the images directory");
        return;
    };

    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::info!(image = %name, "Product image deleted"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(image = %name, error = %e, "Failed to delete product image"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
    const WEBP: &[u8] = b"RIFF\x24\x00\x00\x00WEBPVP8 ";

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageKind::detect(JPEG), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::detect(PNG), Some(ImageKind::Png));
        assert_eq!(ImageKind::detect(WEBP), Some(ImageKind::Webp));
        assert_eq!(ImageKind::detect(b"GIF89a"), None);
        assert_eq!(ImageKind::detect(b"RIFF\x24\x00\x00\x00WAVE"), None);
        assert_eq!(ImageKind::detect(b""), None);
    }

    #[test]
    fn test_stored_name_uses_detected_extension() {
        let name = stored_name("Chaise Longue.exe", ImageKind::Png);
        assert!(name.starts_with("chaise-longue-"));
        assert!(name.ends_with(".png"));
        // slug + dash + 32 hex + ".png"
        assert_eq!(name.len(), "chaise-longue-".len() + 32 + 4);
    }

    #[test]
    fn test_stored_name_without_usable_stem() {
        assert!(stored_name("", ImageKind::Jpeg).starts_with("image-"));
        assert!(stored_name("***.jpg", ImageKind::Jpeg).starts_with("image-"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = Path::new("/srv/images");
        assert_eq!(
            resolve(dir, "chaise-1a2b.png"),
            Some(PathBuf::from("/srv/images/chaise-1a2b.png"))
        );
        assert!(resolve(dir, "../secret").is_none());
        assert!(resolve(dir, "sub/file.png").is_none());
        assert!(resolve(dir, "/etc/passwd").is_none());
        assert!(resolve(dir, "..").is_none());
        assert!(resolve(dir, "").is_none());
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip_on_disk() {
        let dir = std::env::temp_dir().join(format!("auxilia-uploads-{}", Uuid::new_v4()));

        let name = save_image(&dir, "photo.jpeg", JPEG).await.unwrap();
        assert!(dir.join(&name).exists());

        delete_image(&dir, &name).await;
        assert!(!dir.join(&name).exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_bad_files() {
        let dir = std::env::temp_dir();
        assert!(matches!(
            save_image(&dir, "a.txt", b"hello").await,
            Err(UploadError::UnsupportedType)
        ));

        let mut big = JPEG.to_vec();
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(matches!(
            save_image(&dir, "big.jpg", &big).await,
            Err(UploadError::TooLarge)
        ));
    }
}
