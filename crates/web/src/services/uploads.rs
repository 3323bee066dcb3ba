//! Image files under the upload directory.
//!
//! ```text
//! {upload_dir}/
//! ├── logos/    - uploaded and generated logos, served as /uploads/logos/*
//! └── gallery/  - generated gallery images, served as /uploads/gallery/*
//! ```

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// URL prefix the upload directory is served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Maximum accepted upload size (5 MiB).
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Accepted image file extensions (lowercase).
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("file too large, maximum size is {max} bytes")]
    TooLarge { max: usize },
    #[error("unsupported file type '{0}', expected one of: png, jpg, jpeg, gif, webp, svg")]
    UnsupportedExtension(String),
    #[error("invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether the client sent something unacceptable, as opposed to a
    /// failure on our side.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Kind of stored image, which decides its sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Logo,
    Gallery,
}

impl ImageKind {
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Logo => "logos",
            Self::Gallery => "gallery",
        }
    }
}

/// Root of the upload directory.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an uploaded logo as `logos/{stem}.{ext}`.
    ///
    /// The extension comes from the client's file name and must be one of the
    /// accepted image types.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` for empty, oversized or non-image uploads, and
    /// for I/O failures.
    pub async fn save_logo(
        &self,
        stem: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(UploadError::UnsupportedExtension(ext));
        }
        self.write(ImageKind::Logo, &format!("{stem}.{ext}"), bytes)
            .await
    }

    /// Decode a base64 image from the generator and store it as `{name}.png`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidBase64` for undecodable data, and size or
    /// I/O errors as for uploads.
    pub async fn save_generated(
        &self,
        kind: ImageKind,
        name: &str,
        base64_data: &str,
    ) -> Result<String, UploadError> {
        let bytes = BASE64.decode(base64_data.trim())?;
        self.write(kind, &format!("{name}.png"), &bytes).await
    }

    /// Map a public `/uploads/{kind}/{file}` path back to its file, if the
    /// path is well formed and the file exists.
    pub async fn resolve(&self, kind: ImageKind, public_path: &str) -> Option<PathBuf> {
        let prefix = format!("{UPLOADS_URL_PREFIX}/{}/", kind.dir());
        let file_name = public_path.strip_prefix(&prefix)?;
        let well_formed = !file_name.is_empty()
            && !file_name.starts_with('.')
            && file_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !well_formed {
            return None;
        }
        let path = self.root.join(kind.dir()).join(file_name);
        tokio::fs::try_exists(&path)
            .await
            .unwrap_or(false)
            .then_some(path)
    }

    async fn write(
        &self,
        kind: ImageKind,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(UploadError::TooLarge {
                max: MAX_UPLOAD_SIZE,
            });
        }

        let dir = self.root.join(kind.dir());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;

        tracing::info!(kind = kind.dir(), file = %file_name, size = bytes.len(), "Image stored");
        Ok(format!("{UPLOADS_URL_PREFIX}/{}/{file_name}", kind.dir()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_logo_uses_stem_and_lowercase_ext() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().to_path_buf());
        let path = uploads.save_logo("abc", "My Logo.PNG", b"png").await.unwrap();
        assert_eq!(path, "/uploads/logos/abc.png");
        assert_eq!(std::fs::read(dir.path().join("logos/abc.png")).unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_save_logo_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().to_path_buf());
        assert!(matches!(
            uploads.save_logo("abc", "run.exe", b"MZ").await,
            Err(UploadError::UnsupportedExtension(ext)) if ext == "exe"
        ));
        assert!(matches!(
            uploads.save_logo("abc", "noext", b"x").await,
            Err(UploadError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            uploads.save_logo("abc", "a.png", b"").await,
            Err(UploadError::Empty)
        ));
        let big = vec![0_u8; MAX_UPLOAD_SIZE + 1];
        let err = uploads.save_logo("abc", "a.png", &big).await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_save_generated_decodes_base64() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().to_path_buf());
        let data = BASE64.encode(b"\x89PNG fake");
        let path = uploads
            .save_generated(ImageKind::Gallery, "g1", &data)
            .await
            .unwrap();
        assert_eq!(path, "/uploads/gallery/g1.png");
        assert_eq!(
            std::fs::read(dir.path().join("gallery/g1.png")).unwrap(),
            b"\x89PNG fake"
        );

        assert!(matches!(
            uploads.save_generated(ImageKind::Logo, "g2", "%%%").await,
            Err(UploadError::InvalidBase64(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_only_existing_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().to_path_buf());
        let path = uploads.save_logo("logo-1", "x.svg", b"<svg/>").await.unwrap();

        assert!(uploads.resolve(ImageKind::Logo, &path).await.is_some());
        assert!(uploads.resolve(ImageKind::Gallery, &path).await.is_none());
        assert!(
            uploads
                .resolve(ImageKind::Logo, "/uploads/logos/missing.png")
                .await
                .is_none()
        );
        assert!(
            uploads
                .resolve(ImageKind::Logo, "/uploads/logos/../../etc/passwd")
                .await
                .is_none()
        );
    }
}
