//! Payment proof image storage
//!
//! Uploads (PNG, JPEG, WebP) are decoded to make sure they are real images,
//! re-encoded as JPEG and stored under a content-hash file name, so the same
//! receipt uploaded twice lands on the same file.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use shared::error::{AppError, AppResult, ErrorCode};

/// Supported image extensions
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality for receipts (text stays legible)
const JPEG_QUALITY: u8 = 85;

/// Payment proof storage rooted at `<work_dir>/uploads/proofs`
#[derive(Debug, Clone)]
pub struct ProofStorage {
    dir: PathBuf,
    max_bytes: usize,
}

fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

impl ProofStorage {
    pub fn new(dir: PathBuf, max_bytes: usize) -> Self {
        Self { dir, max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Reject empty, oversized, non-image or unsupported uploads
    pub fn validate(&self, data: &[u8], filename: Option<&str>) -> AppResult<()> {
        if data.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "File too large. Maximum size is {} bytes ({}MB)",
                    self.max_bytes,
                    self.max_bytes / 1024 / 1024
                ),
            )
            .with_detail("max_bytes", self.max_bytes as u64));
        }

        if let Some(name) = filename {
            let mime = mime_guess::from_path(name).first();
            let ext = Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase);
            let supported = ext
                .as_deref()
                .is_some_and(|e| SUPPORTED_FORMATS.contains(&e))
                && mime.is_some_and(|m| m.type_() == mime_guess::mime::IMAGE);
            if !supported {
                return Err(AppError::with_message(
                    ErrorCode::UnsupportedFileFormat,
                    format!(
                        "Unsupported file '{}'. Supported: {}",
                        name,
                        SUPPORTED_FORMATS.join(", ")
                    ),
                ));
            }
        }

        match image::guess_format(data) {
            Ok(image::ImageFormat::Png | image::ImageFormat::Jpeg | image::ImageFormat::WebP) => Ok(()),
            Ok(other) => Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("Unsupported image format: {:?}", other),
            )),
            Err(e) => Err(AppError::with_message(
                ErrorCode::InvalidImageFile,
                format!("Invalid image file: {}", e),
            )),
        }
    }

    /// Decode and re-encode as JPEG
    fn compress(data: &[u8]) -> AppResult<Vec<u8>> {
        let img = image::load_from_memory(data).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {}", e))
        })?;

        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        img.to_rgb8().write_with_encoder(encoder).map_err(|e| {
            AppError::with_message(
                ErrorCode::ImageProcessingFailed,
                format!("Failed to compress image: {}", e),
            )
        })?;
        Ok(buffer)
    }

    /// Validate, compress and store an upload; returns the stored file name
    pub async fn save(&self, data: Vec<u8>, filename: Option<&str>) -> AppResult<String> {
        self.validate(&data, filename)?;

        let compressed = tokio::task::spawn_blocking(move || Self::compress(&data))
            .await
            .map_err(|e| AppError::internal(format!("Image task failed: {}", e)))??;

        let hash = calculate_hash(&compressed);
        let name = format!("{}.jpg", hash);
        let path = self.dir.join(&name);

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to create proofs directory: {}", e),
            )
        })?;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(file = %name, "Duplicate payment proof, reusing stored file");
            return Ok(name);
        }

        tokio::fs::write(&path, &compressed).await.map_err(|e| {
            AppError::with_message(ErrorCode::FileStorageFailed, format!("Failed to save file: {}", e))
        })?;

        tracing::info!(file = %name, size = compressed.len(), "Payment proof stored");
        Ok(name)
    }

    /// Read a stored proof
    pub async fn read(&self, name: &str) -> AppResult<Vec<u8>> {
        // Stored names are `<sha256>.jpg`; anything else never came from `save`
        let valid = name
            .strip_suffix(".jpg")
            .is_some_and(|h| h.len() == 64 && h.bytes().all(|b| b.is_ascii_hexdigit()));
        if !valid {
            return Err(AppError::not_found("Payment proof"));
        }
        tokio::fs::read(self.dir.join(name))
            .await
            .map_err(|_| AppError::not_found("Payment proof"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 120, 40]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_save_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProofStorage::new(dir.path().join("proofs"), 1024 * 1024);

        let name = storage.save(png_bytes(), Some("receipt.png")).await.unwrap();
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 64 + 4);

        let again = storage.save(png_bytes(), Some("receipt.png")).await.unwrap();
        assert_eq!(name, again);

        let stored = storage.read(&name).await.unwrap();
        assert_eq!(image::guess_format(&stored).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_rejects_bad_uploads() {
        let storage = ProofStorage::new(PathBuf::from("/tmp/unused"), 64);
        assert_eq!(storage.validate(&[], None).unwrap_err().code, ErrorCode::EmptyFile);
        assert_eq!(
            storage.validate(&[0u8; 65], None).unwrap_err().code,
            ErrorCode::FileTooLarge
        );
        assert_eq!(
            storage.validate(b"not an image", None).unwrap_err().code,
            ErrorCode::InvalidImageFile
        );

        let storage = ProofStorage::new(PathBuf::from("/tmp/unused"), 1024 * 1024);
        assert_eq!(
            storage.validate(&png_bytes(), Some("receipt.pdf")).unwrap_err().code,
            ErrorCode::UnsupportedFileFormat
        );
        assert!(storage.validate(&png_bytes(), Some("receipt.PNG")).is_ok());
    }

    #[tokio::test]
    async fn test_read_rejects_path_tricks() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProofStorage::new(dir.path().to_path_buf(), 1024);
        assert_eq!(
            storage.read("../cafe.db").await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }
}
