//! # Image Ingestion
//!
//! Validates a user-selected file and decodes it into the two encodings the
//! pipeline needs:
//! - a preview data URI (`data:image/png;base64,...`) for display
//! - the base64 payload of that same URI, used by the JSON transport
//!
//! The raw bytes are kept as well for the multipart transport.
//!
//! Files arrive either from a file picker ([`RawFile::from_path`]) or from a
//! drop event ([`RawFile::dropped`]). Both go through [`ImageIngestor::accept`],
//! so a dropped file is type-checked exactly like a picked one.
//!
//! Validation only looks at the declared MIME type. A file that cannot be read
//! is not an error: the ingestion simply yields nothing.

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use image::ImageFormat;
use log::{debug, warn};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::common::error::ValidationError;
use crate::common::messages::data_uri;

/// Declared MIME types accepted for upload.
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// How the file reached the ingestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOrigin {
    Picker,
    Drop,
}

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Bytes),
}

/// A file as selected by the user, before validation.
#[derive(Debug, Clone)]
pub struct RawFile {
    name: String,
    mime: String,
    origin: FileOrigin,
    source: FileSource,
}

impl RawFile {
    /// A file chosen through a picker. The declared type comes from the
    /// file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            mime: mime_for_path(&path),
            origin: FileOrigin::Picker,
            source: FileSource::Path(path),
        }
    }

    /// A file delivered by a drop event, already in memory.
    pub fn dropped(name: impl Into<String>, mime: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            origin: FileOrigin::Drop,
            source: FileSource::Memory(data.into()),
        }
    }

    /// Override the declared MIME type.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn origin(&self) -> FileOrigin {
        self.origin
    }

    async fn read(&self) -> io::Result<Bytes> {
        match &self.source {
            FileSource::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            FileSource::Memory(data) => Ok(data.clone()),
        }
    }
}

/// Declared MIME type for a path, derived from its extension.
fn mime_for_path(path: &Path) -> String {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Png) => "image/png".to_string(),
        Ok(ImageFormat::Jpeg) => "image/jpeg".to_string(),
        Ok(other) => match other.extensions_str().first() {
            Some(ext) => format!("image/{}", ext),
            None => "application/octet-stream".to_string(),
        },
        Err(_) => "application/octet-stream".to_string(),
    }
}

/// A decoded, accepted image.
///
/// The transport payload is a slice of the preview URI, so the two encodings
/// cannot diverge.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    mime: String,
    bytes: Bytes,
    preview: String,
    payload_start: usize,
}

impl SourceImage {
    fn encode(name: String, mime: String, bytes: Bytes) -> Self {
        let payload = general_purpose::STANDARD.encode(&bytes);
        let preview = data_uri(&mime, &payload);
        let payload_start = preview.len() - payload.len();
        Self {
            name,
            mime,
            bytes,
            preview,
            payload_start,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Original file bytes (multipart transport).
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Data URI suitable for direct rendering.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Base64 payload: the part of the preview after the first comma.
    pub fn base64_payload(&self) -> &str {
        &self.preview[self.payload_start..]
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Validation and decoding of user-selected files.
pub struct ImageIngestor;

impl ImageIngestor {
    /// Check the declared type. Both picker and drop paths call this.
    pub fn accept(file: &RawFile) -> Result<(), ValidationError> {
        if ACCEPTED_MIME_TYPES.contains(&file.mime()) {
            Ok(())
        } else {
            warn!(
                "Rejected {:?} file '{}' with type '{}'",
                file.origin(),
                file.name(),
                file.mime()
            );
            Err(ValidationError::UnsupportedType {
                mime: file.mime().to_string(),
            })
        }
    }

    /// Read the file and build both encodings. Does not validate.
    pub async fn decode(file: RawFile) -> io::Result<SourceImage> {
        let bytes = file.read().await?;
        let RawFile { name, mime, .. } = file;

        let image = tokio::task::spawn_blocking(move || SourceImage::encode(name, mime, bytes))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        debug!(
            "Decoded '{}' ({} bytes, {} base64 chars)",
            image.name(),
            image.bytes().len(),
            image.base64_payload().len()
        );
        Ok(image)
    }

    /// Validate then decode. `Ok(None)` means the file could not be read.
    pub async fn ingest(file: RawFile) -> Result<Option<SourceImage>, ValidationError> {
        Self::accept(&file)?;
        let name = file.name().to_string();
        match Self::decode(file).await {
            Ok(image) => Ok(Some(image)),
            Err(e) => {
                warn!("Could not read '{}': {}", name, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];

    #[test]
    fn mime_from_extension() {
        assert_eq!(RawFile::from_path("scan.png").mime(), "image/png");
        assert_eq!(RawFile::from_path("scan.JPG").mime(), "image/jpeg");
        assert_eq!(RawFile::from_path("scan.jpeg").mime(), "image/jpeg");
        assert_eq!(RawFile::from_path("scan.gif").mime(), "image/gif");
        assert_eq!(RawFile::from_path("scan.dcm").mime(), "application/octet-stream");
        assert_eq!(RawFile::from_path("dir/scan.png").name(), "scan.png");
    }

    #[test]
    fn accepts_png_and_jpeg_variants() {
        for mime in ACCEPTED_MIME_TYPES {
            let file = RawFile::dropped("x", mime, PNG_BYTES);
            assert!(ImageIngestor::accept(&file).is_ok(), "{} rejected", mime);
        }
    }

    #[test]
    fn rejects_other_types_from_both_origins() {
        for mime in ["image/gif", "image/webp", "application/pdf", "text/plain", ""] {
            let dropped = RawFile::dropped("x", mime, PNG_BYTES);
            assert_eq!(
                ImageIngestor::accept(&dropped),
                Err(ValidationError::UnsupportedType {
                    mime: mime.to_string()
                })
            );
        }
        let picked = RawFile::from_path("photo.bmp");
        assert!(ImageIngestor::accept(&picked).is_err());
    }

    #[tokio::test]
    async fn preview_payload_matches_transport_payload() {
        let file = RawFile::dropped("scan.png", "image/png", PNG_BYTES);
        let image = ImageIngestor::ingest(file).await.unwrap().unwrap();

        let expected = general_purpose::STANDARD.encode(PNG_BYTES);
        assert_eq!(image.base64_payload(), expected);
        assert_eq!(image.preview(), format!("data:image/png;base64,{}", expected));
        let (_, after_comma) = image.preview().split_once(',').unwrap();
        assert_eq!(after_comma, image.base64_payload());
        assert_eq!(image.bytes().as_ref(), PNG_BYTES);
    }

    #[tokio::test]
    async fn picked_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        std::fs::write(&path, b"jpeg-bytes").unwrap();

        let image = ImageIngestor::ingest(RawFile::from_path(&path))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(image.mime(), "image/jpeg");
        assert!(image.preview().starts_with("data:image/jpeg;base64,"));
        assert_eq!(image.bytes().as_ref(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn unreadable_file_yields_nothing() {
        let result = ImageIngestor::ingest(RawFile::from_path("/nonexistent/dir/scan.png")).await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn rejected_file_is_never_read() {
        let result = ImageIngestor::ingest(RawFile::from_path("/nonexistent/dir/scan.tiff")).await;
        assert!(matches!(result, Err(ValidationError::UnsupportedType { .. })));
    }
}
