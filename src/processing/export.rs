//! # Result Export
//!
//! Saves a processed image locally. Each export builds a transient
//! [`Download`] (file name plus decoded bytes), writes it, and drops it; the
//! session is never touched, so exporting twice writes the same file twice.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::client::ProcessedImage;
use crate::common::error::ExportError;
use crate::common::messages::{split_data_uri, Operation};

// Services are not consistent about trailing `=` padding.
const RESULT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// File name used for a result of `operation`, e.g. `encrypted_image.png`.
pub fn export_filename(operation: Operation) -> String {
    format!("{}_image.png", operation.past_tense())
}

/// A one-shot file save: created per export, consumed by [`Download::save_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    filename: String,
    bytes: Vec<u8>,
}

impl Download {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Write the file into `directory`, creating it if needed.
    pub fn save_in(self, directory: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(directory)?;
        let path = directory.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Writes processed images into a fixed output directory.
#[derive(Debug, Clone)]
pub struct ResultExporter {
    directory: PathBuf,
}

impl ResultExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Build the download for `result` without writing anything.
    ///
    /// # Errors
    /// - [`ExportError::NoResult`] when there is no successful result
    /// - [`ExportError::InvalidImage`] when the image reference is not base64
    pub fn prepare(result: Option<&ProcessedImage>) -> Result<Download, ExportError> {
        let result = result.ok_or(ExportError::NoResult)?;
        let (_, payload) = split_data_uri(&result.image);
        let bytes = RESULT_ENGINE
            .decode(payload.trim())
            .map_err(|e| ExportError::InvalidImage(e.to_string()))?;

        Ok(Download {
            filename: export_filename(result.operation),
            bytes,
        })
    }

    /// Save `result` into the output directory and return the written path.
    pub fn export(&self, result: Option<&ProcessedImage>) -> Result<PathBuf, ExportError> {
        let download = Self::prepare(result)?;
        let path = download.save_in(&self.directory)?;
        info!("💾 Saved processed image to {}", path.display());
        Ok(path)
    }
}
