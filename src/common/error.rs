//! # Error Types
//!
//! Local failures of the request pipeline. Remote failures (the service
//! answering `success: false`, or being unreachable) are not errors here:
//! they come back as a [`ProcessingResult`](crate::client::ProcessingResult)
//! so the session can always return to a retriable configuration.
//!
//! The `Display` text of every variant is the notice shown to the user.

use thiserror::Error;

/// Pre-flight checks that abort before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The file's declared MIME type is not PNG or JPEG.
    #[error("Please upload a valid image file (PNG, JPEG)")]
    UnsupportedType { mime: String },

    #[error("Please enter or generate an encryption key")]
    MissingKey,

    #[error("Please upload an image first")]
    MissingImage,

    /// An image is selected but its transport encoding is empty.
    #[error("Image base64 not available. Please re-upload the image.")]
    MissingPayload,
}

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A submission is already outstanding.
    #[error("A request is already being processed")]
    Busy,

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors returned by [`ResultExporter`](crate::processing::ResultExporter).
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No processed image to download")]
    NoResult,

    /// The result image reference could not be decoded into bytes.
    #[error("Processed image is not valid base64 data: {0}")]
    InvalidImage(String),

    #[error("Failed to save processed image: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Returns true for failures that are plain user-input problems.
    pub fn is_validation(&self) -> bool {
        matches!(self, SessionError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        let err = ValidationError::UnsupportedType {
            mime: "image/gif".to_string(),
        };
        assert_eq!(err.to_string(), "Please upload a valid image file (PNG, JPEG)");
        assert_eq!(
            ValidationError::MissingKey.to_string(),
            "Please enter or generate an encryption key"
        );
    }

    #[test]
    fn session_error_wraps_validation_transparently() {
        let err: SessionError = ValidationError::MissingImage.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Please upload an image first");
    }

    #[test]
    fn export_error_no_result_message() {
        let err: SessionError = ExportError::NoResult.into();
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "No processed image to download");
    }
}
