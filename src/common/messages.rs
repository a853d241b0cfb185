//! # Message Protocol
//!
//! Wire types of the image processing service, shared by the client and the
//! local stub server.
//!
//! Two request encodings exist (see [`Transport`](super::config::Transport)):
//! - JSON: `{ "image": "<base64>", "key": "...", "operation": "encrypt" }`
//! - multipart: parts `image` (raw file), `key`, `operation`
//!
//! Both deployments answer with the same JSON body:
//! `{ "success": true, "image": "data:image/png;base64,...", "message": "..." }`
//! or `{ "success": false, "error": "..." }`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The transform requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Encrypt,
    Decrypt,
}

impl Operation {
    /// Wire name of the operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
        }
    }

    /// Past tense used in messages and file names ("encrypted", "decrypted").
    pub fn past_tense(self) -> String {
        format!("{}ed", self.as_str())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encrypt" => Ok(Operation::Encrypt),
            "decrypt" => Ok(Operation::Decrypt),
            _ => Err(r#"Invalid operation. Must be "encrypt" or "decrypt""#.to_string()),
        }
    }
}

/// Body of a JSON-transport request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonProcessRequest {
    /// Base64 image payload without any data URI prefix
    pub image: String,
    pub key: String,
    pub operation: Operation,
}

/// Response body of both processing endpoints.
///
/// The service omits `success` entirely when it rejects a malformed request
/// (HTTP 400 with only `error`), so a missing flag reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl ProcessResponse {
    pub fn ok(image: String, message: String, operation: Operation) -> Self {
        Self {
            success: true,
            image: Some(image),
            message: Some(message),
            operation: Some(operation.as_str().to_string()),
            ..Default::default()
        }
    }

    /// Application-level failure (`success: false`).
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Build a `data:<mime>;base64,<payload>` URI.
pub fn data_uri(mime: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime, base64_payload)
}

/// Split an image reference into its media type (if any) and base64 payload.
///
/// The payload is everything after the first comma of a data URI. A string
/// without the `data:` scheme is taken to be a bare base64 payload.
///
/// # Example
/// ```ignore
/// let (mime, payload) = split_data_uri("data:image/png;base64,AAA");
/// assert_eq!(mime, Some("image/png"));
/// assert_eq!(payload, "AAA");
/// ```
pub fn split_data_uri(reference: &str) -> (Option<&str>, &str) {
    match reference.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((header, payload)) => {
                let mime = header.split(';').next().filter(|m| !m.is_empty());
                (mime, payload)
            }
            None => (None, ""),
        },
        None => (None, reference),
    }
}
