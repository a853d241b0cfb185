//! # Request Construction
//!
//! Assembles one [`ProcessingRequest`] from the session inputs. Pure; no I/O.
//! A builder is bound to one [`Transport`] and only ever produces requests in
//! that encoding.

use bytes::Bytes;

use crate::common::config::Transport;
use crate::common::error::ValidationError;
use crate::common::messages::{JsonProcessRequest, Operation};
use crate::processing::{KeyMaterial, SourceImage};

/// Parts of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartRequest {
    pub file_name: String,
    pub mime: String,
    /// Raw file bytes sent as the `image` part
    pub bytes: Bytes,
    pub key: String,
    pub operation: Operation,
}

/// A request ready to send, in exactly one encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingRequest {
    Json(JsonProcessRequest),
    Multipart(MultipartRequest),
}

impl ProcessingRequest {
    pub fn operation(&self) -> Operation {
        match self {
            ProcessingRequest::Json(body) => body.operation,
            ProcessingRequest::Multipart(form) => form.operation,
        }
    }

    pub fn transport(&self) -> Transport {
        match self {
            ProcessingRequest::Json(_) => Transport::Json,
            ProcessingRequest::Multipart(_) => Transport::Multipart,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder {
    transport: Transport,
}

impl RequestBuilder {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Build a request, checking inputs in the order the user supplies them:
    /// image, then key, then the image payload.
    pub fn build(
        &self,
        image: Option<&SourceImage>,
        key: Option<&KeyMaterial>,
        operation: Operation,
    ) -> Result<ProcessingRequest, ValidationError> {
        let image = image.ok_or(ValidationError::MissingImage)?;
        let key = key.ok_or(ValidationError::MissingKey)?;

        let request = match self.transport {
            Transport::Json => {
                if image.base64_payload().is_empty() {
                    return Err(ValidationError::MissingPayload);
                }
                ProcessingRequest::Json(JsonProcessRequest {
                    image: image.base64_payload().to_string(),
                    key: key.as_str().to_string(),
                    operation,
                })
            }
            Transport::Multipart => {
                if image.bytes().is_empty() {
                    return Err(ValidationError::MissingPayload);
                }
                ProcessingRequest::Multipart(MultipartRequest {
                    file_name: image.name().to_string(),
                    mime: image.mime().to_string(),
                    bytes: image.bytes().clone(),
                    key: key.as_str().to_string(),
                    operation,
                })
            }
        };

        Ok(request)
    }
}
