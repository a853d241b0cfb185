//! # Processing Client
//!
//! Sends one [`ProcessingRequest`] to the remote service and normalizes the
//! answer into a [`ProcessingResult`].
//!
//! ## Responsibility
//!
//! - One HTTP POST per call to the configured endpoint
//! - `success: true` becomes [`ProcessingResult::Success`]
//! - `success: false` (or a body with only `error`) becomes an application failure
//! - Any transport problem (refused connection, timeout, body that is not the
//!   expected JSON) becomes a transport failure carrying a generic hint
//!
//! It does not retry, cache, or queue. Preventing a second submission while
//! one is outstanding is the caller's job (see
//! [`SessionController`](crate::session::SessionController)).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = ProcessingClient::new(ServiceConfig::for_transport(Transport::Multipart))?;
//! let request = client.request_builder().build(Some(&image), Some(&key), Operation::Decrypt)?;
//! match client.submit(request).await {
//!     ProcessingResult::Success(processed) => println!("{}", processed.message),
//!     ProcessingResult::Failure(failure) => eprintln!("{}", failure.message()),
//! }
//! ```

use anyhow::{Context, Result};
use log::{error, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use std::time::Duration;

use crate::client::request::{MultipartRequest, ProcessingRequest, RequestBuilder};
use crate::common::config::{ServiceConfig, Transport};
use crate::common::messages::{HealthStatus, Operation, ProcessResponse};

/// A successfully processed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// Displayable image reference, normally a data URI
    pub image: String,
    /// Status message from the service
    pub message: String,
    /// Operation that produced the image
    pub operation: Operation,
}

/// Why a processing attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingFailure {
    /// The service answered and reported an error; shown verbatim.
    Application(String),
    /// The service could not be reached or answered garbage.
    Transport(String),
}

impl ProcessingFailure {
    pub fn message(&self) -> &str {
        match self {
            ProcessingFailure::Application(message) | ProcessingFailure::Transport(message) => {
                message
            }
        }
    }
}

/// Outcome of one remote transform attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingResult {
    Success(ProcessedImage),
    Failure(ProcessingFailure),
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingResult::Success(_))
    }

    /// Status message on success, error message on failure.
    pub fn message(&self) -> &str {
        match self {
            ProcessingResult::Success(processed) => &processed.message,
            ProcessingResult::Failure(failure) => failure.message(),
        }
    }
}

/// HTTP client bound to one endpoint and transport.
pub struct ProcessingClient {
    http: Client,
    config: ServiceConfig,
}

impl ProcessingClient {
    /// Creates a client for `config`, applying its transport-level timeout.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn transport(&self) -> Transport {
        self.config.transport
    }

    /// Builder producing requests in this client's encoding.
    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(self.config.transport)
    }

    /// Message shown for every transport failure.
    pub fn connectivity_hint(&self) -> String {
        let origin = Url::parse(&self.config.endpoint)
            .map(|url| url.origin().ascii_serialization())
            .unwrap_or_else(|_| self.config.endpoint.clone());
        format!(
            "Failed to process image. Make sure the backend server is running on {}",
            origin
        )
    }

    /// Submit `request` and wait for the service's answer.
    pub async fn submit(&self, request: ProcessingRequest) -> ProcessingResult {
        if request.transport() != self.config.transport {
            error!(
                "❌ Request encoded for {:?} but {} expects {:?}",
                request.transport(),
                self.config.endpoint,
                self.config.transport
            );
            return ProcessingResult::Failure(ProcessingFailure::Transport(
                self.connectivity_hint(),
            ));
        }

        let operation = request.operation();
        info!(
            "📤 Sending {} request to {} ({:?})",
            operation, self.config.endpoint, self.config.transport
        );

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("❌ Request to {} failed: {:#}", self.config.endpoint, e);
                return ProcessingResult::Failure(ProcessingFailure::Transport(
                    self.connectivity_hint(),
                ));
            }
        };

        if !response.success {
            let message = response
                .error
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!("Service rejected {} request: {}", operation, message);
            return ProcessingResult::Failure(ProcessingFailure::Application(message));
        }

        match response.image {
            Some(image) => {
                let message = response
                    .message
                    .unwrap_or_else(|| format!("Image {} successfully", operation.past_tense()));
                info!("✅ {}", message);
                ProcessingResult::Success(ProcessedImage {
                    image,
                    message,
                    operation,
                })
            }
            None => {
                error!("❌ Service reported success without an image");
                ProcessingResult::Failure(ProcessingFailure::Transport(self.connectivity_hint()))
            }
        }
    }

    async fn send(&self, request: ProcessingRequest) -> Result<ProcessResponse> {
        let builder = self.http.post(&self.config.endpoint);
        let builder = match request {
            ProcessingRequest::Json(body) => builder.json(&body),
            ProcessingRequest::Multipart(form) => builder.multipart(multipart_form(form)?),
        };

        let response = builder.send().await.context("Failed to send request")?;
        info!("Response status: {}", response.status());

        // Error statuses still carry a JSON body worth reading
        response
            .json::<ProcessResponse>()
            .await
            .context("Response body is not a processing result")
    }

    /// Probe `GET /api/health` on the endpoint's host.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = Url::parse(&self.config.endpoint)
            .and_then(|endpoint| endpoint.join("/api/health"))
            .with_context(|| format!("Invalid endpoint URL: {}", self.config.endpoint))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to reach health endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("Health check failed: {}", response.status());
        }

        response
            .json::<HealthStatus>()
            .await
            .context("Invalid health response")
    }
}

fn multipart_form(request: MultipartRequest) -> Result<Form> {
    let part = Part::bytes(request.bytes.to_vec())
        .file_name(request.file_name)
        .mime_str(&request.mime)
        .context("Invalid image MIME type")?;

    Ok(Form::new()
        .part("image", part)
        .text("key", request.key)
        .text("operation", request.operation.as_str()))
}
