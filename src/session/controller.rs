//! # Session Controller
//!
//! Runs the effects produced by [`SessionState::apply`]: file decoding and the
//! network submission. It owns the single session state together with the
//! processing client and the exporter, and is what a presentation layer calls
//! into.
//!
//! ## Request Workflow
//!
//! 1. **Select file**: validate, decode asynchronously, land the image
//! 2. **Key**: typed or generated
//! 3. **Process**: build the request, send it, apply the response
//! 4. **Export**: save the result on demand
//!
//! Both asynchronous steps are split into `begin_*` / `finish_*` halves so a
//! caller driving an event loop can interleave them; the `async` helpers run
//! both halves back to back.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut session = SessionController::from_config(&ClientConfig::default())?;
//! session.generate_key();
//! session.select_file(RawFile::from_path("scan.png")).await?;
//! let result = session.process().await?;
//! if result.is_success() {
//!     session.export()?;
//! }
//! ```

use anyhow::Result;
use log::{info, warn};
use std::path::PathBuf;

use crate::client::{ProcessingClient, ProcessingRequest, ProcessingResult};
use crate::common::config::ClientConfig;
use crate::common::error::SessionError;
use crate::common::messages::Operation;
use crate::processing::{ImageIngestor, KeyGenerator, KeyMaterial, RawFile, ResultExporter, SourceImage};
use crate::session::state::{AcceptedFile, Event, SessionState, Submission, ViewState};

/// A file accepted for decoding, tagged with its selection sequence.
#[derive(Debug)]
pub struct PendingDecode {
    seq: u64,
    file: RawFile,
}

impl PendingDecode {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Read and encode the file. Read failures are logged and yield no image.
    pub async fn run(self) -> DecodedImage {
        let name = self.file.name().to_string();
        let image = match ImageIngestor::decode(self.file).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Could not read '{}': {}", name, e);
                None
            }
        };
        DecodedImage {
            seq: self.seq,
            image,
        }
    }
}

/// Completion of a [`PendingDecode`].
#[derive(Debug)]
pub struct DecodedImage {
    seq: u64,
    image: Option<SourceImage>,
}

/// A request committed to the session, waiting to be sent.
#[derive(Debug)]
pub struct PendingSubmission {
    pub ticket: u64,
    pub request: ProcessingRequest,
}

/// Owner of the session state and its collaborators.
pub struct SessionController {
    state: SessionState,
    client: ProcessingClient,
    exporter: ResultExporter,
}

impl SessionController {
    pub fn new(client: ProcessingClient, exporter: ResultExporter) -> Self {
        Self {
            state: SessionState::new(),
            client,
            exporter,
        }
    }

    /// Builds the client and exporter described by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = ProcessingClient::new(config.service.clone())?;
        let exporter = ResultExporter::new(config.output.directory.clone());
        Ok(Self::new(client, exporter))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> ViewState<'_> {
        self.state.view()
    }

    pub fn client(&self) -> &ProcessingClient {
        &self.client
    }

    /// Apply an event that carries no follow-up work.
    fn commit(&mut self, event: Event) {
        match self.state.apply(event) {
            Ok(transition) => self.state = transition.state,
            Err(e) => warn!("{}", e),
        }
    }

    /// Replace the key with user input. Blank input clears it.
    pub fn edit_key(&mut self, text: &str) {
        self.commit(Event::KeyEdited(text.to_string()));
        if let Some(key) = self.state.key() {
            if !key.is_canonical() {
                warn!(
                    "Key {:?} is not a 56-character hex key; sending it as typed",
                    key
                );
            }
        }
    }

    /// Generate a fresh key, store it, and return it.
    pub fn generate_key(&mut self) -> KeyMaterial {
        let key = KeyGenerator::generate();
        self.commit(Event::KeyGenerated(key.clone()));
        info!("🔑 Generated key {:?}", key);
        key
    }

    pub fn select_operation(&mut self, operation: Operation) {
        self.commit(Event::OperationSelected(operation));
    }

    /// Validate `file` and reserve its selection sequence.
    pub fn begin_ingest(&mut self, file: RawFile) -> Result<PendingDecode, SessionError> {
        let AcceptedFile { state, seq, file } = self.state.accept_file(file).map_err(|e| {
            warn!("{}", e);
            e
        })?;
        self.state = state;
        info!("📥 Accepted '{}' ({:?}) as selection #{}", file.name(), file.origin(), seq);
        Ok(PendingDecode { seq, file })
    }

    /// Land a finished decode. Returns true if it became the current image.
    pub fn finish_ingest(&mut self, decoded: DecodedImage) -> bool {
        let Some(image) = decoded.image else {
            return false;
        };
        self.commit(Event::ImageDecoded {
            seq: decoded.seq,
            image,
        });
        decoded.seq == self.state.ingest_seq()
    }

    /// Select, decode and store a file in one call.
    pub async fn select_file(&mut self, file: RawFile) -> Result<bool, SessionError> {
        let pending = self.begin_ingest(file)?;
        let decoded = pending.run().await;
        Ok(self.finish_ingest(decoded))
    }

    /// Validate the inputs, build the request and enter Processing.
    ///
    /// Nothing changes when validation fails.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SessionError> {
        let Submission { state, ticket } = self.state.request_submit().map_err(|e| {
            warn!("{}", e);
            e
        })?;

        let request = self
            .client
            .request_builder()
            .build(self.state.image(), self.state.key(), self.state.operation())
            .map_err(|e| {
                warn!("{}", e);
                SessionError::from(e)
            })?;

        self.state = state;
        Ok(PendingSubmission { ticket, request })
    }

    /// Apply the service's answer to submission `ticket`.
    pub fn finish_submit(&mut self, ticket: u64, result: ProcessingResult) {
        self.commit(Event::ResultReceived { ticket, result });
    }

    /// Submit the current inputs and wait for the result.
    pub async fn process(&mut self) -> Result<ProcessingResult, SessionError> {
        let pending = self.begin_submit()?;
        let result = self.client.submit(pending.request).await;
        self.finish_submit(pending.ticket, result.clone());
        Ok(result)
    }

    /// Save the current result. Does not change the session.
    pub fn export(&self) -> Result<PathBuf, SessionError> {
        self.exporter.export(self.state.result()).map_err(|e| {
            warn!("{}", e);
            SessionError::from(e)
        })
    }
}
