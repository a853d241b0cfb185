//! # Session State Machine
//!
//! One owned struct holds the key, the selected image, the chosen operation
//! and an explicit [`Phase`]. Every change goes through [`SessionState::apply`],
//! a pure function from (state, event) to a [`Transition`]: the next state plus
//! the side effect the caller must run. Rejected events return an error and
//! leave the current state untouched.
//!
//! ```text
//!            key + image               submit                 response
//!  Empty ───────────────▶ Configured ────────▶ Processing ──────────────▶ Resulted
//!    ▲                        ▲  ▲                 │ failure                 │
//!    └── key cleared ─────────┘  └─────────────────┘                         │
//!                                └───────── key edited / image replaced ─────┘
//! ```
//!
//! Two counters guard the asynchronous edges:
//! - `ingest_seq` tags each accepted file; a decode that lands after a newer
//!   file was selected is dropped.
//! - `revision` counts key/image edits; a response for a request built from
//!   older inputs is dropped.

use log::debug;
use std::sync::Arc;

use crate::client::{ProcessedImage, ProcessingResult};
use crate::common::error::{SessionError, ValidationError};
use crate::common::messages::Operation;
use crate::processing::{ImageIngestor, KeyMaterial, RawFile, SourceImage};

/// Lifecycle stage of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// Key or image still missing.
    #[default]
    Empty,
    /// Key and image present; processing may be triggered.
    Configured,
    /// A submission is outstanding.
    Processing { ticket: u64 },
    /// The last submission succeeded; the result can be exported.
    Resulted(ProcessedImage),
}

/// [`Phase`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Empty,
    Configured,
    Processing,
    Resulted,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Empty => PhaseKind::Empty,
            Phase::Configured => PhaseKind::Configured,
            Phase::Processing { .. } => PhaseKind::Processing,
            Phase::Resulted(_) => PhaseKind::Resulted,
        }
    }
}

/// Message for the user after a processing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }
}

/// Something that happened to the session.
#[derive(Debug, Clone)]
pub enum Event {
    /// The user typed into the key field.
    KeyEdited(String),
    KeyGenerated(KeyMaterial),
    OperationSelected(Operation),
    /// A file was picked or dropped.
    FileSelected(RawFile),
    /// Decoding of the file accepted with sequence `seq` finished.
    ImageDecoded { seq: u64, image: SourceImage },
    SubmitRequested,
    /// The service answered the submission identified by `ticket`.
    ResultReceived { ticket: u64, result: ProcessingResult },
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone)]
pub enum Effect {
    None,
    /// Decode `file` and report back with [`Event::ImageDecoded`].
    Decode { seq: u64, file: RawFile },
    /// Build and send a request, then report back with [`Event::ResultReceived`].
    Submit { ticket: u64 },
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SessionState,
    pub effect: Effect,
}

impl Transition {
    fn to(state: SessionState) -> Self {
        Self {
            state,
            effect: Effect::None,
        }
    }
}

/// A file accepted for decoding under sequence `seq`.
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    pub state: SessionState,
    pub seq: u64,
    pub file: RawFile,
}

/// A submission entered under `ticket`.
#[derive(Debug, Clone)]
pub struct Submission {
    pub state: SessionState,
    pub ticket: u64,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState<'a> {
    pub phase: PhaseKind,
    pub key: &'a str,
    pub operation: Operation,
    pub image_name: Option<&'a str>,
    pub preview: Option<&'a str>,
    pub result_image: Option<&'a str>,
    pub notice: Option<&'a Notice>,
    pub can_process: bool,
    pub can_export: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    key: Option<KeyMaterial>,
    image: Option<Arc<SourceImage>>,
    operation: Operation,
    phase: Phase,
    notice: Option<Notice>,
    ingest_seq: u64,
    revision: u64,
    submitted_revision: u64,
    last_ticket: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&KeyMaterial> {
        self.key.as_ref()
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_deref()
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The exportable result, if the last submission succeeded.
    pub fn result(&self) -> Option<&ProcessedImage> {
        match &self.phase {
            Phase::Resulted(processed) => Some(processed),
            _ => None,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, Phase::Processing { .. })
    }

    /// Sequence number of the most recently accepted file.
    pub fn ingest_seq(&self) -> u64 {
        self.ingest_seq
    }

    pub fn view(&self) -> ViewState<'_> {
        ViewState {
            phase: self.phase.kind(),
            key: self.key.as_ref().map(KeyMaterial::as_str).unwrap_or(""),
            operation: self.operation,
            image_name: self.image().map(SourceImage::name),
            preview: self.image().map(SourceImage::preview),
            result_image: self.result().map(|r| r.image.as_str()),
            notice: self.notice.as_ref(),
            can_process: matches!(self.phase, Phase::Configured | Phase::Resulted(_)),
            can_export: self.result().is_some(),
        }
    }

    /// Phase when nothing is in flight, from the inputs alone.
    fn idle_phase(&self) -> Phase {
        if self.key.is_some() && self.image.is_some() {
            Phase::Configured
        } else {
            Phase::Empty
        }
    }

    /// Record an input edit. Outside processing this drops any prior result.
    fn inputs_changed(&mut self) {
        self.revision += 1;
        if !self.is_processing() {
            self.phase = self.idle_phase();
        }
    }

    /// Validate `file` and reserve the next selection sequence for it.
    pub fn accept_file(&self, file: RawFile) -> Result<AcceptedFile, SessionError> {
        ImageIngestor::accept(&file)?;
        let mut next = self.clone();
        next.ingest_seq += 1;
        Ok(AcceptedFile {
            seq: next.ingest_seq,
            state: next,
            file,
        })
    }

    /// Check the inputs and enter Processing under a fresh ticket.
    ///
    /// Preconditions are checked in order: nothing in flight, image, key,
    /// non-empty image payload.
    pub fn request_submit(&self) -> Result<Submission, SessionError> {
        if self.is_processing() {
            return Err(SessionError::Busy);
        }
        let image = self.image().ok_or(ValidationError::MissingImage)?;
        if self.key.is_none() {
            return Err(ValidationError::MissingKey.into());
        }
        if image.bytes().is_empty() {
            return Err(ValidationError::MissingPayload.into());
        }

        let mut next = self.clone();
        next.last_ticket += 1;
        let ticket = next.last_ticket;
        next.phase = Phase::Processing { ticket };
        next.submitted_revision = self.revision;
        next.notice = None;
        Ok(Submission {
            state: next,
            ticket,
        })
    }

    /// Compute the transition for `event` without mutating `self`.
    pub fn apply(&self, event: Event) -> Result<Transition, SessionError> {
        let mut next = self.clone();

        match event {
            Event::KeyEdited(text) => {
                let key = KeyMaterial::from_user(&text);
                if key == self.key {
                    return Ok(Transition::to(next));
                }
                next.key = key;
                next.inputs_changed();
            }
            Event::KeyGenerated(key) => {
                next.key = Some(key);
                next.inputs_changed();
            }
            Event::OperationSelected(operation) => {
                next.operation = operation;
            }
            Event::FileSelected(file) => {
                let AcceptedFile { state, seq, file } = self.accept_file(file)?;
                return Ok(Transition {
                    state,
                    effect: Effect::Decode { seq, file },
                });
            }
            Event::ImageDecoded { seq, image } => {
                if seq != self.ingest_seq {
                    debug!(
                        "Discarding decode #{} of '{}': #{} is newer",
                        seq,
                        image.name(),
                        self.ingest_seq
                    );
                    return Ok(Transition::to(next));
                }
                next.image = Some(Arc::new(image));
                next.inputs_changed();
            }
            Event::SubmitRequested => {
                let Submission { state, ticket } = self.request_submit()?;
                return Ok(Transition {
                    state,
                    effect: Effect::Submit { ticket },
                });
            }
            Event::ResultReceived { ticket, result } => {
                if self.phase != (Phase::Processing { ticket }) {
                    debug!("Ignoring response for unknown submission #{}", ticket);
                    return Ok(Transition::to(next));
                }
                if self.revision != self.submitted_revision {
                    debug!("Inputs changed during submission #{}; dropping its result", ticket);
                    next.phase = next.idle_phase();
                    next.notice = Some(Notice::Info(
                        "Inputs changed while processing; result discarded".to_string(),
                    ));
                    return Ok(Transition::to(next));
                }
                match result {
                    ProcessingResult::Success(processed) => {
                        next.notice = Some(Notice::Info(processed.message.clone()));
                        next.phase = Phase::Resulted(processed);
                    }
                    ProcessingResult::Failure(failure) => {
                        next.notice = Some(Notice::Error(failure.message().to_string()));
                        next.phase = next.idle_phase();
                    }
                }
            }
        }

        Ok(Transition::to(next))
    }
}
