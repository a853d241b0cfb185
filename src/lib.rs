//! # imgcrypt-client
//!
//! Client-side pipeline for a remote image encryption service: pick an image,
//! supply or generate a key, submit the pair, then preview and save the result.
//!
//! ```text
//! RawFile ──▶ ImageIngestor ──┐
//!                             ├──▶ SessionState ──▶ RequestBuilder ──▶ ProcessingClient
//! KeyGenerator ───────────────┘         ▲                                    │
//!                                       └──────── ProcessingResult ◀─────────┘
//!                                                        │
//!                                                 ResultExporter
//! ```

pub mod client;
pub mod common;
pub mod processing;
pub mod session;

pub use client::{ProcessedImage, ProcessingClient, ProcessingFailure, ProcessingResult};
pub use common::config::{ClientConfig, Transport};
pub use common::error::{ExportError, SessionError, ValidationError};
pub use common::messages::Operation;
pub use processing::{ImageIngestor, KeyGenerator, KeyMaterial, RawFile, ResultExporter, SourceImage};
pub use session::{Phase, PhaseKind, SessionController, SessionState};
