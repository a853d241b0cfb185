//! # Session
//!
//! The in-memory state of one user session and the controller that drives it.
//!
//! ## State ([`state`])
//! Pure transitions from (state, event) to (state, effect). Testable without
//! any I/O.
//!
//! ## Controller ([`controller`])
//! Runs the effects: decodes files, sends requests, saves results.

pub mod controller;
pub mod state;

pub use controller::{DecodedImage, PendingDecode, PendingSubmission, SessionController};
pub use state::{
    AcceptedFile, Effect, Event, Notice, Phase, PhaseKind, SessionState, Submission, Transition,
    ViewState,
};
