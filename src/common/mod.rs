//! # Common Components
//!
//! Shared utilities and data structures used by the client pipeline and the
//! stub server.
//!
//! ## Modules
//!
//! - [`messages`]: Wire types of the processing service
//! - [`config`]: Configuration parsing utilities
//! - [`error`]: Local error taxonomy
//! - [`logging`]: Log format shared by the binaries

pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
