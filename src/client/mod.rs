//! # Client Components
//!
//! The network half of the pipeline is split in two:
//!
//! ## Request construction ([`request`])
//! Turns session inputs into a request in the configured encoding.
//!
//! ## Processing client ([`client`])
//! Performs the HTTP call and normalizes the service's answer.

pub mod client;
pub mod request;

// Re-export for convenience
pub use client::{ProcessedImage, ProcessingClient, ProcessingFailure, ProcessingResult};
pub use request::{MultipartRequest, ProcessingRequest, RequestBuilder};
