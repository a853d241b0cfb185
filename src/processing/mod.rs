//! # Local Image Handling
//!
//! Everything the pipeline does on this machine, without the network:
//! key generation, file ingestion, and saving results.

pub mod export;
pub mod ingest;
pub mod key;

// Re-export main types for convenience
pub use export::{export_filename, Download, ResultExporter};
pub use ingest::{FileOrigin, ImageIngestor, RawFile, SourceImage, ACCEPTED_MIME_TYPES};
pub use key::{KeyGenerator, KeyMaterial, KEY_LENGTH};
