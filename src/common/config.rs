//! # Configuration Utilities
//!
//! Client configuration and the TOML loading helper shared by both binaries.
//!
//! # Example TOML
//!
//! ```toml
//! [service]
//! endpoint = "http://localhost:5000/api/process"
//! transport = "multipart"
//! request_timeout_secs = 60
//!
//! [output]
//! directory = "user-data/outputs"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default endpoint of the JSON/base64 deployment.
pub const DEFAULT_JSON_ENDPOINT: &str = "http://127.0.0.1:5000/api/process_base64";

/// Default endpoint of the multipart deployment.
pub const DEFAULT_MULTIPART_ENDPOINT: &str = "http://localhost:5000/api/process";

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: ClientConfig = load_config("config/client.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// How a processing request is encoded on the wire.
///
/// The two variants correspond to two separate deployments of the service and
/// are not interchangeable: each endpoint only understands its own encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// `application/json` body with the image as a bare base64 string.
    #[default]
    Json,
    /// `multipart/form-data` body with the raw file as the `image` part.
    Multipart,
}

impl Transport {
    /// Endpoint used when no explicit one is configured.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Transport::Json => DEFAULT_JSON_ENDPOINT,
            Transport::Multipart => DEFAULT_MULTIPART_ENDPOINT,
        }
    }
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Transport::Json),
            "multipart" => Ok(Transport::Multipart),
            other => Err(format!("unknown transport '{}' (expected json or multipart)", other)),
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where and how to reach the processing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Full URL of the processing endpoint
    pub endpoint: String,
    /// Request encoding expected by `endpoint`
    #[serde(default)]
    pub transport: Transport,
    /// Transport-level timeout for one request; no timeout when absent
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ServiceConfig {
    /// Configuration pointing at the default endpoint of `transport`.
    pub fn for_transport(transport: Transport) -> Self {
        Self {
            endpoint: transport.default_endpoint().to_string(),
            transport,
            request_timeout_secs: None,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::for_transport(Transport::default())
    }
}

/// Where exported results are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    /// Loads client configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }
}
