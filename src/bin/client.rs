//! # Client Binary Entry Point
//!
//! Command-line front end over [`SessionController`]: it performs the same
//! steps a user would in a graphical front end (pick a file, enter or
//! generate a key, process, save the result).
//!
//! ## Usage
//!
//! ```bash
//! # Encrypt with a freshly generated key (the key is printed)
//! cargo run --bin imgcrypt -- process scan.png
//!
//! # Decrypt through the multipart deployment
//! cargo run --bin imgcrypt -- --transport multipart \
//!   process encrypted_image.png --operation decrypt --key <56 hex chars>
//!
//! # Check that the service is up
//! cargo run --bin imgcrypt -- health
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use imgcrypt_client::common::config::{ClientConfig, ServiceConfig, Transport};
use imgcrypt_client::common::logging::init_logger;
use imgcrypt_client::{
    KeyGenerator, Operation, ProcessingClient, ProcessingResult, RawFile, SessionController,
};

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the client configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Processing endpoint URL (overrides the configuration file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request encoding: json or multipart
    #[arg(long, global = true)]
    transport: Option<Transport>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh 56-character hex key
    Keygen,

    /// Send an image to the service and save the result
    Process {
        /// PNG or JPEG file to process
        image: PathBuf,

        /// Key to use; a new one is generated and printed when omitted
        #[arg(short, long)]
        key: Option<String>,

        /// encrypt or decrypt
        #[arg(long, default_value = "encrypt")]
        operation: Operation,

        /// Directory for the saved result
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the service is reachable
    Health,
}

/// Configuration file (if any) with command-line overrides applied.
fn resolve_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => ClientConfig::default(),
    };

    Ok(apply_overrides(config, args.endpoint.as_deref(), args.transport))
}

/// Apply `--endpoint` / `--transport` to a loaded configuration.
///
/// Switching transport alone also switches a default endpoint to the other
/// deployment's default, since each endpoint only understands one encoding.
fn apply_overrides(
    mut config: ClientConfig,
    endpoint: Option<&str>,
    transport: Option<Transport>,
) -> ClientConfig {
    if let Some(transport) = transport {
        let on_default_endpoint =
            config.service.endpoint == config.service.transport.default_endpoint();
        if endpoint.is_none() && on_default_endpoint {
            let timeout = config.service.request_timeout_secs;
            config.service = ServiceConfig::for_transport(transport);
            config.service.request_timeout_secs = timeout;
        } else {
            config.service.transport = transport;
        }
    }
    if let Some(endpoint) = endpoint {
        config.service.endpoint = endpoint.to_string();
    }

    let service = &config.service;
    for other in [Transport::Json, Transport::Multipart] {
        if other != service.transport && service.endpoint == other.default_endpoint() {
            warn!(
                "Endpoint {} is the default {:?} endpoint but requests will be sent as {:?}",
                service.endpoint, other, service.transport
            );
        }
    }

    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging
    init_logger(args.verbose);

    let mut config = resolve_config(&args)?;

    match args.command {
        Command::Keygen => {
            println!("{}", KeyGenerator::generate().as_str());
        }

        Command::Health => {
            let client = ProcessingClient::new(config.service)?;
            let health = client.health().await?;
            println!("{}: {}", health.status, health.message);
        }

        Command::Process {
            image,
            key,
            operation,
            output,
        } => {
            if let Some(directory) = output {
                config.output.directory = directory;
            }

            let mut session = SessionController::from_config(&config)?;
            session.select_operation(operation);

            match key {
                Some(key) => session.edit_key(&key),
                None => {
                    let key = session.generate_key();
                    println!("Generated key: {}", key.as_str());
                }
            }

            if !session.select_file(RawFile::from_path(&image)).await? {
                bail!("Could not read {}", image.display());
            }

            match session.process().await? {
                ProcessingResult::Success(processed) => {
                    println!("{}", processed.message);
                    let path = session.export()?;
                    println!("Saved {}", path.display());
                }
                ProcessingResult::Failure(failure) => {
                    bail!("Error: {}", failure.message());
                }
            }
        }
    }

    info!("Done");
    Ok(())
}
