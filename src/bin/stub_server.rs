//! Local stand-in for the image processing service.
//!
//! Speaks the same wire contract as the real deployments so the client can be
//! exercised end to end without them:
//! - `POST /api/process`         multipart: `image`, `key`, `operation`
//! - `POST /api/process_base64`  JSON: `{ image, key, operation }`
//! - `GET  /api/health`
//!
//! Requests are validated the way the real service does it. The "processed"
//! image is the input converted to an 8-bit grayscale PNG; no encryption
//! happens here.

use axum::{
    body::Bytes,
    extract::multipart::Multipart,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use clap::Parser;
use log::{error, info, warn};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use imgcrypt_client::common::logging::init_logger;
use imgcrypt_client::common::messages::{data_uri, HealthStatus, Operation, ProcessResponse};

/// Minimum key length accepted by the service.
const MIN_KEY_LENGTH: usize = 8;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    addr: String,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

/// JSON body with every field optional so missing ones get a precise error.
#[derive(Debug, Default, Deserialize)]
struct IncomingJson {
    image: Option<String>,
    key: Option<String>,
    operation: Option<String>,
}

type Reply = (StatusCode, Json<ProcessResponse>);

fn reject(status: StatusCode, error: impl Into<String>) -> Reply {
    let error = error.into();
    warn!("Rejected request: {}", error);
    (status, Json(ProcessResponse::failed(error)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let app = Router::new()
        .route("/api/process", post(process_multipart))
        .route("/api/process_base64", post(process_base64))
        .route("/api/health", get(health_check))
        .layer(CorsLayer::permissive());

    info!("🚀 Stub processing service on http://{}", args.addr);
    info!("📡 POST /api/process, POST /api/process_base64, GET /api/health");

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy".to_string(),
        message: "Image Encryption API is running".to_string(),
    })
}

/// Check `key` and `operation` the way the service does.
fn validate(key: Option<&str>, operation: Option<&str>) -> Result<Operation, String> {
    let key = key.ok_or("No encryption key provided")?;
    let operation = operation.ok_or("No operation specified")?.parse::<Operation>()?;

    if key.chars().count() < MIN_KEY_LENGTH {
        return Err(format!(
            "Encryption key must be at least {} characters long",
            MIN_KEY_LENGTH
        ));
    }

    Ok(operation)
}

/// Decode `image_bytes`, convert to grayscale and re-encode as a PNG data URI.
async fn transform(image_bytes: Vec<u8>) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let gray = image::load_from_memory(&image_bytes)?.to_luma8();
        let mut output_bytes = Vec::new();
        gray.write_to(
            &mut std::io::Cursor::new(&mut output_bytes),
            image::ImageFormat::Png,
        )?;
        Ok(data_uri(
            "image/png",
            &general_purpose::STANDARD.encode(&output_bytes),
        ))
    })
    .await?
}

async fn respond(image_bytes: Vec<u8>, operation: Operation) -> Reply {
    info!(
        "📥 {} request with {} bytes of image data",
        operation,
        image_bytes.len()
    );
    match transform(image_bytes).await {
        Ok(image) => (
            StatusCode::OK,
            Json(ProcessResponse::ok(
                image,
                format!("Image {} successfully", operation.past_tense()),
                operation,
            )),
        ),
        Err(e) => {
            error!("❌ Processing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessResponse::failed(e.to_string())),
            )
        }
    }
}

async fn process_base64(body: Bytes) -> Reply {
    let incoming: IncomingJson = match serde_json::from_slice(&body) {
        Ok(incoming) => incoming,
        Err(_) => return reject(StatusCode::BAD_REQUEST, "No JSON data provided"),
    };

    let image = match incoming.image {
        Some(image) => image,
        None => return reject(StatusCode::BAD_REQUEST, "No image base64 provided"),
    };
    let operation = match validate(incoming.key.as_deref(), incoming.operation.as_deref()) {
        Ok(operation) => operation,
        Err(e) => return reject(StatusCode::BAD_REQUEST, e),
    };

    let image_bytes = match general_purpose::STANDARD.decode(image.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            return reject(
                StatusCode::BAD_REQUEST,
                format!("Invalid base64 image: {}", e),
            )
        }
    };

    respond(image_bytes, operation).await
}

async fn process_multipart(mut multipart: Multipart) -> Reply {
    let mut image: Option<Vec<u8>> = None;
    let mut key: Option<String> = None;
    let mut operation: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return reject(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart data: {}", e),
                )
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => match field.bytes().await {
                Ok(data) => image = Some(data.to_vec()),
                Err(e) => {
                    return reject(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read image data: {}", e),
                    )
                }
            },
            "key" | "operation" => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) => {
                        return reject(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read field '{}': {}", name, e),
                        )
                    }
                };
                if name == "key" {
                    key = Some(value);
                } else {
                    operation = Some(value);
                }
            }
            _ => {}
        }
    }

    let image = match image {
        Some(image) => image,
        None => return reject(StatusCode::BAD_REQUEST, "No image file provided"),
    };
    let operation = match validate(key.as_deref(), operation.as_deref()) {
        Ok(operation) => operation,
        Err(e) => return reject(StatusCode::BAD_REQUEST, e),
    };

    respond(image, operation).await
}
