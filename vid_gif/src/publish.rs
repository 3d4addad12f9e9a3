//! Publishing the optimized GIF to Imgur, or keeping it local.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::IMGUR_API_ENDPOINT;
use crate::error::{Result, VidGifError};
use crate::job::ConversionJob;

/// Somewhere to put a finished GIF.
pub trait ImageHost {
    /// Upload `file` authorized by `credential`, returning its public link.
    fn upload(&self, file: &Path, credential: &str) -> Result<String>;
}

pub struct ImgurHost {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl ImgurHost {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VidGifError::network("building HTTP client", &e))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            endpoint: IMGUR_API_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl ImageHost for ImgurHost {
    fn upload(&self, file: &Path, credential: &str) -> Result<String> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned());
        let bytes = std::fs::read(file)?;
        let size = bytes.len();

        let part = reqwest::blocking::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/gif")
            .map_err(|e| VidGifError::network("preparing upload", &e))?;
        let form = reqwest::blocking::multipart::Form::new().part("image", part);

        info!(endpoint = %self.endpoint, bytes = size, "Uploading GIF");
        let operation = format!("upload to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Client-ID {}", credential))
            .multipart(form)
            .send()
            .map_err(|e| VidGifError::network(&operation, &e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| VidGifError::network(&operation, &e))?;
        debug!(status = %status, body = %body, "Image host response");

        decode_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct HostResponse {
    success: bool,
    #[serde(default)]
    data: HostData,
}

#[derive(Debug, Default, Deserialize)]
struct HostData {
    #[serde(default)]
    link: Option<String>,
    /// Usually a string; some Imgur failures nest `{ "message": ... }`.
    #[serde(default)]
    error: Option<Value>,
}

/// Interpret the `{ success, data: { link | error } }` envelope.
pub fn decode_response(body: &str) -> Result<String> {
    let response: HostResponse = serde_json::from_str(body)
        .map_err(|e| VidGifError::ResponseFormat(format!("{}: {}", e, truncate(body, 200))))?;

    if !response.success {
        return Err(VidGifError::HostingApi(error_text(response.data.error)));
    }

    response
        .data
        .link
        .filter(|link| !link.is_empty())
        .ok_or_else(|| VidGifError::ResponseFormat("success response without a link".to_string()))
}

fn error_text(error: Option<Value>) -> String {
    match error {
        Some(Value::String(message)) => message,
        Some(Value::Object(map)) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => Value::Object(map).to_string(),
        },
        Some(Value::Null) | None => "unknown error".to_string(),
        Some(other) => other.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Set the job's final reference: the hosted link, or the local output path
/// when no credential is configured.
pub fn publish(job: &mut ConversionJob, output: &Path, host: &dyn ImageHost) -> Result<String> {
    let reference = match job.credential() {
        None => {
            info!(path = %output.display(), "No credential configured, keeping GIF locally");
            eprintln!("No imgur Client ID provided. File will be retained locally.");
            output.display().to_string()
        }
        Some(credential) => host.upload(output, credential)?,
    };

    job.final_reference = Some(reference.clone());
    Ok(reference)
}
