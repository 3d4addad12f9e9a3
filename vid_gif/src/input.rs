//! Input resolution: download remote sources, check local ones.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{Result, VidGifError};
use crate::job::{ConversionJob, TEMP_FILE_NAME};

/// `.gifv` is Imgur's HTML wrapper around an `.mp4`.
const GIFV_EXTENSION: &str = "gifv";
const GIFV_TARGET_EXTENSION: &str = "mp4";

/// Downloads a remote source into a local file.
pub trait Fetcher {
    /// Stream `url` into `destination`, returning the number of bytes written.
    fn fetch(&self, url: &Url, destination: &Path) -> Result<u64>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VidGifError::network("building HTTP client", &e))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url, destination: &Path) -> Result<u64> {
        let operation = format!("download {}", url);

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| VidGifError::network(&operation, &e))?;

        let mut file = File::create(destination)?;
        let written = response
            .copy_to(&mut file)
            .map_err(|e| VidGifError::network(&operation, &e))?;

        debug!(url = %url, bytes = written, path = %destination.display(), "Download complete");
        Ok(written)
    }
}

/// A remote source after alias rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub url: Url,
    /// Extension including the leading dot, or empty.
    pub extension: String,
}

impl RemoteSource {
    pub fn parse(reference: &str) -> Result<Self> {
        let mut url = Url::parse(reference).map_err(|source| VidGifError::Url {
            url: reference.to_string(),
            source,
        })?;

        let mut extension = path_extension(url.path()).to_string();

        if extension == GIFV_EXTENSION {
            let rewritten = url
                .path()
                .strip_suffix(GIFV_EXTENSION)
                .map(|stem| format!("{}{}", stem, GIFV_TARGET_EXTENSION));
            if let Some(rewritten) = rewritten {
                url.set_path(&rewritten);
                extension = GIFV_TARGET_EXTENSION.to_string();
            }
        }

        let extension = if extension.is_empty() {
            extension
        } else {
            format!(".{}", extension)
        };

        Ok(Self { url, extension })
    }

    pub fn local_file_name(&self) -> String {
        format!("{}{}", TEMP_FILE_NAME, self.extension)
    }
}

/// Extension of the last path segment, without the dot. A path ending in
/// `/` has none.
fn path_extension(path: &str) -> &str {
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(dot) => &segment[dot + 1..],
        None => "",
    }
}

pub fn is_remote(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Point `job.resolved_input` at a local copy of the source.
pub fn resolve_input(job: &mut ConversionJob, fetcher: &dyn Fetcher) -> Result<PathBuf> {
    if is_remote(&job.source) {
        let remote = RemoteSource::parse(&job.source)?;
        let destination = job.artifact_path(&remote.local_file_name());
        job.resolved_input = Some(destination.clone());

        info!(url = %remote.url, path = %destination.display(), "Downloading source");
        fetcher.fetch(&remote.url, &destination)?;
        return Ok(destination);
    }

    let path = PathBuf::from(&job.source);
    job.resolved_input = Some(path.clone());
    if !path.exists() {
        return Err(VidGifError::NotFound(path));
    }
    debug!(path = %path.display(), "Using local source");
    Ok(path)
}
