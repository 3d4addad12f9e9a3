//! Tunables for one pipeline run.

use std::time::Duration;

pub const IMGUR_API_ENDPOINT: &str = "https://api.imgur.com/3/image";

/// Environment variable consulted when `-c` is not given.
pub const CLIENT_ID_ENV: &str = "IMGUR_CLIENT_ID";

pub const DEFAULT_WIDTH: &str = "300";

/// Both the download and the upload are bounded by this.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub network_timeout: Duration,
    /// `None` lets ffmpeg and gifsicle run without a deadline.
    pub process_timeout: Option<Duration>,
    pub upload_endpoint: String,
    pub ffmpeg: String,
    pub gifsicle: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            network_timeout: NETWORK_TIMEOUT,
            process_timeout: Some(DEFAULT_PROCESS_TIMEOUT),
            upload_endpoint: IMGUR_API_ENDPOINT.to_string(),
            ffmpeg: "ffmpeg".to_string(),
            gifsicle: "gifsicle".to_string(),
        }
    }
}

impl PipelineConfig {
    /// `0` disables the deadline.
    pub fn with_process_timeout_secs(mut self, secs: u64) -> Self {
        self.process_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.network_timeout, Duration::from_secs(10));
        assert_eq!(config.process_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.upload_endpoint, "https://api.imgur.com/3/image");
        assert_eq!(config.ffmpeg, "ffmpeg");
        assert_eq!(config.gifsicle, "gifsicle");
    }

    #[test]
    fn test_zero_process_timeout_disables_deadline() {
        let config = PipelineConfig::default().with_process_timeout_secs(0);
        assert_eq!(config.process_timeout, None);

        let config = PipelineConfig::default().with_process_timeout_secs(30);
        assert_eq!(config.process_timeout, Some(Duration::from_secs(30)));
    }
}
