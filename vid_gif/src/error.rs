use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidGifError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Input file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("ffmpeg failed ({status}): {diagnostics}")]
    Transcode { status: String, diagnostics: String },

    #[error("gifsicle failed ({status}): {diagnostics}")]
    Optimize { status: String, diagnostics: String },

    #[error("Unexpected response from image host: {0}")]
    ResponseFormat(String),

    #[error("imgur error: {0}")]
    HostingApi(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VidGifError {
    /// Process exit code for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            VidGifError::Validation(_) => 2,
            VidGifError::Url { .. } => 3,
            VidGifError::NotFound(_) => 4,
            VidGifError::Network(_) => 5,
            VidGifError::Transcode { .. } => 6,
            VidGifError::Optimize { .. } => 7,
            VidGifError::ResponseFormat(_) => 8,
            VidGifError::HostingApi(_) => 9,
            VidGifError::ToolNotFound(_) => 10,
            VidGifError::Io(_) => 11,
        }
    }

    /// Wrap a transport error, keeping its full cause chain in the message.
    pub(crate) fn network(operation: &str, error: &dyn std::error::Error) -> Self {
        let mut message = format!("{}: {}", operation, error);
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {}", cause));
            source = cause.source();
        }
        VidGifError::Network(message)
    }
}

pub type Result<T> = std::result::Result<T, VidGifError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io;

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let errors = vec![
            VidGifError::Validation("blank".into()),
            VidGifError::Url {
                url: "http://".into(),
                source: url::ParseError::EmptyHost,
            },
            VidGifError::Network("timeout".into()),
            VidGifError::NotFound(PathBuf::from("missing.mp4")),
            VidGifError::Transcode {
                status: "exit status: 1".into(),
                diagnostics: String::new(),
            },
            VidGifError::Optimize {
                status: "exit status: 1".into(),
                diagnostics: String::new(),
            },
            VidGifError::ResponseFormat("not json".into()),
            VidGifError::HostingApi("rate limited".into()),
            VidGifError::ToolNotFound("ffmpeg".into()),
            VidGifError::Io(io::Error::new(io::ErrorKind::Other, "disk full")),
        ];

        let codes: HashSet<i32> = errors.iter().map(|e| e.exit_code()).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
        assert!(!codes.contains(&1));
    }

    #[test]
    fn test_transcode_message_carries_diagnostics() {
        let err = VidGifError::Transcode {
            status: "exit status: 1".into(),
            diagnostics: "Invalid data found when processing input".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit status: 1"));
        assert!(msg.contains("Invalid data found"));
    }

    #[test]
    fn test_network_keeps_cause_chain() {
        let inner = io::Error::new(io::ErrorKind::TimedOut, "operation timed out");
        let err = VidGifError::network("download https://example.com/a.mp4", &inner);
        assert_eq!(
            err.to_string(),
            "Network error: download https://example.com/a.mp4: operation timed out"
        );
    }
}
