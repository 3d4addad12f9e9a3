//! The conversion job: one invocation's input, artifacts and options.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_WIDTH;
use crate::error::{Result, VidGifError};

/// Base name of a downloaded source; the remote extension is appended.
pub const TEMP_FILE_NAME: &str = "temp_file_to_convert";
pub const OUTPUT_FILE_NAME: &str = "output.gif";

#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// URL or local path as given by the user, trimmed.
    pub source: String,
    /// Local file fed to the transcoder. Equals `source` for local inputs.
    pub resolved_input: Option<PathBuf>,
    pub width: String,
    pub credential: Option<String>,
    /// Set once ffmpeg has produced the GIF.
    pub output: Option<PathBuf>,
    pub final_reference: Option<String>,
    pub keep_files: bool,
    /// Where the temp input and the output land; the process cwd when `None`.
    pub work_dir: Option<PathBuf>,
}

impl ConversionJob {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into().trim().to_string(),
            resolved_input: None,
            width: DEFAULT_WIDTH.to_string(),
            credential: None,
            output: None,
            final_reference: None,
            keep_files: false,
            work_dir: None,
        }
    }

    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = width.into();
        self
    }

    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_keep_files(mut self, keep: bool) -> Self {
        self.keep_files = keep;
        self
    }

    pub fn with_work_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.work_dir = dir;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.is_empty() {
            return Err(VidGifError::Validation(
                "You must provide an input URL or path".to_string(),
            ));
        }

        match self.width.trim().parse::<u32>() {
            Ok(w) if w > 0 => Ok(()),
            _ => Err(VidGifError::Validation(format!(
                "Width must be a positive number of pixels, got {:?}",
                self.width
            ))),
        }
    }

    /// The trimmed credential, or `None` when absent or blank.
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// An upload is attempted whenever a usable credential is configured.
    pub fn publishes(&self) -> bool {
        self.credential().is_some()
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        match &self.work_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.artifact_path(OUTPUT_FILE_NAME)
    }

    /// Files this run created and does not hand over to the user.
    ///
    /// The input is only included when it is not the user's own file; the
    /// output only when it went to the image host.
    pub fn cleanup_targets(&self) -> Vec<PathBuf> {
        if self.keep_files {
            return Vec::new();
        }

        let mut targets = Vec::new();
        if let Some(input) = &self.resolved_input {
            if input.as_path() != Path::new(&self.source) {
                targets.push(input.clone());
            }
        }
        if self.publishes() {
            if let Some(output) = &self.output {
                targets.push(output.clone());
            }
        }
        targets
    }
}
