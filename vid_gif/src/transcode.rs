//! Video → GIF conversion (ffmpeg) and in-place optimization (gifsicle).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use shared_utils::{find_tool, run_tool, safe_path_arg};

use crate::config::PipelineConfig;
use crate::error::{Result, VidGifError};

/// The two external media operations the pipeline needs.
pub trait TranscodeBackend {
    /// Convert `input` into an animated GIF `width` pixels wide at `output`.
    fn transcode(&self, input: &Path, width: &str, output: &Path) -> Result<PathBuf>;

    /// Losslessly shrink the GIF at `path` in place.
    fn optimize(&self, path: &Path) -> Result<()>;
}

/// Shells out to `ffmpeg` and `gifsicle`.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    pub ffmpeg: String,
    pub gifsicle: String,
    pub timeout: Option<Duration>,
}

impl CommandBackend {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg.clone(),
            gifsicle: config.gifsicle.clone(),
            timeout: config.process_timeout,
        }
    }

    /// Run one tool, turning a non-zero exit or an expired deadline into
    /// the stage's error via `failure(status, diagnostics)`.
    fn run(
        &self,
        tool: &str,
        args: &[String],
        failure: fn(String, String) -> VidGifError,
    ) -> Result<()> {
        let program = find_tool(tool).ok_or_else(|| VidGifError::ToolNotFound(tool.to_string()))?;

        let output = run_tool(&program.to_string_lossy(), args, self.timeout)
            .map_err(|e| failure("failed to start".to_string(), format!("{:#}", e)))?;

        if output.success() {
            Ok(())
        } else {
            Err(failure(output.status_line(self.timeout), output.stderr))
        }
    }
}

/// Refuse to write the GIF over the file being converted.
pub fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    let same = input == output
        || matches!(
            (fs::canonicalize(input), fs::canonicalize(output)),
            (Ok(a), Ok(b)) if a == b
        );
    if same {
        return Err(VidGifError::Validation(format!(
            "Input {} is the same file as the output",
            input.display()
        )));
    }
    Ok(())
}

pub fn ffmpeg_args(input: &Path, width: &str, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        safe_path_arg(input).into_owned(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-vf".to_string(),
        format!("scale={}:-1", width),
        "-f".to_string(),
        "gif".to_string(),
        safe_path_arg(output).into_owned(),
    ]
}

pub fn gifsicle_args(path: &Path) -> Vec<String> {
    vec![
        "--careful".to_string(),
        "-O3".to_string(),
        "--batch".to_string(),
        safe_path_arg(path).into_owned(),
    ]
}

impl TranscodeBackend for CommandBackend {
    fn transcode(&self, input: &Path, width: &str, output: &Path) -> Result<PathBuf> {
        ensure_distinct(input, output)?;
        info!(input = %input.display(), width, output = %output.display(), "Converting to GIF");

        // Only a file this run created may be removed on failure.
        let existed_before = output.exists();
        let result = self.run(&self.ffmpeg, &ffmpeg_args(input, width, output), |status, diagnostics| {
            VidGifError::Transcode { status, diagnostics }
        });

        if let Err(e) = result {
            if matches!(e, VidGifError::Transcode { .. }) && !existed_before && output.exists() {
                if let Err(remove_err) = fs::remove_file(output) {
                    warn!(path = %output.display(), error = %remove_err, "Failed to remove partial GIF");
                }
            }
            return Err(e);
        }

        Ok(output.to_path_buf())
    }

    fn optimize(&self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "Optimizing GIF");

        let before = fs::metadata(path).map(|m| m.len()).ok();
        self.run(&self.gifsicle, &gifsicle_args(path), |status, diagnostics| {
            VidGifError::Optimize { status, diagnostics }
        })?;

        if let (Some(before), Ok(after)) = (before, fs::metadata(path).map(|m| m.len())) {
            info!(before_bytes = before, after_bytes = after, "GIF optimized");
        }
        Ok(())
    }
}
