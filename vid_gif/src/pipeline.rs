//! The four-stage run: resolve input, transcode and optimize, publish, clean up.

use tracing::{debug, info};

use crate::cleanup::CleanupGuard;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::input::{resolve_input, Fetcher, HttpFetcher};
use crate::job::ConversionJob;
use crate::publish::{publish, ImageHost, ImgurHost};
use crate::transcode::{ensure_distinct, CommandBackend, TranscodeBackend};

pub struct Pipeline {
    fetcher: Box<dyn Fetcher>,
    backend: Box<dyn TranscodeBackend>,
    host: Box<dyn ImageHost>,
}

impl Pipeline {
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        backend: Box<dyn TranscodeBackend>,
        host: Box<dyn ImageHost>,
    ) -> Self {
        Self {
            fetcher,
            backend,
            host,
        }
    }

    /// HTTP download, ffmpeg/gifsicle and Imgur, as configured.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.network_timeout)?;
        let host = ImgurHost::new(config.network_timeout)?.with_endpoint(&config.upload_endpoint);
        Ok(Self::new(
            Box::new(fetcher),
            Box::new(CommandBackend::new(config)),
            Box::new(host),
        ))
    }

    /// Run `job` to completion and return its final reference.
    ///
    /// Intermediate files are cleaned up on every return path once the job
    /// has passed validation.
    pub fn run(&self, job: ConversionJob) -> Result<String> {
        job.validate()?;
        debug!(source = %job.source, width = %job.width, publish = job.publishes(), "Starting conversion");

        let mut job = CleanupGuard::new(job);

        let input = resolve_input(&mut job, self.fetcher.as_ref())?;

        let width = job.width.trim().to_string();
        let target = job.output_path();
        ensure_distinct(&input, &target)?;
        let output = self.backend.transcode(&input, &width, &target)?;
        job.output = Some(output.clone());
        self.backend.optimize(&output)?;

        let reference = publish(&mut job, &output, self.host.as_ref())?;
        info!(reference = %reference, "Conversion finished");
        Ok(reference)
    }
}

/// What goes to stdout: the bare reference, or a Markdown image embed.
pub fn format_reference(reference: &str, markdown: bool) -> String {
    if markdown {
        format!("![]({})", reference)
    } else {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_reference() {
        assert_eq!(format_reference("https://x/y.gif", true), "![](https://x/y.gif)");
        assert_eq!(format_reference("https://x/y.gif", false), "https://x/y.gif");
        assert_eq!(format_reference("output.gif", true), "![](output.gif)");
    }
}
