//! vid-gif - turn a video or `.gifv` link into an optimized GIF
//!
//! Pipeline:
//! - resolve the input (download remote sources, `.gifv` → `.mp4`)
//! - convert with ffmpeg, optimize in place with gifsicle
//! - upload to Imgur when a Client-ID is configured, else keep the file
//! - remove intermediate files
//!
//! ```rust,ignore
//! use vid_gif::{ConversionJob, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::from_config(&PipelineConfig::default())?;
//! let link = pipeline.run(ConversionJob::new("https://i.imgur.com/abc.gifv"))?;
//! ```

pub mod cleanup;
pub mod config;
pub mod error;
pub mod input;
pub mod job;
pub mod pipeline;
pub mod publish;
pub mod transcode;

pub use cleanup::CleanupGuard;
pub use config::{PipelineConfig, CLIENT_ID_ENV, DEFAULT_WIDTH, IMGUR_API_ENDPOINT};
pub use error::{Result, VidGifError};
pub use input::{Fetcher, HttpFetcher, RemoteSource};
pub use job::ConversionJob;
pub use pipeline::{format_reference, Pipeline};
pub use publish::{ImageHost, ImgurHost};
pub use transcode::{CommandBackend, TranscodeBackend};
