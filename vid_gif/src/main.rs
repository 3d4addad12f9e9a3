use clap::Parser;
use std::path::PathBuf;
use tracing::{error, Level};

use shared_utils::logging::{init_logging, LogConfig};
use vid_gif::{format_reference, ConversionJob, Pipeline, PipelineConfig, CLIENT_ID_ENV, DEFAULT_WIDTH};

#[derive(Parser)]
#[command(name = "vid-gif")]
#[command(version, about = "Convert a video or .gifv into an optimized GIF and share it via Imgur", long_about = None)]
struct Cli {
    /// URL or path of the .gifv or video to convert
    #[arg(short = 'i', long, default_value = "")]
    input: String,

    /// Width of the final GIF in pixels
    #[arg(short = 'w', long, default_value = DEFAULT_WIDTH)]
    width: String,

    /// Imgur Client ID
    #[arg(short = 'c', long = "client-id", env = CLIENT_ID_ENV, hide_env_values = true)]
    client_id: Option<String>,

    /// Keep intermediary files created during conversion
    #[arg(short = 'k', long = "keep")]
    keep: bool,

    /// Print Markdown for quick copy/paste
    #[arg(short = 'm', long)]
    markdown: bool,

    /// Directory for the downloaded source and the GIF (default: current directory)
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Seconds ffmpeg and gifsicle may each run; 0 waits indefinitely
    #[arg(long, default_value_t = 600)]
    process_timeout: u64,

    /// Log debug detail, and mirror the log onto stderr
    #[arg(long)]
    verbose: bool,
}

fn log_config(verbose: bool) -> LogConfig {
    let config = LogConfig::default().with_stderr(verbose);
    if verbose {
        config.with_level(Level::DEBUG)
    } else {
        config
    }
}

/// The single line written to stdout on success.
fn render(reference: &str, markdown: bool) -> String {
    format!("{}\n", format_reference(reference, markdown))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging("vid_gif", log_config(cli.verbose)) {
        eprintln!("⚠️  Could not initialize logging: {:#}", e);
    }

    let job = ConversionJob::new(cli.input)
        .with_width(cli.width)
        .with_credential(cli.client_id)
        .with_keep_files(cli.keep)
        .with_work_dir(cli.work_dir);

    let config = PipelineConfig::default().with_process_timeout_secs(cli.process_timeout);

    let result = Pipeline::from_config(&config).and_then(|pipeline| pipeline.run(job));
    match result {
        Ok(reference) => print!("{}", render(&reference, cli.markdown)),
        Err(e) => {
            error!(error = %e, exit_code = e.exit_code(), "Conversion failed");
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
