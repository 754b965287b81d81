use clap::{Parser, Subcommand, ValueEnum};
use fotomat::imaging::RustBackend;
use fotomat::output::{self, BatchOutcome, StatusDocument};
use fotomat::types::path_from_image_url;
use fotomat::{Dispatcher, ProcessingRequest, config};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "fotomat")]
#[command(about = "Category-aware image transformation: full-size and thumbnail variants")]
#[command(long_about = "\
Category-aware image transformation: full-size and thumbnail variants

Each request names an uploaded image, a destination directory and a
thumbnail height. Two artifacts are written under the destination:

  <destDir>/full/<name>.jpg        cropped, oriented or watermarked JPEG
  <destDir>/thumbnail/<name>.png   aspect-preserving thumbnail

Branches:

  images/profile/  JPEG/PNG   square crop; thumbnail of the crop (GIF rejected)
  any other        GIF        every frame resized; original moved to full/
  any other        JPEG/PNG   thumbnail; full is watermarked or auto-oriented

The upload is removed once both artifacts are written.

Run 'fotomat gen-config' to generate a documented fotomat.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for destDir and fonts (overrides work_dir in the config)
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// Log output format (written to stderr; level from RUST_LOG, default info)
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

/// Flags for a single processing request.
#[derive(clap::Args)]
struct ProcessArgs {
    /// Destination directory, e.g. images/forum/
    #[arg(long)]
    dest_dir: String,

    /// Thumbnail height in pixels
    #[arg(long)]
    height: u32,

    /// Watermark text for the full image
    #[arg(long)]
    watermark: Option<String>,

    /// Watermark placement: Center, BottomLeft, Bottom (default bottom-right)
    #[arg(long)]
    gravity: Option<String>,

    /// Uploaded image (path or file:// URL)
    image: String,
}

#[derive(Subcommand)]
enum Command {
    /// Process one uploaded image and print a JSON status document
    Process(ProcessArgs),
    /// Process JSON request files in parallel
    Batch {
        /// Files holding {"destDir", "imageURL", "height", "watermark", "gravity"}
        #[arg(required = true)]
        requests: Vec<PathBuf>,
    },
    /// Print an image's mimetype
    Type {
        /// Image to identify
        image: PathBuf,
    },
    /// Print a stock fotomat.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Process(args) => {
            let service_config = load_service_config(cli.config.as_deref(), cli.work_dir)?;
            let dispatcher = Dispatcher::new(RustBackend::new(), &service_config);
            let request = ProcessingRequest {
                dest_dir: args.dest_dir,
                image_url: path_from_image_url(&args.image),
                height: args.height,
                watermark: args.watermark,
                gravity: args.gravity,
            };
            let document = StatusDocument::from_result(&dispatcher.process(&request));
            println!("{}", output::format_status(&document)?);
            if !document.is_ok() {
                std::process::exit(1);
            }
        }
        Command::Batch { requests } => {
            let service_config = load_service_config(cli.config.as_deref(), cli.work_dir)?;
            init_thread_pool(&service_config.processing);
            let dispatcher = Dispatcher::new(RustBackend::new(), &service_config);
            let outcomes: Vec<BatchOutcome> = requests
                .par_iter()
                .map(|path| run_request_file(&dispatcher, path))
                .collect();
            output::print_batch_output(&outcomes);
            if outcomes.iter().any(|outcome| !outcome.document.is_ok()) {
                std::process::exit(1);
            }
        }
        Command::Type { image } => {
            let service_config = load_service_config(cli.config.as_deref(), cli.work_dir)?;
            let dispatcher = Dispatcher::new(RustBackend::new(), &service_config);
            println!("{}", dispatcher.identify(&image)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file (or defaults) and apply the `--work-dir` override.
fn load_service_config(
    path: Option<&Path>,
    work_dir: Option<PathBuf>,
) -> Result<config::ServiceConfig, config::ConfigError> {
    let mut service_config = config::load_config(path)?;
    if let Some(work_dir) = work_dir {
        service_config.work_dir = work_dir;
    }
    Ok(service_config)
}

/// Read one JSON request file and run it.
fn run_request_file(dispatcher: &Dispatcher<RustBackend>, path: &Path) -> BatchOutcome {
    let label = path.display().to_string();
    let request = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read request file: {err}"))
        .and_then(|json| {
            serde_json::from_str::<ProcessingRequest>(&json)
                .map_err(|err| format!("invalid request file: {err}"))
        });
    let document = match request {
        Ok(request) => StatusDocument::from_result(&dispatcher.process(&request)),
        Err(reason) => {
            tracing::warn!(request = %label, %reason, "skipping request");
            StatusDocument::failed(400, reason)
        }
    };
    BatchOutcome { label, document }
}

/// Install the fmt subscriber on stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };
    if let Err(err) = result {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
