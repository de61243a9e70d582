mod capture;
mod cli;
mod signal;
mod watcher;

use anyhow::{Context, Result};
use capture::{run_capture, CaptureOptions};
use clap::Parser;
use cli::Commands;
use logkit::config::{self, Config, ConfigError};
use logkit::pipeline::{AppendPipeline, PipelineLayer};
use signal::Shutdown;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "logkit", version)]
#[command(about = "Page through growing log files and capture output into batched logs", long_about = None)]
struct Args {
    /// Config file (default: logkit.yaml in this or a parent directory, then the global config)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Install the stderr subscriber, plus a pipeline layer when capturing.
fn init_tracing(pipeline: Option<PipelineLayer>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(pipeline)
        .try_init();
}

fn load_config(explicit: Option<&PathBuf>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => config::load_file(path),
        None => config::load(&config::discover()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprint!("{}", e.format_cargo_style());
            std::process::exit(1);
        }
    };

    let shutdown = Shutdown::install().context("Failed to install signal handlers")?;

    match args.command {
        Commands::Page(page_args) => {
            init_tracing(None);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            cli::page::run_page(&page_args, &config.indexer, &mut out, &shutdown)?;
        }
        Commands::Capture(capture_args) => {
            let mut options = config.pipeline.options();
            if let Some(dir) = capture_args.dir {
                options.output_dir = dir;
            }
            if capture_args.file_name.is_some() {
                options.file_name = capture_args.file_name;
            }

            let mut pipeline = AppendPipeline::new(options)?;
            init_tracing(Some(PipelineLayer::new(pipeline.handle())));
            eprintln!("Capturing \"{}\" -> {}", capture_args.tag, pipeline.path().display());

            let capture_options = CaptureOptions {
                tag: capture_args.tag,
                level: capture_args.level,
            };
            run_capture(
                io::BufReader::new(io::stdin()),
                io::stdout(),
                &mut pipeline,
                &capture_options,
                &shutdown,
            )?;
        }
    }

    Ok(())
}
