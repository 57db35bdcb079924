mod app;
mod audio_matcher;
mod cli;
mod discovery;
mod ffmpeg;
mod merge;
mod task;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<ExitCode> {
    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage errors exit with 1, --help and --version with 0.
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            e.print()?;
            return Ok(code);
        }
    };

    print_banner();
    init_tracing(args.debug);
    app::run(args)
}

fn print_banner() {
    println!("|------------------------------------------------------------------------|");
    println!(
        "|{:-^72}|",
        format!("Batch applying audio files to video v{}", env!("CARGO_PKG_VERSION"))
    );
    println!("|------------------------------------------------------------------------|");
    println!();
    println!("TIP: Matching is done by filename, e.g. \"episode1.mkv\" + \"episode1.mka\"\n");
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "apply_audio=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
