use clap::Parser;
use std::path::PathBuf;

/// Batch-merge a second audio track into video files, matched by file name
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Directory holding the video files (not searched recursively)
    #[arg(required_unless_present = "check_ffmpeg")]
    pub video_dir: Option<PathBuf>,

    /// Directory holding the audio files to add, named like the videos
    #[arg(required_unless_present = "check_ffmpeg")]
    pub audio_dir: Option<PathBuf>,

    /// Directory for the merged files (created if missing)
    #[arg(required_unless_present = "check_ffmpeg")]
    pub output_dir: Option<PathBuf>,

    /// Number of files merged in parallel (default: available CPU cores)
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Audio extension to look for, in priority order. Repeat to build a list
    /// (default: mka, mp3, aac, wav, flac, ogg).
    #[arg(long = "audio-ext", value_name = "EXT", value_parser = parse_extension)]
    pub audio_extensions: Vec<String>,

    /// FFmpeg binary to invoke.
    #[arg(long = "ffmpeg", value_name = "PATH", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Show ffmpeg logs and debug diagnostics.
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// Exit with status 2 if any file could not be merged.
    #[arg(long)]
    pub strict: bool,

    /// Write the per-file results to this file as JSON.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Check FFmpeg installation and version, then exit.
    #[arg(short = 'c', long)]
    pub check_ffmpeg: bool,
}

/// Normalise an extension to the `.ext` form used when building candidate paths.
fn parse_extension(s: &str) -> Result<String, String> {
    let trimmed = s.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return Err(format!("invalid extension: '{}'", s));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(format!("extension must not contain a path separator: '{}'", s));
    }
    Ok(format!(".{}", trimmed))
}
