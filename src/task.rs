use serde::{Serialize, Serializer};
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

pub const OUTPUT_SUFFIX: &str = "_with_dual_audio";
pub const OUTPUT_EXTENSION: &str = ".mkv";

/// One video file to merge. Built once per discovered file and consumed by a
/// single worker.
#[derive(Debug, Clone)]
pub struct Task {
    pub filename: OsString,
    pub video_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Task {
    pub fn video_path(&self) -> PathBuf {
        self.video_dir.join(&self.filename)
    }

    /// File name without its last extension; dotfiles keep their full name.
    pub fn base_name(&self) -> &OsStr {
        Path::new(&self.filename)
            .file_stem()
            .unwrap_or(&self.filename)
    }

    pub fn output_path(&self) -> PathBuf {
        let mut name = self.base_name().to_os_string();
        name.push(OUTPUT_SUFFIX);
        name.push(OUTPUT_EXTENSION);
        self.output_dir.join(name)
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        self.filename.to_string_lossy()
    }
}

/// How a single task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Merged {
        #[serde(serialize_with = "serialize_lossy_path")]
        output: PathBuf,
    },
    /// The video disappeared or stopped being a regular file before its turn.
    Skipped,
    Unsupported,
    NoMatchingAudio,
    Failed { reason: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Merged { .. } | Outcome::Skipped)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Merged { .. } => "Merged",
            Outcome::Skipped => "Skipped",
            Outcome::Unsupported => "Unsupported",
            Outcome::NoMatchingAudio => "No matching audio",
            Outcome::Failed { .. } => "Failed",
        }
    }
}

/// Paths are written lossily so that a non-UTF-8 file name cannot fail the report.
fn serialize_lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// A task's outcome as written to the JSON report.
#[derive(Debug, Serialize)]
pub struct TaskReport {
    pub file: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}
