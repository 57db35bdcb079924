use regex::Regex;
use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    sync::LazyLock,
};
use thiserror::Error;

const MINIMUM_FFMPEG_MAJOR_VERSION: u32 = 4;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ffmpeg version n?(\d+)\.(\d+)(?:\.(\d+))?").expect("valid version regex")
});

pub const INSTALL_GUIDANCE: &str = "\
[❌] FFmpeg not found on your system.

FFmpeg is required for this tool to work.
Please install it from: https://ffmpeg.org/download.html

Windows:
    https://www.gyan.dev/ffmpeg/
    (add ffmpeg/bin to your PATH)

macOS:
    brew install ffmpeg

Linux:
    sudo apt install ffmpeg

Exiting.";

#[derive(Debug)]
pub struct FFmpegVersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub is_compatible: bool,
}

#[derive(Debug)]
pub struct FFmpegCheckResult {
    pub ffmpeg_available: bool,
    pub ffmpeg_version: Option<FFmpegVersionInfo>,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum FFmpegError {
    #[error("`{0}` command not found. Please ensure it is installed and in your PATH.")]
    CommandNotFound(String),
    #[error("Failed to launch `{0}`: {1}")]
    LaunchFailed(String, io::Error),
    #[error("FFmpeg exited with {0}")]
    CommandFailed(ExitStatus),
}

/// Handle on the external ffmpeg binary. Cheap to clone and shared read-only
/// by every worker.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
    debug: bool,
}

impl Ffmpeg {
    pub fn new(binary: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            binary: binary.into(),
            debug,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn name(&self) -> String {
        self.binary.display().to_string()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        if !self.debug {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        command
    }

    /// Runs ffmpeg with `args`, turning a launch failure or a non-zero exit
    /// status into an error.
    pub fn run<I, S>(&self, args: I) -> Result<(), FFmpegError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = self.command();
        command.args(args);
        tracing::debug!(?command, "running ffmpeg");

        let status = command.status().map_err(|e| self.launch_error(e))?;
        if !status.success() {
            return Err(FFmpegError::CommandFailed(status));
        }
        Ok(())
    }

    fn launch_error(&self, e: io::Error) -> FFmpegError {
        if e.kind() == io::ErrorKind::NotFound {
            FFmpegError::CommandNotFound(self.name())
        } else {
            FFmpegError::LaunchFailed(self.name(), e)
        }
    }

    /// Checks that the binary can be launched at all. The exit status of
    /// `-version` is ignored.
    pub fn check_dependency(&self) -> Result<(), FFmpegError> {
        match Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(_) => Ok(()),
            Err(e) => Err(self.launch_error(e)),
        }
    }

    pub fn is_available(&self) -> bool {
        match self.check_dependency() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("ffmpeg lookup failed: {}", e);
                false
            }
        }
    }

    /// Decodes the whole file without writing anything. Only a clean exit
    /// counts as supported; failing to launch ffmpeg counts as unsupported.
    pub fn is_supported(&self, path: &Path) -> bool {
        let args = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-i"),
            path.as_os_str(),
            OsStr::new("-f"),
            OsStr::new("null"),
            OsStr::new("-"),
        ];
        match self.run(args) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("validation of {} failed: {}", path.display(), e);
                false
            }
        }
    }

    /// Writes `output` with every stream of `video` plus the audio streams
    /// of `audio`, stream-copied and cut to the shorter input. An existing
    /// `output` is overwritten.
    pub fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), FFmpegError> {
        self.run([
            OsStr::new("-y"),
            OsStr::new("-i"),
            video.as_os_str(),
            OsStr::new("-i"),
            audio.as_os_str(),
            OsStr::new("-map"),
            OsStr::new("0"),
            OsStr::new("-map"),
            OsStr::new("1:a"),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-shortest"),
            output.as_os_str(),
        ])
    }

    pub fn check_installation(&self) -> FFmpegCheckResult {
        let mut result = FFmpegCheckResult {
            ffmpeg_available: false,
            ffmpeg_version: None,
            error: None,
        };

        match Command::new(&self.binary).arg("-version").output() {
            Ok(output) => {
                if output.status.success() {
                    result.ffmpeg_available = true;
                    let version_info = String::from_utf8_lossy(&output.stdout);
                    result.ffmpeg_version = parse_version(&version_info);
                } else {
                    result.error = Some(format!(
                        "`{} -version` exited with {}",
                        self.name(),
                        output.status
                    ));
                }
            }
            Err(e) => {
                if e.kind() == io::ErrorKind::NotFound {
                    result.error = Some("FFmpeg not found in PATH".to_string());
                } else {
                    result.error = Some(format!("Failed to check FFmpeg: {}", e));
                }
            }
        }

        result
    }
}

fn parse_version(version_info: &str) -> Option<FFmpegVersionInfo> {
    let caps = VERSION_RE.captures(version_info)?;
    let major: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minor: u32 = caps.get(2)?.as_str().parse().ok()?;
    let patch: u32 = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap_or(0));

    Some(FFmpegVersionInfo {
        major,
        minor,
        patch,
        is_compatible: major >= MINIMUM_FFMPEG_MAJOR_VERSION,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_version() {
        let info = parse_version("ffmpeg version 7.1.1 Copyright (c) 2000-2025").unwrap();
        assert_eq!((info.major, info.minor, info.patch), (7, 1, 1));
        assert!(info.is_compatible);
    }

    #[test]
    fn parses_version_without_patch() {
        let info = parse_version("ffmpeg version n6.0 Copyright").unwrap();
        assert_eq!((info.major, info.minor, info.patch), (6, 0, 0));
    }

    #[test]
    fn old_version_is_incompatible() {
        let info = parse_version("ffmpeg version 3.4.8").unwrap();
        assert!(!info.is_compatible);
    }

    #[test]
    fn git_builds_have_no_version() {
        assert!(parse_version("ffmpeg version N-112345-gabcdef").is_none());
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let ffmpeg = Ffmpeg::new("/nonexistent/definitely-not-ffmpeg", false);
        assert!(!ffmpeg.is_available());
        assert!(matches!(
            ffmpeg.check_dependency(),
            Err(FFmpegError::CommandNotFound(_))
        ));
        let check = ffmpeg.check_installation();
        assert!(!check.ffmpeg_available);
        assert!(check.error.is_some());
    }

    #[test]
    fn missing_binary_means_unsupported() {
        let ffmpeg = Ffmpeg::new("/nonexistent/definitely-not-ffmpeg", false);
        assert!(!ffmpeg.is_supported(Path::new("video.mkv")));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_decides_support() {
        assert!(Ffmpeg::new("true", false).is_supported(Path::new("video.mkv")));
        assert!(!Ffmpeg::new("false", false).is_supported(Path::new("video.mkv")));
    }

    #[cfg(unix)]
    #[test]
    fn failed_merge_reports_status() {
        let err = Ffmpeg::new("false", false)
            .merge(Path::new("v.mkv"), Path::new("a.mka"), Path::new("out.mkv"))
            .unwrap_err();
        assert!(matches!(err, FFmpegError::CommandFailed(_)));
    }
}
