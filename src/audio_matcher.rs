use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Multi-track containers first, then lossy, then lossless codecs.
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &[".mka", ".mp3", ".aac", ".wav", ".flac", ".ogg"];

/// Returns the first `<audio_dir>/<base_name><ext>` that is a regular file,
/// trying `extensions` in order.
pub fn find_matching_audio<S: AsRef<str>>(
    audio_dir: &Path,
    base_name: &OsStr,
    extensions: &[S],
) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| {
            let mut name = base_name.to_os_string();
            name.push(ext.as_ref());
            audio_dir.join(name)
        })
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"audio").unwrap();
    }

    #[test]
    fn earliest_extension_wins() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ep1.flac");
        touch(dir.path(), "ep1.mp3");
        touch(dir.path(), "ep1.mka");

        let found = find_matching_audio(dir.path(), OsStr::new("ep1"), DEFAULT_AUDIO_EXTENSIONS);
        assert_eq!(found, Some(dir.path().join("ep1.mka")));
    }

    #[test]
    fn falls_through_to_later_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ep1.ogg");
        touch(dir.path(), "ep1.wav");

        let found = find_matching_audio(dir.path(), OsStr::new("ep1"), DEFAULT_AUDIO_EXTENSIONS);
        assert_eq!(found, Some(dir.path().join("ep1.wav")));
    }

    #[test]
    fn custom_order_is_respected() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ep1.mka");
        touch(dir.path(), "ep1.flac");

        let found = find_matching_audio(dir.path(), OsStr::new("ep1"), &[".flac", ".mka"]);
        assert_eq!(found, Some(dir.path().join("ep1.flac")));
    }

    #[test]
    fn no_candidate_is_none() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ep2.mka");
        touch(dir.path(), "ep1.m4a");

        assert_eq!(
            find_matching_audio(dir.path(), OsStr::new("ep1"), DEFAULT_AUDIO_EXTENSIONS),
            None
        );
    }

    #[test]
    fn directories_are_not_matches() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("ep1.mka")).unwrap();
        touch(dir.path(), "ep1.mp3");

        let found = find_matching_audio(dir.path(), OsStr::new("ep1"), DEFAULT_AUDIO_EXTENSIONS);
        assert_eq!(found, Some(dir.path().join("ep1.mp3")));
    }

    #[test]
    fn missing_audio_dir_is_none() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(
            find_matching_audio(&missing, OsStr::new("ep1"), DEFAULT_AUDIO_EXTENSIONS),
            None
        );
    }
}
