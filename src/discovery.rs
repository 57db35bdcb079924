use anyhow::{Context, Result};
use std::{collections::HashMap, ffi::OsString, fs, path::Path, path::PathBuf};

use crate::task::Task;

/// Lists the regular files directly inside `video_dir`, sorted by name.
/// Directories and symlinks that do not resolve to a file are left out.
pub fn list_video_files(video_dir: &Path) -> Result<Vec<OsString>> {
    let entries = fs::read_dir(video_dir)
        .with_context(|| format!("Failed to read video directory {}", video_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read an entry of {}", video_dir.display()))?;
        if entry.path().is_file() {
            files.push(entry.file_name());
        }
    }
    files.sort();
    Ok(files)
}

/// Groups tasks that would write the same output file (e.g. `ep1.mkv` and
/// `ep1.mp4`). Groups keep the order in which their first task appears, and
/// tasks keep their order inside a group.
pub fn group_by_output(tasks: Vec<Task>) -> Vec<Vec<Task>> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut groups: Vec<Vec<Task>> = Vec::new();

    for task in tasks {
        let output = task.output_path();
        match slots.get(&output) {
            Some(&slot) => groups[slot].push(task),
            None => {
                slots.insert(output, groups.len());
                groups.push(vec![task]);
            }
        }
    }
    groups
}
