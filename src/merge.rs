use crate::audio_matcher::find_matching_audio;
use crate::ffmpeg::Ffmpeg;
use crate::task::{Outcome, Task};

/// Settings shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct MergeSettings {
    pub ffmpeg: Ffmpeg,
    pub audio_extensions: Vec<String>,
}

/// Validates, matches and merges a single video. Never fails: every result,
/// including a failed ffmpeg run, comes back as an `Outcome`.
pub fn process_one(task: &Task, settings: &MergeSettings) -> Outcome {
    let video_path = task.video_path();
    if !video_path.is_file() {
        tracing::debug!("{} is no longer a regular file, skipping", video_path.display());
        return Outcome::Skipped;
    }

    let filename = task.display_name();

    if !settings.ffmpeg.is_supported(&video_path) {
        println!("[❌] Unsupported video format: {}", filename);
        return Outcome::Unsupported;
    }

    let Some(audio_path) =
        find_matching_audio(&task.audio_dir, task.base_name(), &settings.audio_extensions)
    else {
        println!("[❌] No matching audio found for: {}", filename);
        return Outcome::NoMatchingAudio;
    };

    let output_path = task.output_path();
    let audio_name = audio_path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    println!("[🔄] Merging: {} + {}", filename, audio_name);

    match settings.ffmpeg.merge(&video_path, &audio_path, &output_path) {
        Ok(()) => {
            println!("[✅] Success: {}", output_path.display());
            Outcome::Merged {
                output: output_path,
            }
        }
        Err(e) => {
            println!("[⚠️] Failed to process {}: {}", filename, e);
            Outcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Runs tasks that share an output path one after another until one of them
/// merges. Tasks after the producer are not attempted.
pub fn process_group(group: Vec<Task>, settings: &MergeSettings) -> Vec<(Task, Outcome)> {
    let mut producer: Option<String> = None;
    let mut results = Vec::with_capacity(group.len());

    for task in group {
        let outcome = match &producer {
            Some(owner) => {
                let reason = format!(
                    "output {} is already produced from {}",
                    task.output_path().display(),
                    owner
                );
                println!("[⚠️] Failed to process {}: {}", task.display_name(), reason);
                Outcome::Failed { reason }
            }
            None => process_one(&task, settings),
        };
        if matches!(outcome, Outcome::Merged { .. }) {
            producer = Some(task.display_name().into_owned());
        }
        results.push((task, outcome));
    }
    results
}
