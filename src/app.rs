use crate::{
    audio_matcher::DEFAULT_AUDIO_EXTENSIONS,
    cli::Args,
    discovery::{group_by_output, list_video_files},
    ffmpeg::{Ffmpeg, INSTALL_GUIDANCE},
    merge::{MergeSettings, process_group},
    task::{Outcome, Task, TaskReport},
};
use anyhow::{Context, Result, anyhow, bail};
use comfy_table::{Table, presets::UTF8_FULL};
use rayon::prelude::*;
use std::{fs, path::Path, process::ExitCode};

/// Exit status for `--strict` runs where at least one file was not merged.
const PARTIAL_FAILURE_EXIT: u8 = 2;

pub fn run(args: Args) -> Result<ExitCode> {
    let ffmpeg = Ffmpeg::new(&args.ffmpeg, args.debug);

    // Handle --check-ffmpeg command
    if args.check_ffmpeg {
        return handle_ffmpeg_check(&ffmpeg);
    }

    if !ffmpeg.is_available() {
        println!("{}", INSTALL_GUIDANCE);
        return Ok(ExitCode::FAILURE);
    }

    let (Some(video_dir), Some(audio_dir), Some(output_dir)) =
        (args.video_dir, args.audio_dir, args.output_dir)
    else {
        bail!("<VIDEO_DIR>, <AUDIO_DIR> and <OUTPUT_DIR> are required");
    };

    // Created once here, before any worker starts.
    fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let video_files = list_video_files(&video_dir)?;
    if video_files.is_empty() {
        println!("[ℹ️] No video files found in the input directory.");
        return Ok(ExitCode::SUCCESS);
    }

    let tasks: Vec<Task> = video_files
        .into_iter()
        .map(|filename| Task {
            filename,
            video_dir: video_dir.clone(),
            audio_dir: audio_dir.clone(),
            output_dir: output_dir.clone(),
        })
        .collect();

    let audio_extensions = if args.audio_extensions.is_empty() {
        DEFAULT_AUDIO_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        args.audio_extensions
    };
    let settings = MergeSettings {
        ffmpeg,
        audio_extensions,
    };

    let jobs = args.jobs.map(usize::from).unwrap_or_else(default_jobs);
    let results = dispatch(tasks, &settings, jobs)?;

    print_summary(&results);

    if let Some(report_path) = &args.report {
        write_report(report_path, &results)?;
        println!("✅ Wrote report to {}", report_path.display());
    }

    if args.strict && results.iter().any(|(_, outcome)| outcome.is_failure()) {
        return Ok(ExitCode::from(PARTIAL_FAILURE_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Runs every task on a pool of `jobs` threads and waits for all of them.
/// Tasks sharing an output path run in one worker, so no two workers write
/// the same file. Results come back sorted by file name.
pub fn dispatch(
    tasks: Vec<Task>,
    settings: &MergeSettings,
    jobs: usize,
) -> Result<Vec<(Task, Outcome)>> {
    let groups = group_by_output(tasks);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("merge-worker-{}", i))
        .build()
        .map_err(|e| anyhow!("Failed to start worker pool: {}", e))?;
    tracing::debug!("merging {} output files on {} workers", groups.len(), jobs);

    let mut results: Vec<(Task, Outcome)> = pool.install(|| {
        groups
            .into_par_iter()
            .flat_map_iter(|group| process_group(group, settings))
            .collect()
    });
    results.sort_by(|a, b| a.0.filename.cmp(&b.0.filename));
    Ok(results)
}

fn print_summary(results: &[(Task, Outcome)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["File", "Result", "Details"]);

    for (task, outcome) in results {
        let details = match outcome {
            Outcome::Merged { output } => output.display().to_string(),
            Outcome::Failed { reason } => reason.clone(),
            _ => String::new(),
        };
        table.add_row(vec![
            task.display_name().to_string(),
            outcome.label().to_string(),
            details,
        ]);
    }

    let merged = results
        .iter()
        .filter(|(_, o)| matches!(o, Outcome::Merged { .. }))
        .count();
    let failed = results.iter().filter(|(_, o)| o.is_failure()).count();

    println!("\n▶️ Summary:");
    println!("{table}");
    println!(
        "{} merged, {} not merged, {} skipped",
        merged,
        failed,
        results.len() - merged - failed
    );
}

fn write_report(path: &Path, results: &[(Task, Outcome)]) -> Result<()> {
    let reports: Vec<TaskReport> = results
        .iter()
        .map(|(task, outcome)| TaskReport {
            file: task.display_name().to_string(),
            outcome: outcome.clone(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&reports)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

fn handle_ffmpeg_check(ffmpeg: &Ffmpeg) -> Result<ExitCode> {
    println!("🔍 Checking FFmpeg installation ({})...\n", ffmpeg.binary().display());

    let check_result = ffmpeg.check_installation();

    if check_result.ffmpeg_available {
        if let Some(version_info) = &check_result.ffmpeg_version {
            println!("✅ FFmpeg found:");
            println!(
                "   Version: {}.{}.{}",
                version_info.major, version_info.minor, version_info.patch
            );

            if version_info.is_compatible {
                println!("   Status: ✅ Compatible (minimum required: 4.0.0)");
            } else {
                println!("   Status: ❌ Too old (minimum required: 4.0.0)");
            }
        } else {
            println!("⚠️  Could not parse FFmpeg version from output");
        }
    } else {
        if let Some(error) = &check_result.error {
            tracing::debug!("ffmpeg check failed: {}", error);
        }
        println!("{}", INSTALL_GUIDANCE);
        return Ok(ExitCode::FAILURE);
    }

    println!("\n🎉 FFmpeg check complete!");
    Ok(ExitCode::SUCCESS)
}
