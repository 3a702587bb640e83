pub mod cancel;
pub mod date;
pub mod hash;
pub mod optimize;
pub mod place;
pub mod scan;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use place::Placement;

pub use cancel::CancellationToken;

/// Options for one organize run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeOptions {
    /// Source trees to organize.
    pub sources: Vec<PathBuf>,
    /// Destination root; buckets are created beneath it as `YYYY/MM`.
    pub dest: PathBuf,
    /// Directories to skip, along with everything beneath them.
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
    /// Move files instead of copying them.
    #[serde(default)]
    pub move_files: bool,
    /// Re-encode JPEG/PNG files after they land.
    #[serde(default)]
    pub optimize: bool,
}

/// Aggregate counters for one run, reported once at the end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Folders that contained at least one supported file.
    pub folders_processed: u64,
    /// Files seen, whether or not their transfer succeeded.
    pub files_processed: u64,
    pub bytes_processed: u64,
    /// Files transferred to the destination (including renamed ones).
    pub files_new: u64,
    /// Files skipped as already-organized duplicates.
    pub files_skipped: u64,
    /// Files transferred under a collision-renamed name.
    pub files_renamed: u64,
    pub elapsed_secs: f64,
    /// Set when the run stopped early on a cancellation signal.
    pub interrupted: bool,
}

/// Control options for run execution.
#[derive(Debug, Clone, Default)]
pub struct OrganizeControl {
    /// Cancellation token polled between folders and between files.
    pub cancel_token: Option<CancellationToken>,
}

impl OrganizeControl {
    /// Create a new OrganizeControl with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create OrganizeControl with a cancellation token.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }
}

/// Type alias for progress callback
pub type ProgressCallback = dyn Fn(&str, u64, u64, &str) + Send + Sync;

/// Throttled progress reporter; emits at most every 200ms or on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback,
    last_emit: std::sync::Mutex<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a ProgressCallback) -> Self {
        Self {
            inner,
            last_emit: std::sync::Mutex::new(Instant::now() - std::time::Duration::from_secs(1)),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current + 1 >= total;
        if !is_done {
            let mut last = self.last_emit.lock().unwrap();
            if last.elapsed().as_millis() < 200 {
                return;
            }
            *last = Instant::now();
        }
        (self.inner)(stage, current, total, message);
    }
}

/// Run a full organize pass with progress reporting.
pub fn organize(options: &OrganizeOptions, progress: &ProgressCallback) -> anyhow::Result<RunStats> {
    organize_with_control(options, &OrganizeControl::default(), progress)
}

/// Run a full organize pass with progress reporting and cancellation
/// control.
///
/// Cancellation is honored at folder and file boundaries, never
/// mid-transfer, and still yields the statistics accumulated up to the
/// stop. Only destination-root creation failure aborts the run; every
/// per-file failure is logged and skipped.
pub fn organize_with_control(
    options: &OrganizeOptions,
    control: &OrganizeControl,
    progress: &ProgressCallback,
) -> anyhow::Result<RunStats> {
    let tp = ThrottledProgress::new(progress);
    let started = Instant::now();
    let mut stats = RunStats::default();

    if !options.dest.exists() {
        fs::create_dir_all(&options.dest)?;
        eprintln!("Destination folder created: {}", options.dest.display());
    }

    // Prefix matching needs absolute paths on both sides.
    let sources: Vec<PathBuf> = options.sources.iter().map(|p| absolute(p)).collect();
    let excludes: Vec<PathBuf> = options.exclude.iter().map(|p| absolute(p)).collect();

    // Counting pass: the folder total for x/total progress display.
    let total_folders = scan::count_folders(&sources, &excludes, &tp);

    let cancelled = || {
        control
            .cancel_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    };

    // Processing pass.
    'run: for source in &sources {
        if !source.is_dir() {
            eprintln!("Source folder not found: {}", source.display());
            continue;
        }

        for folder in scan::folders(source, &excludes) {
            if cancelled() {
                stats.interrupted = true;
                break 'run;
            }

            let files = scan::image_files(&folder);
            if files.is_empty() {
                continue;
            }

            stats.folders_processed += 1;
            tp.report(
                "organize",
                stats.folders_processed,
                total_folders,
                &format!("Processing {}", folder.display()),
            );

            for file in files {
                if cancelled() {
                    stats.interrupted = true;
                    break 'run;
                }
                process_file(&file, options, &mut stats);
            }
        }
    }

    stats.elapsed_secs = started.elapsed().as_secs_f64();
    Ok(stats)
}

/// One source file: resolve its bucket, decide placement, transfer,
/// optimize. Failures are logged and the run continues.
fn process_file(file: &Path, options: &OrganizeOptions, stats: &mut RunStats) {
    stats.files_processed += 1;
    if let Ok(meta) = fs::metadata(file) {
        stats.bytes_processed += meta.len();
    }

    let capture = date::resolve(file);
    let bucket = options
        .dest
        .join(capture.date.format("%Y").to_string())
        .join(capture.date.format("%m").to_string());
    if let Err(e) = fs::create_dir_all(&bucket) {
        eprintln!("Error creating {}: {}", bucket.display(), e);
        return;
    }

    let (dest, renamed) = match place::decide(file, &bucket) {
        Placement::Skip => {
            // The duplicate source is left in place even in move mode.
            stats.files_skipped += 1;
            return;
        }
        Placement::New(p) => (p, false),
        Placement::RenameTo(p) => (p, true),
    };

    match transfer(file, &dest, options.move_files) {
        Ok(()) => {
            stats.files_new += 1;
            if renamed {
                stats.files_renamed += 1;
            }
            if options.optimize && optimize::is_optimizable(&dest) {
                optimize::optimize_in_place(&dest);
            }
        }
        Err(e) => eprintln!("Error processing {}: {}", file.display(), e),
    }
}

/// Move or copy `source` to `dest`.
fn transfer(source: &Path, dest: &Path, move_files: bool) -> std::io::Result<()> {
    if move_files {
        // Plain rename first; cross-device moves fall back to copy-then-delete.
        if fs::rename(source, dest).is_ok() {
            return Ok(());
        }
        copy_with_mtime(source, dest)?;
        fs::remove_file(source)
    } else {
        copy_with_mtime(source, dest)
    }
}

/// Copy keeping the source's modification time on the destination.
fn copy_with_mtime(source: &Path, dest: &Path) -> std::io::Result<()> {
    fs::copy(source, dest)?;
    if let Ok(meta) = fs::metadata(source) {
        let mtime = filetime::FileTime::from_last_modification_time(&meta);
        filetime::set_file_mtime(dest, mtime).ok();
    }
    Ok(())
}

/// Absolutize without requiring the path to exist; exclusions may name
/// directories that are already gone.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
