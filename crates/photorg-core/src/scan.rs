use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ThrottledProgress;

/// Extensions treated as images, compared lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "tif", "tiff", "nef", "cr2", "arw",
];

pub(crate) fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Whether a file's extension is in the supported set.
pub fn is_supported(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `path` is an excluded directory or sits beneath one.
///
/// Matching is component-wise on absolute paths: excluding `/a/b` skips
/// `/a/b` and everything below it, but not `/a/bc`.
pub fn is_excluded(path: &Path, excludes: &[PathBuf]) -> bool {
    excludes.iter().any(|ex| path.starts_with(ex))
}

/// Every non-excluded directory under `source`, pruning excluded subtrees
/// instead of descending into them. Unreadable entries are skipped.
pub fn folders<'a>(source: &Path, excludes: &'a [PathBuf]) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(source)
        .into_iter()
        .filter_entry(move |e| !is_excluded(e.path(), excludes))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
}

/// Counting pass: walk every source tree once to total the non-excluded
/// folders for progress display. Performs no transfers.
pub fn count_folders(sources: &[PathBuf], excludes: &[PathBuf], progress: &ThrottledProgress) -> u64 {
    let mut total = 0u64;
    for source in sources {
        for _ in folders(source, excludes) {
            total += 1;
            progress.report("scan", total, total, "Reading folders");
        }
    }
    total
}

/// Supported image files directly inside `dir` (no recursion), sorted by
/// name.
pub fn image_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .map(|e| e.path())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();
    files
}
