use std::path::{Path, PathBuf};

use crate::hash;

/// Suffix inserted before the extension when an occupied name holds
/// different content.
const COLLISION_SUFFIX: &str = "_copy";

/// Outcome of comparing a source file against its destination bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Nothing at the candidate path; transfer to it.
    New(PathBuf),
    /// Identical content is already organized; leave the source alone.
    Skip,
    /// The name is taken by different content; transfer under a renamed path.
    RenameTo(PathBuf),
}

/// Decide where `source` lands inside `bucket_dir`.
///
/// A hash failure on either side counts as "not equal", so an unreadable
/// file costs at worst a redundant renamed copy, never a skipped unique
/// one. Only one rename level is attempted: a third distinct file with the
/// same basename lands on the already-used `_copy` name.
pub fn decide(source: &Path, bucket_dir: &Path) -> Placement {
    let candidate = bucket_dir.join(source.file_name().unwrap_or_default());
    if !candidate.exists() {
        return Placement::New(candidate);
    }

    match (hash::digest_file(source), hash::digest_file(&candidate)) {
        (Ok(src), Ok(dst)) if src == dst => Placement::Skip,
        _ => Placement::RenameTo(bucket_dir.join(renamed(source))),
    }
}

/// `IMG_0001.jpg` -> `IMG_0001_copy.jpg`.
fn renamed(source: &Path) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    match source.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("{}{}.{}", stem, COLLISION_SUFFIX, ext),
        None => format!("{}{}", stem, COLLISION_SUFFIX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_new_when_candidate_absent() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("IMG_0001.jpg");
        fs::write(&source, b"photo bytes").unwrap();
        let bucket = dir.path().join("2023").join("05");
        fs::create_dir_all(&bucket).unwrap();

        let decision = decide(&source, &bucket);
        assert_eq!(decision, Placement::New(bucket.join("IMG_0001.jpg")));
    }

    #[test]
    fn test_skip_when_content_identical() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("IMG_0001.jpg");
        fs::write(&source, b"photo bytes").unwrap();
        let bucket = dir.path().join("bucket");
        fs::create_dir_all(&bucket).unwrap();
        fs::write(bucket.join("IMG_0001.jpg"), b"photo bytes").unwrap();

        assert_eq!(decide(&source, &bucket), Placement::Skip);
    }

    #[test]
    fn test_rename_when_content_differs() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("IMG_0001.jpg");
        fs::write(&source, b"new photo").unwrap();
        let bucket = dir.path().join("bucket");
        fs::create_dir_all(&bucket).unwrap();
        fs::write(bucket.join("IMG_0001.jpg"), b"old photo").unwrap();

        let decision = decide(&source, &bucket);
        assert_eq!(
            decision,
            Placement::RenameTo(bucket.join("IMG_0001_copy.jpg"))
        );
    }

    #[test]
    fn test_rename_when_source_unreadable() {
        let dir = tempdir().unwrap();
        // Source does not exist, so hashing it fails; an occupied name must
        // still never be skipped on an unreadable comparison.
        let source = dir.path().join("IMG_0002.jpg");
        let bucket = dir.path().join("bucket");
        fs::create_dir_all(&bucket).unwrap();
        fs::write(bucket.join("IMG_0002.jpg"), b"existing").unwrap();

        let decision = decide(&source, &bucket);
        assert_eq!(
            decision,
            Placement::RenameTo(bucket.join("IMG_0002_copy.jpg"))
        );
    }

    #[test]
    fn test_rename_without_extension() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("scan");
        fs::write(&source, b"new").unwrap();
        let bucket = dir.path().join("bucket");
        fs::create_dir_all(&bucket).unwrap();
        fs::write(bucket.join("scan"), b"old").unwrap();

        assert_eq!(
            decide(&source, &bucket),
            Placement::RenameTo(bucket.join("scan_copy"))
        );
    }
}
