use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageReader;

use crate::scan;

/// Raster formats worth re-encoding.
const OPTIMIZABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const JPEG_QUALITY: u8 = 95;

/// Whether a file's extension is in the optimizable set.
pub fn is_optimizable(path: &Path) -> bool {
    scan::lowercase_extension(path)
        .is_some_and(|ext| OPTIMIZABLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Re-encode a JPEG/PNG in place, keeping the result only if it is strictly
/// smaller.
///
/// Best effort: any decode or encode failure leaves the original untouched
/// and removes the temporary sibling. The original is only ever replaced by
/// a rename of a fully written temporary.
pub fn optimize_in_place(path: &Path) {
    let tmp = temp_sibling(path);
    if reencode_smaller(path, &tmp).is_err() {
        let _ = fs::remove_file(&tmp);
    }
}

/// `<path>.opt` next to the original.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut os = OsString::from(path.as_os_str());
    os.push(".opt");
    PathBuf::from(os)
}

fn reencode_smaller(path: &Path, tmp: &Path) -> anyhow::Result<()> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;

    let mut out = BufWriter::new(File::create(tmp)?);
    match scan::lowercase_extension(path).as_deref() {
        Some("jpg") | Some("jpeg") => {
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?
        }
        Some("png") => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut out,
            CompressionType::Best,
            FilterType::Adaptive,
        ))?,
        other => anyhow::bail!("not an optimizable format: {:?}", other),
    }
    out.into_inner().map_err(|e| e.into_error())?;

    let original = fs::metadata(path)?.len();
    let optimized = fs::metadata(tmp)?.len();
    if optimized < original {
        fs::rename(tmp, path)?;
    } else {
        fs::remove_file(tmp)?;
    }
    Ok(())
}
