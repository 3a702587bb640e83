use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Reader, Tag, Value};

/// Where a capture date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// An embedded EXIF capture tag.
    Exif,
    /// Filesystem modification time.
    FileMtime,
}

/// Best-effort capture timestamp for one file.
#[derive(Debug, Clone, Copy)]
pub struct CaptureDate {
    pub date: NaiveDateTime,
    pub source: DateSource,
}

/// Capture tags in priority order.
const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Resolve the capture date for a file: EXIF first, modification time
/// otherwise. Never fails; any decode error degrades to the fallback.
pub fn resolve(path: &Path) -> CaptureDate {
    if let Some(date) = exif_date(path) {
        return CaptureDate {
            date,
            source: DateSource::Exif,
        };
    }
    CaptureDate {
        date: modified_time(path),
        source: DateSource::FileMtime,
    }
}

fn exif_date(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let exif = Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .ok()?;

    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(tag, In::PRIMARY) {
            let val = match &field.value {
                Value::Ascii(v) => match v.first() {
                    Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                    None => continue,
                },
                _ => field.display_value().to_string(),
            };
            if let Some(dt) = parse_exif_datetime(&val) {
                return Some(dt);
            }
        }
    }

    None
}

/// Parse an EXIF datetime string against the accepted formats in order:
/// plain seconds, fractional seconds, UTC offset.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_matches(['\0', ' ']);
    // Some writers use - or / in the date part; normalize to the colon form.
    let (date, time) = s.split_once(' ')?;
    let cleaned = format!("{} {}", date.replace(['-', '/'], ":"), time);

    if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, "%Y:%m:%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, "%Y:%m:%d %H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(&cleaned, "%Y:%m:%d %H:%M:%S%z") {
        return Some(dt.naive_local());
    }

    None
}

fn modified_time(path: &Path) -> NaiveDateTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Local>::from(t).naive_local())
        .unwrap_or_else(|_| Local::now().naive_local())
}
