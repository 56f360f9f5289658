use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use nom_exif::{EntryValue, Exif, ExifIter, ExifTag, MediaParser, MediaSource};
use std::path::Path;

use super::Rational;

/// EXIF `DateTimeOriginal` layout.
pub(crate) const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// The EXIF fields the caption strip is built from.
///
/// Every field is optional because any of them may be missing from a given
/// photo. `width` and `height` are never read from EXIF: the pipeline fills
/// them from the decoded (and rotated) pixels via [`PhotoMetadata::with_dimensions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoMetadata {
    pub model: Option<String>,
    pub make: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Lens focal length in mm.
    pub focal_length: Option<Rational>,
    /// 35mm-equivalent focal length in mm. EXIF uses 0 for "unknown"; that
    /// value is dropped on read.
    pub focal_length_35mm: Option<u32>,
    pub f_number: Option<Rational>,
    pub exposure_time: Option<Rational>,
    pub iso: Option<u32>,
    /// Capture time in the EXIF `YYYY:MM:DD HH:MM:SS` layout.
    pub date_time_original: Option<String>,
    /// EXIF orientation code (1–8).
    pub orientation: Option<u16>,
}

impl PhotoMetadata {
    /// Overwrite the pixel dimensions with those of the image being captioned.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Read the caption-relevant EXIF fields from an image file.
///
/// A file without an EXIF block yields an empty [`PhotoMetadata`]; the
/// layout engine then falls back to "no caption".
pub fn read_photo_metadata(path: &Path) -> Result<PhotoMetadata> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).context("Failed to open image file")?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(PhotoMetadata::default());
        }
    };
    let exif: Exif = iter.into();

    Ok(PhotoMetadata {
        model: exif.get(ExifTag::Model).and_then(entry_to_string),
        make: exif.get(ExifTag::Make).and_then(entry_to_string),
        width: None,
        height: None,
        focal_length: exif.get(ExifTag::FocalLength).and_then(entry_to_rational),
        focal_length_35mm: exif
            .get(ExifTag::FocalLengthIn35mmFilm)
            .and_then(entry_to_u32)
            .filter(|&v| v > 0),
        f_number: exif.get(ExifTag::FNumber).and_then(entry_to_rational),
        exposure_time: exif.get(ExifTag::ExposureTime).and_then(entry_to_rational),
        iso: exif.get(ExifTag::ISOSpeedRatings).and_then(entry_to_u32),
        date_time_original: exif
            .get(ExifTag::DateTimeOriginal)
            .and_then(entry_to_string)
            .map(|s| normalize_timestamp(&s)),
        orientation: exif
            .get(ExifTag::Orientation)
            .and_then(entry_to_u32)
            .and_then(|v| u16::try_from(v).ok()),
    })
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').trim_end_matches('\0').trim().to_string();
    if s.is_empty() { None } else { Some(s) }
}

fn entry_to_rational(val: &EntryValue) -> Option<Rational> {
    match val {
        EntryValue::URational(r) => Some(Rational::new(r.0, r.1)),
        EntryValue::IRational(r) => {
            let num = u32::try_from(r.0).ok()?;
            let den = u32::try_from(r.1).ok()?;
            Some(Rational::new(num, den))
        }
        _ => None,
    }
}

fn entry_to_u32(val: &EntryValue) -> Option<u32> {
    match val {
        EntryValue::U8(v) => Some(u32::from(*v)),
        EntryValue::U16(v) => Some(u32::from(*v)),
        EntryValue::U32(v) => Some(*v),
        // Multi-valued tags (ISOSpeedRatings may carry several): first value.
        EntryValue::U8Array(v) => v.first().map(|&x| u32::from(x)),
        EntryValue::U16Array(v) => v.first().map(|&x| u32::from(x)),
        EntryValue::U32Array(v) => v.first().copied(),
        _ => val.to_string().trim().parse().ok(),
    }
}

/// Bring a capture time back to the EXIF `YYYY:MM:DD HH:MM:SS` layout.
///
/// nom-exif hands `DateTimeOriginal` back as a parsed date when it can, whose
/// display form is RFC 3339 or `YYYY-MM-DD HH:MM:SS`. Anything unparseable is
/// kept verbatim so the layout engine can reject it.
fn normalize_timestamp(raw: &str) -> String {
    if NaiveDateTime::parse_from_str(raw, EXIF_DATETIME_FORMAT).is_ok() {
        return raw.to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_local().format(EXIF_DATETIME_FORMAT).to_string();
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return dt.format(EXIF_DATETIME_FORMAT).to_string();
        }
    }
    raw.to_string()
}
