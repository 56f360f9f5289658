use chrono::NaiveDateTime;

use crate::exif::{EXIF_DATETIME_FORMAT, PhotoMetadata, Rational};

const DISPLAY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Why a caption could not be built. Every variant ends in "no caption";
/// none of them fails the file.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("missing EXIF field: {0}")]
    MissingField(&'static str),
    #[error("unusable EXIF value for {0}")]
    InvalidValue(&'static str),
    #[error("malformed capture time {0:?}")]
    BadTimestamp(String),
    #[error("image too small for a caption ({width}x{height})")]
    TooSmall { width: u32, height: u32 },
}

/// The four strings printed on a caption strip.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionText {
    /// Camera model, emphasized, top-left.
    pub model: String,
    /// Photographer, under the model.
    pub user: String,
    /// `"{focal}mm  F{fnumber}  {exposure}  ISO{iso}"`, emphasized, right.
    pub shot_params: String,
    /// `YYYY-MM-DD HH:MM`, under the shot parameters.
    pub captured_at: String,
}

impl CaptionText {
    pub fn from_metadata(meta: &PhotoMetadata, user: &str) -> Result<Self, LayoutError> {
        let model = meta.model.clone().ok_or(LayoutError::MissingField("model"))?;
        meta.make.as_ref().ok_or(LayoutError::MissingField("make"))?;
        let shot_params = shot_parameters(meta)?;
        let captured_at = format_capture_time(
            meta.date_time_original
                .as_deref()
                .ok_or(LayoutError::MissingField("date_time_original"))?,
        )?;

        Ok(Self {
            model,
            user: user.to_string(),
            shot_params,
            captured_at,
        })
    }
}

/// Build the shot-parameter line.
///
/// The 35mm-equivalent focal length wins over the lens focal length, but the
/// lens value must still be present.
pub fn shot_parameters(meta: &PhotoMetadata) -> Result<String, LayoutError> {
    let focal = meta.focal_length.ok_or(LayoutError::MissingField("focal_length"))?;
    let f_number = meta.f_number.ok_or(LayoutError::MissingField("f_number"))?;
    let exposure = meta.exposure_time.ok_or(LayoutError::MissingField("exposure_time"))?;
    let iso = meta.iso.ok_or(LayoutError::MissingField("iso"))?;

    // Nearest millimetre, so 18.7mm prints as 19mm.
    let focal_mm = match meta.focal_length_35mm {
        Some(mm) => mm as f64,
        None => focal.to_f64().ok_or(LayoutError::InvalidValue("focal_length"))?,
    };
    let f_number = decimal(f_number, "f_number")?;
    let exposure = decimal(exposure, "exposure_time")?;

    Ok(format!(
        "{}mm  F{f_number}  {exposure}  ISO{iso}",
        focal_mm.round() as u64
    ))
}

fn decimal(value: Rational, field: &'static str) -> Result<String, LayoutError> {
    value
        .to_f64()
        .map(|_| value.to_string())
        .ok_or(LayoutError::InvalidValue(field))
}

/// `2023:05:01 14:30:00` → `2023-05-01 14:30`.
pub fn format_capture_time(raw: &str) -> Result<String, LayoutError> {
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME_FORMAT)
        .map(|dt| dt.format(DISPLAY_DATETIME_FORMAT).to_string())
        .map_err(|_| LayoutError::BadTimestamp(raw.to_string()))
}
