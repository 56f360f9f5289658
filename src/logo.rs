use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::path::PathBuf;

use crate::config::LogoConfig;

/// Logo height as a share of the caption strip it is pasted into.
pub const LOGO_HEIGHT_RATIO: f64 = 0.7;

/// One manufacturer row with its decoded logo.
#[derive(Debug, Clone)]
pub struct LogoEntry {
    pub id: String,
    pub path: PathBuf,
    /// `None` when the file could not be decoded. A make matching this row
    /// still stops the search and gets no logo.
    pub image: Option<DynamicImage>,
}

/// The ordered manufacturer table, with every logo decoded once up front.
#[derive(Debug, Clone, Default)]
pub struct LogoTable {
    entries: Vec<LogoEntry>,
}

impl LogoTable {
    /// Decode every configured logo. Returns an empty table when logos are
    /// disabled. Unreadable files are logged and kept as image-less rows.
    pub fn load(config: &LogoConfig) -> Self {
        if !config.enable {
            return Self::default();
        }

        let entries = config
            .makes
            .iter()
            .map(|make| {
                let image = match image::open(&make.path) {
                    Ok(img) => {
                        log::debug!(
                            "Loaded logo for {} ({}x{})",
                            make.id,
                            img.width(),
                            img.height()
                        );
                        Some(img)
                    }
                    Err(e) => {
                        log::warn!("Failed to load logo {}: {e}", make.path.display());
                        None
                    }
                };
                LogoEntry {
                    id: make.id.clone(),
                    path: make.path.clone(),
                    image,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn from_entries(entries: Vec<LogoEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First row whose `id` occurs in `make`.
    pub fn resolve(&self, make: &str) -> Option<&LogoEntry> {
        self.entries.iter().find(|entry| make.contains(entry.id.as_str()))
    }

    /// The logo for `make`, scaled to 70% of `strip_height`.
    ///
    /// `None` means "paste nothing": no make, no matching row, or a row whose
    /// logo failed to load.
    pub fn logo_for(&self, make: Option<&str>, strip_height: u32) -> Option<RgbaImage> {
        let entry = self.resolve(make?)?;
        let image = entry.image.as_ref()?;
        let target = (strip_height as f64 * LOGO_HEIGHT_RATIO).floor() as u32;
        scale_to_height(image, target)
    }
}

/// Resize keeping the aspect ratio so the height becomes `target_height`.
///
/// Returns `None` if either resulting side would be zero.
pub fn scale_to_height(image: &DynamicImage, target_height: u32) -> Option<RgbaImage> {
    if image.height() == 0 || target_height == 0 {
        return None;
    }
    let width =
        (image.width() as f64 * target_height as f64 / image.height() as f64).floor() as u32;
    if width == 0 {
        return None;
    }
    Some(imageops::resize(
        &image.to_rgba8(),
        width,
        target_height,
        FilterType::Lanczos3,
    ))
}
