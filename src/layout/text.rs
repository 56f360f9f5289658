use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;

/// Which of the two caption fonts a line is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Photographer name and capture date.
    Regular,
    /// Camera model and shot parameters.
    Emphasized,
}

/// Measures and rasterizes caption text.
///
/// The layout engine only talks to this trait. [`FontPair`] is the
/// production implementation backed by TrueType/OpenType files.
pub trait TextRenderer {
    /// Pixel size `(width, height)` of `text` when drawn in `style`.
    fn measure(&self, style: TextStyle, text: &str) -> (u32, u32);

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw(
        &self,
        canvas: &mut RgbaImage,
        style: TextStyle,
        x: i32,
        y: i32,
        color: Rgba<u8>,
        text: &str,
    );
}

/// Regular + emphasized fonts at a fixed pixel size.
pub struct FontPair {
    regular: FontVec,
    emphasized: FontVec,
    scale: PxScale,
}

impl FontPair {
    /// Load both font files and set them at `size` pixels.
    pub fn load(regular: &Path, emphasized: &Path, size: u32) -> Result<Self> {
        Ok(Self {
            regular: load_font(regular)?,
            emphasized: load_font(emphasized)?,
            scale: PxScale::from(size as f32),
        })
    }

    fn font(&self, style: TextStyle) -> &FontVec {
        match style {
            TextStyle::Regular => &self.regular,
            TextStyle::Emphasized => &self.emphasized,
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read font {}", path.display()))?;
    FontVec::try_from_vec(bytes)
        .map_err(|e| anyhow::anyhow!("Invalid font {}: {e}", path.display()))
}

impl TextRenderer for FontPair {
    fn measure(&self, style: TextStyle, text: &str) -> (u32, u32) {
        text_size(self.scale, self.font(style), text)
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        style: TextStyle,
        x: i32,
        y: i32,
        color: Rgba<u8>,
        text: &str,
    ) {
        draw_text_mut(canvas, color, x, y, self.scale, self.font(style), text);
    }
}
