//! Caption strip synthesis.
//!
//! A caption strip is as wide as the photo and a fixed fraction of the
//! photo width tall. It holds two text blocks, each rendered at the
//! configured font size and then scaled to the strip:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  X100                               [logo] │ 23mm  F2.8  ...     │
//! │  Jane Doe                                  │ 2023-05-01 14:30    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Anything that prevents a caption (missing EXIF field, bad timestamp,
//! tiny image) produces [`CaptionImage::placeholder`] instead of an error.

mod caption;
mod text;

pub use caption::{CaptionText, LayoutError, format_capture_time, shot_parameters};
pub use text::{FontPair, TextRenderer, TextStyle};

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};

use crate::config::LayoutConfig;
use crate::exif::PhotoMetadata;
use crate::logo::LogoTable;

/// Height of the scaled text blocks, as a share of the photo width.
pub const FONT_RATIO: f64 = 0.07;
/// Strip height for landscape photos, as a share of the photo width.
pub const LANDSCAPE_STRIP_RATIO: f64 = 0.10;
/// Strip height for portrait and square photos.
pub const PORTRAIT_STRIP_RATIO: f64 = 0.13;
/// Stroke of the separator left of the shot parameters, in font-space pixels.
pub const SEPARATOR_WIDTH: u32 = 30;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// Text-block and strip proportions for one photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratios {
    pub font: f64,
    pub strip: f64,
}

impl Ratios {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        let landscape = width as f64 / height as f64 > 1.0;
        Self {
            font: FONT_RATIO,
            strip: if landscape { LANDSCAPE_STRIP_RATIO } else { PORTRAIT_STRIP_RATIO },
        }
    }

    /// Strip height for a photo `width` pixels wide.
    pub fn strip_height(&self, width: u32) -> u32 {
        (self.strip * width as f64).floor() as u32
    }

    /// Height the text blocks are scaled to.
    pub fn block_height(&self, width: u32) -> u32 {
        (self.font * width as f64).floor() as u32
    }

    /// Top offset shared by every element pasted onto the strip.
    pub fn top_offset(&self, width: u32) -> u32 {
        ((self.strip - self.font) / 2.0 * width as f64).floor() as u32
    }
}

/// Height of the caption strip that would be appended to a `width`×`height` photo.
pub fn caption_height(width: u32, height: u32) -> u32 {
    Ratios::for_dimensions(width, height).strip_height(width)
}

/// A rendered caption strip, or the zero-size placeholder meaning "no caption".
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionImage(RgbImage);

impl CaptionImage {
    pub fn new(strip: RgbImage) -> Self {
        Self(strip)
    }

    pub fn placeholder() -> Self {
        Self(RgbImage::new(0, 0))
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.width() == 0 || self.0.height() == 0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.0
    }
}

/// Everything the layout engine draws with.
pub struct LayoutContext<'a> {
    pub layout: LayoutConfig,
    pub user: &'a str,
    pub fonts: &'a dyn TextRenderer,
    pub logos: &'a LogoTable,
}

/// Build the caption strip for a photo, or the placeholder if it cannot be built.
///
/// `meta.width` / `meta.height` must already describe the upright image.
pub fn make_caption_image(meta: &PhotoMetadata, ctx: &LayoutContext<'_>) -> CaptionImage {
    match build_caption(meta, ctx) {
        Ok(strip) => CaptionImage::new(strip),
        Err(e) => {
            log::info!("  No caption: {e}");
            CaptionImage::placeholder()
        }
    }
}

fn build_caption(meta: &PhotoMetadata, ctx: &LayoutContext<'_>) -> Result<RgbImage, LayoutError> {
    let width = meta.width.ok_or(LayoutError::MissingField("width"))?;
    let height = meta.height.ok_or(LayoutError::MissingField("height"))?;
    let text = CaptionText::from_metadata(meta, ctx.user)?;

    let ratios = Ratios::for_dimensions(width, height);
    let strip_height = ratios.strip_height(width);
    let block_height = ratios.block_height(width);
    if height == 0 || block_height == 0 {
        return Err(LayoutError::TooSmall { width, height });
    }

    let gap = ctx.layout.gap;
    let border = ctx.layout.border as i64;

    let brand = scale_block(&brand_block(&text, ctx.fonts, gap), block_height)
        .ok_or(LayoutError::TooSmall { width, height })?;
    let shot = scale_block(&shot_block(&text, ctx.fonts, gap), block_height)
        .ok_or(LayoutError::TooSmall { width, height })?;

    let mut strip = RgbaImage::from_pixel(width, strip_height, WHITE);
    let top = ratios.top_offset(width) as i64;
    let shot_x = width as i64 - shot.width() as i64 - border;

    if let Some(logo) = ctx.logos.logo_for(meta.make.as_deref(), strip_height) {
        let logo_x = shot_x - logo.width() as i64 - (gap / 4) as i64;
        imageops::overlay(&mut strip, &logo, logo_x, top);
    } else if !ctx.logos.is_empty() {
        log::debug!("  No logo for make {:?}", meta.make);
    }

    imageops::overlay(&mut strip, &brand, border * 2, top);
    imageops::overlay(&mut strip, &shot, shot_x, top);

    let strip = imageops::resize(&strip, width, strip_height, FilterType::Lanczos3);
    Ok(DynamicImage::ImageRgba8(strip).to_rgb8())
}

/// Camera model over photographer name, left-aligned.
fn brand_block(text: &CaptionText, fonts: &dyn TextRenderer, gap: u32) -> RgbaImage {
    let (model_w, model_h) = fonts.measure(TextStyle::Emphasized, &text.model);
    let (user_w, user_h) = fonts.measure(TextStyle::Regular, &text.user);

    let mut block =
        RgbaImage::from_pixel(model_w.max(user_w), model_h + user_h + gap * 3, WHITE);
    fonts.draw(&mut block, TextStyle::Emphasized, 0, 0, BLACK, &text.model);
    fonts.draw(
        &mut block,
        TextStyle::Regular,
        0,
        (model_h + gap) as i32,
        GRAY,
        &text.user,
    );
    block
}

/// Shot parameters over capture time, behind a vertical separator.
fn shot_block(text: &CaptionText, fonts: &dyn TextRenderer, gap: u32) -> RgbaImage {
    let (params_w, params_h) = fonts.measure(TextStyle::Emphasized, &text.shot_params);
    let (date_w, date_h) = fonts.measure(TextStyle::Regular, &text.captured_at);

    let mut block = RgbaImage::from_pixel(
        params_w.max(date_w) + gap * 2,
        params_h + date_h + gap * 3,
        WHITE,
    );

    let separator_bottom = (params_h + date_h + gap * 2).min(block.height());
    for y in gap.min(separator_bottom)..separator_bottom {
        for x in 0..SEPARATOR_WIDTH.min(block.width()) {
            block.put_pixel(x, y, GRAY);
        }
    }

    fonts.draw(&mut block, TextStyle::Emphasized, gap as i32, 0, BLACK, &text.shot_params);
    fonts.draw(
        &mut block,
        TextStyle::Regular,
        gap as i32,
        (params_h + gap) as i32,
        GRAY,
        &text.captured_at,
    );
    block
}

/// Resize a block to `height`, width following the aspect ratio.
fn scale_block(block: &RgbaImage, height: u32) -> Option<RgbaImage> {
    if block.width() == 0 || block.height() == 0 {
        return None;
    }
    let width = (block.width() as f64 / block.height() as f64 * height as f64).floor() as u32;
    if width == 0 {
        return None;
    }
    Some(imageops::resize(block, width, height, FilterType::Lanczos3))
}
