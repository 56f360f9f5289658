//! Shared fixtures for the unit tests.
//!
//! - [`build_tiff`] / [`encode_jpeg`] / [`write_jpeg_with_exif`] synthesize
//!   JPEG files carrying a real EXIF block
//! - [`BlockRenderer`] is a [`TextRenderer`] that draws one solid box per
//!   glyph, so layout can be tested without font files

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::path::Path;

use crate::layout::{TextRenderer, TextStyle};

/// A value for one entry of a synthesized IFD.
#[derive(Debug, Clone)]
pub enum TagValue {
    Ascii(&'static str),
    Short(u16),
    Shorts(&'static [u16]),
    Long(u32),
    Rational(u32, u32),
}

const TAG_EXIF_IFD_POINTER: u16 = 0x8769;

impl TagValue {
    /// (TIFF type, count, little-endian value bytes)
    fn encode(&self) -> (u16, u32, Vec<u8>) {
        match self {
            TagValue::Ascii(s) => {
                let mut data = s.as_bytes().to_vec();
                data.push(0);
                (2, data.len() as u32, data)
            }
            TagValue::Short(v) => (3, 1, v.to_le_bytes().to_vec()),
            TagValue::Shorts(vs) => (
                3,
                vs.len() as u32,
                vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
            ),
            TagValue::Long(v) => (4, 1, v.to_le_bytes().to_vec()),
            TagValue::Rational(n, d) => {
                let mut data = n.to_le_bytes().to_vec();
                data.extend_from_slice(&d.to_le_bytes());
                (5, 1, data)
            }
        }
    }
}

/// Serialize one IFD located at `offset`, followed by its out-of-line data.
fn encode_ifd(entries: &[(u16, TagValue)], offset: u32) -> Vec<u8> {
    let mut entries = entries.to_vec();
    entries.sort_by_key(|(tag, _)| *tag);

    let dir_len = 2 + 12 * entries.len() as u32 + 4;
    let mut dir = Vec::new();
    let mut data = Vec::new();

    dir.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, value) in &entries {
        let (format, count, bytes) = value.encode();
        dir.extend_from_slice(&tag.to_le_bytes());
        dir.extend_from_slice(&format.to_le_bytes());
        dir.extend_from_slice(&count.to_le_bytes());
        if bytes.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..bytes.len()].copy_from_slice(&bytes);
            dir.extend_from_slice(&inline);
        } else {
            let at = offset + dir_len + data.len() as u32;
            dir.extend_from_slice(&at.to_le_bytes());
            data.extend_from_slice(&bytes);
            if data.len() % 2 == 1 {
                data.push(0);
            }
        }
    }
    dir.extend_from_slice(&0u32.to_le_bytes());
    dir.extend_from_slice(&data);
    dir
}

/// Build little-endian TIFF data. Tags below 0x8000 go to IFD0, the rest to
/// an Exif sub-IFD linked from IFD0.
pub fn build_tiff(tags: &[(u16, TagValue)]) -> Vec<u8> {
    let (ifd0_tags, exif_tags): (Vec<_>, Vec<_>) =
        tags.iter().cloned().partition(|(tag, _)| *tag < 0x8000);

    let mut tiff = b"II*\0".to_vec();
    tiff.extend_from_slice(&8u32.to_le_bytes());

    if exif_tags.is_empty() {
        tiff.extend_from_slice(&encode_ifd(&ifd0_tags, 8));
        return tiff;
    }

    // The pointer value does not change the IFD0 size, so size it first.
    let mut with_pointer = ifd0_tags.clone();
    with_pointer.push((TAG_EXIF_IFD_POINTER, TagValue::Long(0)));
    let ifd0_len = encode_ifd(&with_pointer, 8).len() as u32;
    let exif_offset = 8 + ifd0_len;

    let mut with_pointer = ifd0_tags;
    with_pointer.push((TAG_EXIF_IFD_POINTER, TagValue::Long(exif_offset)));
    tiff.extend_from_slice(&encode_ifd(&with_pointer, 8));
    tiff.extend_from_slice(&encode_ifd(&exif_tags, exif_offset));
    tiff
}

/// The EXIF of the reference X100 shot, with the given orientation code.
pub fn sample_exif_tags(orientation: u16) -> Vec<(u16, TagValue)> {
    vec![
        (0x010F, TagValue::Ascii("FUJIFILM")),
        (0x0110, TagValue::Ascii("X100")),
        (0x0112, TagValue::Short(orientation)),
        (0x829A, TagValue::Rational(1, 250)),
        (0x829D, TagValue::Rational(28, 10)),
        (0x8827, TagValue::Short(200)),
        (0x9003, TagValue::Ascii("2023:05:01 14:30:00")),
        (0x920A, TagValue::Rational(23, 1)),
    ]
}

/// A gradient so rotations and crops are distinguishable.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 64])
    })
}

/// Encode a gradient JPEG, optionally carrying `tiff` as its EXIF block.
pub fn encode_jpeg(width: u32, height: u32, tiff: Option<&[u8]>) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .encode_image(&gradient(width, height))
        .unwrap();
    match tiff {
        Some(tiff) => {
            let mut jpeg = Jpeg::from_bytes(Bytes::from(buf)).unwrap();
            jpeg.set_exif(Some(Bytes::copy_from_slice(tiff)));
            jpeg.encoder().bytes().to_vec()
        }
        None => buf,
    }
}

/// Write a JPEG to `path`; an empty tag list writes no EXIF block at all.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, tags: &[(u16, TagValue)]) {
    let tiff = (!tags.is_empty()).then(|| build_tiff(tags));
    std::fs::write(path, encode_jpeg(width, height, tiff.as_deref())).unwrap();
}

/// Draws every non-space character as a solid `0.6em × 1em` box.
pub struct BlockRenderer {
    pub size: u32,
}

impl BlockRenderer {
    fn glyph_width(&self) -> u32 {
        (self.size * 3 / 5).max(1)
    }
}

impl TextRenderer for BlockRenderer {
    fn measure(&self, _style: TextStyle, text: &str) -> (u32, u32) {
        (text.chars().count() as u32 * self.glyph_width(), self.size)
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        _style: TextStyle,
        x: i32,
        y: i32,
        color: Rgba<u8>,
        text: &str,
    ) {
        let gw = self.glyph_width() as i32;
        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let left = x + i as i32 * gw;
            for py in y..y + self.size as i32 {
                for px in left + 1..left + gw - 1 {
                    if px >= 0
                        && py >= 0
                        && (px as u32) < canvas.width()
                        && (py as u32) < canvas.height()
                    {
                        canvas.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}
