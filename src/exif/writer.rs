use anyhow::{Context, Result};
use img_parts::Bytes;
use img_parts::ImageEXIF;
use img_parts::jpeg::Jpeg;

const TAG_ORIENTATION: u16 = 0x0112;
const FORMAT_SHORT: u16 = 3;

/// The EXIF block of a JPEG, kept as opaque TIFF bytes.
///
/// img-parts strips the `Exif\0\0` APP1 prefix on read and adds it back on
/// write, so the bytes held here are the TIFF payload only. They are copied
/// into the output unchanged apart from [`RawMetadata::with_orientation_reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    tiff: Option<Bytes>,
}

impl RawMetadata {
    /// Pull the EXIF block out of an encoded JPEG.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Result<Self> {
        let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(bytes))
            .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?;
        Ok(Self { tiff: jpeg.exif() })
    }

    pub fn is_empty(&self) -> bool {
        self.tiff.as_ref().is_none_or(|b| b.is_empty())
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.tiff.as_deref()
    }

    /// Copy of this block with IFD0 Orientation set to 1 (upright).
    ///
    /// Used once the pixels have been rotated, so viewers do not apply the
    /// rotation a second time. A block that cannot be patched is returned
    /// unchanged.
    pub fn with_orientation_reset(&self) -> Self {
        let Some(tiff) = self.tiff.as_ref() else {
            return self.clone();
        };
        match reset_orientation(tiff) {
            Ok(patched) => Self { tiff: Some(Bytes::from(patched)) },
            Err(e) => {
                log::debug!("Keeping original orientation tag: {e}");
                self.clone()
            }
        }
    }

    /// Insert this block into an encoded JPEG, replacing any EXIF it has.
    pub fn embed(&self, jpeg_bytes: Vec<u8>) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Ok(jpeg_bytes);
        }
        let mut jpeg = Jpeg::from_bytes(Bytes::from(jpeg_bytes))
            .map_err(|e| anyhow::anyhow!("Failed to parse encoded JPEG: {e}"))?;
        jpeg.set_exif(self.tiff.clone());
        Ok(jpeg.encoder().bytes().to_vec())
    }
}

/// Rewrite the IFD0 Orientation value to 1 in place.
///
/// Only the two value bytes change, so every other tag (maker notes
/// included) survives byte-for-byte. TIFF data without an Orientation tag
/// is returned as is.
pub fn reset_orientation(tiff: &[u8]) -> Result<Vec<u8>> {
    if tiff.len() < 8 {
        anyhow::bail!("TIFF data too short");
    }

    let big_endian = match &tiff[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => anyhow::bail!("Invalid TIFF byte order"),
    };
    let read_u16 = |pos: usize| -> Result<u16> {
        let bytes: [u8; 2] = tiff
            .get(pos..pos + 2)
            .context("IFD entry out of bounds")?
            .try_into()?;
        Ok(if big_endian { u16::from_be_bytes(bytes) } else { u16::from_le_bytes(bytes) })
    };
    let read_u32 = |pos: usize| -> Result<u32> {
        let bytes: [u8; 4] = tiff
            .get(pos..pos + 4)
            .context("IFD offset out of bounds")?
            .try_into()?;
        Ok(if big_endian { u32::from_be_bytes(bytes) } else { u32::from_le_bytes(bytes) })
    };

    let ifd0 = read_u32(4)? as usize;
    let count = read_u16(ifd0)? as usize;

    let mut patched = tiff.to_vec();
    for i in 0..count {
        let entry = ifd0 + 2 + i * 12;
        if read_u16(entry)? != TAG_ORIENTATION {
            continue;
        }
        if read_u16(entry + 2)? != FORMAT_SHORT {
            anyhow::bail!("Orientation tag is not a SHORT");
        }
        let one = if big_endian { 1u16.to_be_bytes() } else { 1u16.to_le_bytes() };
        patched[entry + 8..entry + 10].copy_from_slice(&one);
        return Ok(patched);
    }

    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TagValue, build_tiff, encode_jpeg, sample_exif_tags};

    fn orientation_of(tiff: &[u8]) -> u16 {
        // IFD0 at offset 8, entries sorted by tag: Make, Model, Orientation
        let ifd0 = 8;
        let count = u16::from_le_bytes([tiff[ifd0], tiff[ifd0 + 1]]) as usize;
        for i in 0..count {
            let entry = ifd0 + 2 + i * 12;
            if u16::from_le_bytes([tiff[entry], tiff[entry + 1]]) == TAG_ORIENTATION {
                return u16::from_le_bytes([tiff[entry + 8], tiff[entry + 9]]);
            }
        }
        panic!("no orientation tag");
    }

    #[test]
    fn reset_patches_only_orientation() {
        let tiff = build_tiff(&sample_exif_tags(6));
        assert_eq!(orientation_of(&tiff), 6);

        let patched = reset_orientation(&tiff).unwrap();
        assert_eq!(orientation_of(&patched), 1);
        assert_eq!(patched.len(), tiff.len());

        let differing = tiff.iter().zip(&patched).filter(|(a, b)| a != b).count();
        assert_eq!(differing, 1);
    }

    #[test]
    fn reset_without_orientation_tag_is_identity() {
        let tiff = build_tiff(&[(0x0110, TagValue::Ascii("X100"))]);
        assert_eq!(reset_orientation(&tiff).unwrap(), tiff);
    }

    #[test]
    fn reset_rejects_garbage() {
        assert!(reset_orientation(b"XX").is_err());
        assert!(reset_orientation(b"ZZ*\0\x08\0\0\0").is_err());
    }

    #[test]
    fn extract_and_embed_roundtrip() {
        let tiff = build_tiff(&sample_exif_tags(1));
        let source = encode_jpeg(16, 16, Some(&tiff));

        let raw = RawMetadata::from_jpeg_bytes(&source).unwrap();
        assert_eq!(raw.as_bytes(), Some(tiff.as_slice()));

        let target = encode_jpeg(8, 8, None);
        let embedded = raw.embed(target).unwrap();
        let again = RawMetadata::from_jpeg_bytes(&embedded).unwrap();
        assert_eq!(again, raw);
    }

    #[test]
    fn empty_block_leaves_jpeg_untouched() {
        let source = encode_jpeg(8, 8, None);
        let raw = RawMetadata::from_jpeg_bytes(&source).unwrap();
        assert!(raw.is_empty());
        assert_eq!(raw.embed(source.clone()).unwrap(), source);
    }

    #[test]
    fn orientation_reset_on_block() {
        let tiff = build_tiff(&sample_exif_tags(8));
        let raw = RawMetadata::from_jpeg_bytes(&encode_jpeg(8, 8, Some(&tiff))).unwrap();
        let reset = raw.with_orientation_reset();
        assert_eq!(orientation_of(reset.as_bytes().unwrap()), 1);
        assert_eq!(orientation_of(raw.as_bytes().unwrap()), 8);
    }
}
