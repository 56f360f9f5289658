use image::DynamicImage;

/// Pixel rotation that brings a photo upright, derived from its EXIF
/// orientation code.
///
/// Only the pure rotations are handled. Mirrored codes (2, 4, 5, 7), 1 and
/// unknown values leave the image as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    /// Code 6: the camera was turned clockwise, rotate 90° clockwise.
    Clockwise90,
    /// Code 3.
    Half,
    /// Code 8: rotate 270° clockwise (90° counter-clockwise).
    Clockwise270,
}

impl Rotation {
    pub fn from_exif(orientation: Option<u16>) -> Self {
        match orientation {
            Some(3) => Self::Half,
            Some(6) => Self::Clockwise90,
            Some(8) => Self::Clockwise270,
            _ => Self::None,
        }
    }

    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::None => image,
            Self::Clockwise90 => image.rotate90(),
            Self::Half => image.rotate180(),
            Self::Clockwise270 => image.rotate270(),
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

/// Rotate `image` upright according to its EXIF orientation code.
pub fn normalize(image: DynamicImage, orientation: Option<u16>) -> (DynamicImage, Rotation) {
    let rotation = Rotation::from_exif(orientation);
    (rotation.apply(image), rotation)
}
