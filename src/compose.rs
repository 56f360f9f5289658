use image::imageops;
use image::{DynamicImage, Rgb, RgbImage};

use crate::layout::CaptionImage;

/// Stack `caption` under `photo`, flush left.
///
/// A placeholder caption returns the photo unchanged. Neither operand is
/// scaled: the caption is expected to be exactly as wide as the photo.
pub fn append_caption(photo: DynamicImage, caption: &CaptionImage) -> DynamicImage {
    if caption.is_placeholder() {
        return photo;
    }

    let photo = photo.to_rgb8();
    let mut canvas = RgbImage::from_pixel(
        photo.width(),
        photo.height() + caption.height(),
        Rgb([255, 255, 255]),
    );
    imageops::replace(&mut canvas, &photo, 0, 0);
    imageops::replace(&mut canvas, caption.as_image(), 0, photo.height() as i64);
    DynamicImage::ImageRgb8(canvas)
}
