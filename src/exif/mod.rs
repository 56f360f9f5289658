//! EXIF reading and re-embedding.
//!
//! - [`read_photo_metadata`] — pull the handful of fields the caption needs
//! - [`RawMetadata`] — the untouched EXIF block, carried from input to output
//! - [`Rational`] — EXIF rational values with locale-free decimal display

mod rational;
mod reader;
mod writer;

pub use rational::Rational;
pub use reader::{PhotoMetadata, read_photo_metadata};
pub(crate) use reader::EXIF_DATETIME_FORMAT;
pub use writer::{RawMetadata, reset_orientation};
