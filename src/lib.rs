//! # exif-frame
//!
//! Batch photo captioner: reads each photo's EXIF, turns it upright, appends a
//! caption strip (camera model, photographer, focal length / aperture /
//! shutter / ISO, capture time and an optional manufacturer logo) below it,
//! and writes a JPEG that carries the original EXIF block.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_frame::config::Config;
//! use exif_frame::layout::FontPair;
//! use exif_frame::logo::LogoTable;
//! use exif_frame::pipeline::{Pipeline, collect_images};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let fonts = FontPair::load(&config.base.font, &config.base.bold_font, config.layout.font_size)?;
//!     let logos = LogoTable::load(&config.logo);
//!
//!     let images = collect_images(&config.base.input_dir);
//!     for result in Pipeline::new(&config, &fonts, &logos).run(&images) {
//!         match result.error {
//!             Some(err) => eprintln!("{}: {err}", result.path.display()),
//!             None => println!("{} captioned: {}", result.path.display(), result.captioned),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`] — JSON configuration, loaded once per run
//! - [`exif`] — EXIF field extraction and raw block re-embedding
//! - [`orientation`] — EXIF orientation → pixel rotation
//! - [`layout`] — caption strip synthesis and the text rendering seam
//! - [`logo`] — manufacturer table and logo scaling
//! - [`compose`] — photo + strip compositing
//! - [`pipeline`] — file discovery and the per-file batch driver

pub mod compose;
pub mod config;
pub mod exif;
pub mod layout;
pub mod logo;
pub mod orientation;
pub mod pipeline;

#[cfg(test)]
mod test_helpers;
