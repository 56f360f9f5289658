use anyhow::{Context, Result};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::compose::append_caption;
use crate::config::Config;
use crate::exif::{self, PhotoMetadata, RawMetadata};
use crate::layout::{self, LayoutContext, TextRenderer};
use crate::logo::LogoTable;
use crate::orientation::{self, Rotation};

/// File-name fragments that mark a file as a JPEG candidate (case-sensitive).
const JPEG_NAME_MARKERS: &[&str] = &["jpg", "jpeg", "JPG", "JPEG"];

/// The result of processing a single photo.
///
/// `error` is set when the photo could not be read, decoded, encoded or
/// written; the batch carries on regardless. A photo without enough EXIF
/// for a caption is not an error: it is written uncaptioned and
/// `captioned` stays `false`.
#[derive(Debug, Clone, Default)]
pub struct ProcessResult {
    pub path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub metadata: PhotoMetadata,
    pub captioned: bool,
    pub rotated: bool,
    /// Final pixel size of the written image.
    pub dimensions: Option<(u32, u32)>,
    pub error: Option<String>,
}

/// A photo after orientation, captioning and compositing.
#[derive(Debug, Clone)]
pub struct CaptionedPhoto {
    pub image: DynamicImage,
    pub metadata: PhotoMetadata,
    pub rotation: Rotation,
    pub captioned: bool,
}

/// Collect JPEG candidates under `input_dir`.
///
/// Walks recursively (following symlinks) and keeps files whose name
/// contains `jpg`, `jpeg`, `JPG` or `JPEG`. The result is sorted so runs
/// are reproducible.
///
/// # Example
///
/// ```rust,no_run
/// use exif_frame::pipeline::collect_images;
///
/// let images = collect_images("./photos".as_ref());
/// println!("Found {} photos", images.len());
/// ```
pub fn collect_images(input_dir: &Path) -> Vec<PathBuf> {
    if !input_dir.is_dir() {
        log::warn!("Input directory does not exist: {}", input_dir.display());
        return Vec::new();
    }

    let mut images: Vec<PathBuf> = WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_jpeg_name(e.path()))
        .map(|e| e.into_path())
        .collect();
    images.sort();
    images
}

/// Check if a file name contains one of the JPEG markers.
fn is_jpeg_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| JPEG_NAME_MARKERS.iter().any(|marker| name.contains(marker)))
        .unwrap_or(false)
}

/// Where the captioned copy of `path` goes: same relative path under `output_dir`.
pub fn output_path_for(input_dir: &Path, output_dir: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(input_dir) {
        Ok(relative) => output_dir.join(relative),
        Err(_) => output_dir.join(path.file_name().unwrap_or(path.as_os_str())),
    }
}

/// Runs photos through orient → caption → composite → encode → write.
///
/// Holds only shared, read-only state; every photo is processed start to
/// finish before the next one.
pub struct Pipeline<'a> {
    config: &'a Config,
    fonts: &'a dyn TextRenderer,
    logos: &'a LogoTable,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, fonts: &'a dyn TextRenderer, logos: &'a LogoTable) -> Self {
        Self {
            config,
            fonts,
            logos,
            dry_run: false,
        }
    }

    /// Process everything but write nothing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every photo in `images`, one after another.
    pub fn run(&self, images: &[PathBuf]) -> Vec<ProcessResult> {
        let total = images.len();
        images
            .iter()
            .enumerate()
            .map(|(i, path)| {
                log::info!("[{}/{}] Processing: {}", i + 1, total, path.display());
                let result = self.process_file(path);
                if let Some(ref err) = result.error {
                    log::error!("  Error: {err}");
                }
                result
            })
            .collect()
    }

    /// Process one photo. Never fails: errors land in [`ProcessResult::error`].
    pub fn process_file(&self, path: &Path) -> ProcessResult {
        let mut result = ProcessResult {
            path: path.to_path_buf(),
            ..Default::default()
        };
        if let Err(e) = self.try_process_file(path, &mut result) {
            result.error = Some(format!("{e:#}"));
        }
        result
    }

    fn try_process_file(&self, path: &Path, result: &mut ProcessResult) -> Result<()> {
        let bytes = std::fs::read(path).context("Failed to read file")?;
        let raw = RawMetadata::from_jpeg_bytes(&bytes)?;
        let image = image::load_from_memory(&bytes).context("Failed to decode image")?;

        let metadata = match exif::read_photo_metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Failed to read EXIF from {}: {e}", path.display());
                PhotoMetadata::default()
            }
        };
        log::debug!("  EXIF: {metadata:?}");

        let photo = self.caption_photo(image, metadata);
        result.captioned = photo.captioned;
        result.rotated = !photo.rotation.is_none();
        result.dimensions = Some((photo.image.width(), photo.image.height()));
        result.metadata = photo.metadata;

        let raw = if result.rotated { raw.with_orientation_reset() } else { raw };
        let encoded = encode_jpeg(&photo.image, self.config.base.quality)?;
        let output = raw.embed(encoded)?;

        let out_path = output_path_for(&self.config.base.input_dir, &self.config.base.output_dir, path);
        if self.dry_run {
            log::info!("  Would write {}", out_path.display());
        } else {
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent).context("Failed to create output directory")?;
            }
            std::fs::write(&out_path, &output).context("Failed to write output file")?;
            log::info!("  Wrote {}", out_path.display());
        }
        result.output_path = Some(out_path);

        Ok(())
    }

    /// Orient, caption and composite an already decoded photo.
    ///
    /// The metadata's width/height are replaced with the upright image size
    /// before the caption is laid out.
    pub fn caption_photo(&self, image: DynamicImage, metadata: PhotoMetadata) -> CaptionedPhoto {
        let (image, rotation) = orientation::normalize(image, metadata.orientation);
        let metadata = metadata.with_dimensions(image.width(), image.height());

        let ctx = LayoutContext {
            layout: self.config.layout,
            user: &self.config.user,
            fonts: self.fonts,
            logos: self.logos,
        };
        let caption = layout::make_caption_image(&metadata, &ctx);
        let captioned = !caption.is_placeholder();

        CaptionedPhoto {
            image: append_caption(image, &caption),
            metadata,
            rotation,
            captioned,
        }
    }
}

/// Encode as baseline JPEG at `quality`.
fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&image.to_rgb8())
        .context("Failed to encode JPEG")?;
    Ok(buf)
}
