use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a captioning run.
///
/// Loaded once at startup and passed by reference to every stage of the
/// pipeline. Nothing mutates it after [`Config::load`] returns.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_frame::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.user = "Jane Doe".into();
/// config.base.quality = 95;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input/output locations, JPEG quality and caption fonts.
    pub base: BaseConfig,
    /// Manufacturer logo settings.
    pub logo: LogoConfig,
    /// Photographer name printed under the camera model.
    pub user: String,
    /// Caption geometry in font-space pixels.
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Input/output locations, output quality and font assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Directory walked recursively for photos.
    pub input_dir: PathBuf,
    /// Directory receiving captioned photos. Created if absent.
    pub output_dir: PathBuf,
    /// JPEG quality, 1–100.
    pub quality: u8,
    /// Regular-weight font, used for the photographer name and the date.
    pub font: PathBuf,
    /// Emphasized font, used for the camera model and shot parameters.
    pub bold_font: PathBuf,
}

/// Logo display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoConfig {
    /// Paste a manufacturer logo next to the shot parameters.
    pub enable: bool,
    /// Ordered manufacturer table. The first entry whose `id` occurs in the
    /// EXIF `Make` string wins.
    pub makes: Vec<MakeEntry>,
}

/// One row of the manufacturer table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeEntry {
    /// Substring searched for in the EXIF `Make` value (case-sensitive).
    pub id: String,
    /// Logo image file.
    pub path: PathBuf,
}

/// Geometry of the caption blocks before they are scaled to the photo.
///
/// Text is rendered at `font_size` and the blocks are then resized to a
/// fraction of the photo width, so these values set proportions rather
/// than final pixel sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Point size the caption text is rasterized at.
    pub font_size: u32,
    /// Outer margin on the caption strip.
    pub border: u32,
    /// Spacing unit between text lines and caption elements.
    pub gap: u32,
}

/// Upper bound for `layout.border` and `layout.gap`, in font-space pixels.
pub const MAX_LAYOUT_SPACING: u32 = 10_000;

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: 240,
            border: 60,
            gap: 100,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                input_dir: PathBuf::from("input"),
                output_dir: PathBuf::from("output"),
                quality: 90,
                font: PathBuf::from("fonts/regular.ttf"),
                bold_font: PathBuf::from("fonts/bold.ttf"),
            },
            logo: LogoConfig {
                enable: false,
                makes: vec![
                    MakeEntry { id: "Canon".to_string(), path: PathBuf::from("logos/canon.png") },
                    MakeEntry { id: "FUJIFILM".to_string(), path: PathBuf::from("logos/fujifilm.png") },
                    MakeEntry { id: "NIKON".to_string(), path: PathBuf::from("logos/nikon.png") },
                    MakeEntry { id: "SONY".to_string(), path: PathBuf::from("logos/sony.png") },
                ],
            },
            user: "Photographer".to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    /// Default config location — `config.json` in the working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("config.json")
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(),
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(),
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Reject values the encoder or the layout engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.base.quality) {
            anyhow::bail!("quality must be between 1 and 100, got {}", self.base.quality);
        }
        if self.layout.font_size == 0 {
            anyhow::bail!("layout.font_size must be greater than zero");
        }
        for (name, value) in [("border", self.layout.border), ("gap", self.layout.gap)] {
            if value > MAX_LAYOUT_SPACING {
                anyhow::bail!("layout.{name} must be at most {MAX_LAYOUT_SPACING}, got {value}");
            }
        }
        Ok(())
    }
}
