use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use exif_frame::config::Config;
use exif_frame::layout::FontPair;
use exif_frame::logo::LogoTable;
use exif_frame::pipeline::{self, Pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-frame",
    version,
    about = "Append a camera/shot-parameter caption strip below every photo in a directory"
)]
struct Cli {
    /// Path to config file (default: config.json in the working directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config file and exit
    #[arg(long)]
    init: bool,

    /// Process photos without writing any output
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = path.map(PathBuf::from).unwrap_or_else(Config::config_path);
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;

    let images = pipeline::collect_images(&config.base.input_dir);
    if images.is_empty() {
        anyhow::bail!(
            "No JPEG files found in {}",
            config.base.input_dir.display()
        );
    }

    log::info!("Found {} image(s) to process", images.len());
    if cli.dry_run {
        log::info!("DRY RUN — no files will be written");
    } else {
        std::fs::create_dir_all(&config.base.output_dir)
            .context("Failed to create output directory")?;
    }

    let fonts = FontPair::load(
        &config.base.font,
        &config.base.bold_font,
        config.layout.font_size,
    )?;
    let logos = LogoTable::load(&config.logo);

    let results = Pipeline::new(&config, &fonts, &logos)
        .dry_run(cli.dry_run)
        .run(&images);

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "output_path": r.output_path.as_ref().map(|p| p.display().to_string()),
                    "captioned": r.captioned,
                    "rotated": r.rotated,
                    "model": r.metadata.model,
                    "make": r.metadata.make,
                    "dimensions": r.dimensions,
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let total = results.len();
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let captioned = results.iter().filter(|r| r.captioned).count();
    let failed = total - success;
    log::info!(
        "Done: {success} succeeded ({captioned} captioned), {failed} failed out of {total} images"
    );

    Ok(())
}
