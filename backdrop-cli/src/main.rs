mod cli;

use anyhow::{bail, Context, Result};
use backdrop_engine::{
    apply_theme, extract_palette_with, extract_palette_within, find_cover_image, CssVariables,
    ExtractionConfig, ImageSource, ThemeRecord,
};
use clap::Parser;
use cli::{Args, Format};
use std::process::ExitCode;
use std::time::Duration;

const NO_PALETTE: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ExtractionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExtractionConfig::default(),
    };
    let source = resolve_source(&args.source)?;
    log::info!("extracting palette from {source}");

    let theme = match args.timeout_ms {
        Some(ms) => extract_palette_within(&source, &config, Duration::from_millis(ms)).await,
        None => extract_palette_with(&source, &config).await,
    };
    let Some(theme) = theme else {
        eprintln!("no palette available for {source}");
        return Ok(ExitCode::from(NO_PALETTE));
    };

    print!("{}", render(&theme, args.format)?);
    Ok(ExitCode::SUCCESS)
}

/// Directories resolve to the cover image they contain.
fn resolve_source(raw: &str) -> Result<ImageSource> {
    let source = ImageSource::parse(raw);
    let ImageSource::Path(path) = &source else {
        return Ok(source);
    };
    if !path.is_dir() {
        return Ok(source);
    }
    match find_cover_image(path) {
        Some(cover) => {
            log::debug!("using {} from {}", cover.display(), path.display());
            Ok(ImageSource::Path(cover))
        }
        None => bail!("no image found in {}", path.display()),
    }
}

fn render(theme: &ThemeRecord, format: Format) -> Result<String> {
    match format {
        Format::Css => {
            let mut vars = CssVariables::default();
            apply_theme(theme, &mut vars);
            Ok(vars.to_string())
        }
        Format::Json => {
            let mut json =
                serde_json::to_string_pretty(theme).context("failed to serialize theme")?;
            json.push('\n');
            Ok(json)
        }
    }
}
