//! Image-derived theme extraction.
//!
//! [`extract_palette`] loads an image, counts quantized colors among the
//! pixels that pass a saturation/value filter, and derives a [`ThemeRecord`]
//! from the two most frequent buckets. Every failure mode collapses to
//! `None`; callers keep whatever theme they already had.

pub mod apply;
pub mod binding;
pub mod config;
pub mod extract;
pub mod source;
pub mod theme;

use log::warn;

pub use apply::{apply_theme, CssVariables, ThemeSink};
pub use binding::{extract_palette_within, ThemeBinding};
pub use config::{ConfigError, ExtractionConfig, ResizeFilter};
pub use extract::{extract_from_image, BucketKey, FrequencyTable};
pub use source::{find_cover_image, load_image, ImageSource, LoadError};
pub use theme::ThemeRecord;

/// Extracts a theme with the stock configuration.
pub async fn extract_palette(source: &ImageSource) -> Option<ThemeRecord> {
    extract_palette_with(source, &ExtractionConfig::default()).await
}

pub async fn extract_palette_with(
    source: &ImageSource,
    config: &ExtractionConfig,
) -> Option<ThemeRecord> {
    let bytes = match source.read().await {
        Ok(bytes) => bytes.into_owned(),
        Err(err) => {
            warn!("could not load {source}: {err}");
            return None;
        }
    };

    // Decode and scan off the async workers so a caller's timeout can fire.
    let config = config.clone();
    let label = source.to_string();
    let analysis = tokio::task::spawn_blocking(move || match crate::source::decode(&bytes) {
        Ok(image) => extract_from_image(&image, &config),
        Err(err) => {
            warn!("could not load {label}: {err}");
            None
        }
    });
    match analysis.await {
        Ok(theme) => theme,
        Err(err) => {
            warn!("palette analysis for {source} failed: {err}");
            None
        }
    }
}
