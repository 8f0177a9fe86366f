use backdrop_color::{quantize, rgb_to_hsv, Rgb};
use image::{DynamicImage, GenericImageView, RgbaImage};
use log::{debug, warn};
use palette::Srgb;
use std::collections::HashMap;

use crate::config::ExtractionConfig;
use crate::theme::ThemeRecord;

/// A quantized color used as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BucketKey {
    pub fn of(color: Rgb, step: u8) -> Self {
        Self {
            r: quantize(color.red, step),
            g: quantize(color.green, step),
            b: quantize(color.blue, step),
        }
    }

    pub fn color(self) -> Rgb {
        Srgb::new(self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    count: u32,
    first_seen: usize,
}

/// Occurrence counts per bucket.
///
/// Buckets with equal counts rank in the order they were first recorded, so
/// a row-major scan always produces the same ranking.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    tallies: HashMap<BucketKey, Tally>,
}

impl FrequencyTable {
    pub fn record(&mut self, key: BucketKey) {
        let next = self.tallies.len();
        self.tallies
            .entry(key)
            .or_insert(Tally {
                count: 0,
                first_seen: next,
            })
            .count += 1;
    }

    pub fn count(&self, key: BucketKey) -> u32 {
        self.tallies.get(&key).map_or(0, |t| t.count)
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Buckets by descending count.
    pub fn ranked(&self) -> Vec<(BucketKey, u32)> {
        let mut entries: Vec<(BucketKey, Tally)> =
            self.tallies.iter().map(|(k, t)| (*k, *t)).collect();
        entries.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });
        entries.into_iter().map(|(k, t)| (k, t.count)).collect()
    }

    /// The top bucket and the runner-up, which falls back to the top bucket
    /// when it is the only one.
    pub fn dominant_pair(&self) -> Option<(BucketKey, BucketKey)> {
        let ranked = self.ranked();
        let (primary, _) = *ranked.first()?;
        let secondary = ranked.get(1).map_or(primary, |(key, _)| *key);
        Some((primary, secondary))
    }
}

/// Raster size for analysis: fixed width, height from the aspect ratio.
pub fn analysis_size(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    let scaled = (f64::from(height) / f64::from(width) * f64::from(target_width)).round();
    (target_width, (scaled as u32).max(1))
}

/// Whether a pixel is a usable accent candidate.
pub fn passes_filter(color: Rgb, config: &ExtractionConfig) -> bool {
    let hsv = rgb_to_hsv(color);
    hsv.v >= config.min_value && hsv.v <= config.max_value && hsv.s >= config.min_saturation
}

/// Scans every pixel of `raster` and counts the ones that survive filtering.
pub fn count_buckets(raster: &RgbaImage, config: &ExtractionConfig) -> FrequencyTable {
    let mut table = FrequencyTable::default();
    for pixel in raster.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < config.min_alpha {
            continue;
        }
        let color = Srgb::new(r, g, b);
        if !passes_filter(color, config) {
            continue;
        }
        table.record(BucketKey::of(color, config.bucket_step));
    }
    table
}

/// Derives a theme from decoded pixels.
///
/// Returns `None` when the config is invalid, the image is empty, its
/// aspect ratio blows the pixel budget, or every pixel is filtered out.
pub fn extract_from_image(image: &DynamicImage, config: &ExtractionConfig) -> Option<ThemeRecord> {
    if let Err(err) = config.validate() {
        warn!("refusing to extract palette: {err}");
        return None;
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let (target_w, target_h) = analysis_size(width, height, config.analysis_width);
    if u64::from(target_w) * u64::from(target_h) > config.max_analysis_pixels {
        warn!(
            "{width}x{height} image needs a {target_w}x{target_h} raster, over the {} pixel budget",
            config.max_analysis_pixels
        );
        return None;
    }
    let raster = image
        .resize_exact(target_w, target_h, config.filter.into())
        .to_rgba8();
    let table = count_buckets(&raster, config);

    let Some((primary, secondary)) = table.dominant_pair() else {
        debug!("no pixel of {target_w}x{target_h} raster survived filtering");
        return None;
    };
    debug!(
        "{} buckets from {target_w}x{target_h} raster, primary {:?} ({}), secondary {:?} ({})",
        table.len(),
        primary,
        table.count(primary),
        secondary,
        table.count(secondary),
    );

    Some(ThemeRecord::derive(primary.color(), secondary.color(), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn key(r: u8, g: u8, b: u8) -> BucketKey {
        BucketKey { r, g, b }
    }

    #[test]
    fn analysis_size_keeps_aspect_ratio() {
        assert_eq!(analysis_size(1920, 1080, 120), (120, 68));
        assert_eq!(analysis_size(2, 2, 120), (120, 120));
        assert_eq!(analysis_size(10_000, 10, 120), (120, 1));
        assert_eq!(analysis_size(60, 30, 120), (120, 60));
        assert_eq!(analysis_size(1, 200_000, 120), (120, 24_000_000));
    }

    #[test]
    fn extremely_tall_image_is_refused_before_resizing() {
        let raster = RgbaImage::from_pixel(1, 200_000, Rgba([224, 0, 0, 255]));
        assert_eq!(
            extract_from_image(&DynamicImage::ImageRgba8(raster), &ExtractionConfig::default()),
            None
        );
    }

    #[test]
    fn tall_image_within_budget_still_extracts() {
        // 120 x 6000 = 720 000 pixels.
        let raster = RgbaImage::from_pixel(2, 100, Rgba([224, 0, 0, 255]));
        let theme = extract_from_image(
            &DynamicImage::ImageRgba8(raster),
            &ExtractionConfig::default(),
        )
        .expect("theme");
        assert_eq!(theme.accent, Srgb::new(224, 0, 0));
    }

    #[test]
    fn bucket_key_floors_each_channel() {
        assert_eq!(BucketKey::of(Srgb::new(255, 17, 15), 16), key(240, 16, 0));
    }

    #[test]
    fn ties_rank_in_first_seen_order() {
        let mut table = FrequencyTable::default();
        for k in [key(32, 0, 0), key(0, 0, 32), key(0, 0, 32), key(32, 0, 0), key(0, 32, 0)] {
            table.record(k);
        }
        assert_eq!(
            table.ranked(),
            vec![(key(32, 0, 0), 2), (key(0, 0, 32), 2), (key(0, 32, 0), 1)]
        );
    }

    #[test]
    fn single_bucket_is_reused_as_secondary() {
        let mut table = FrequencyTable::default();
        table.record(key(64, 0, 0));
        assert_eq!(table.dominant_pair(), Some((key(64, 0, 0), key(64, 0, 0))));
        assert_eq!(FrequencyTable::default().dominant_pair(), None);
    }

    #[test]
    fn filter_rejects_dark_bright_and_gray() {
        let config = ExtractionConfig::default();
        assert!(passes_filter(Srgb::new(224, 0, 0), &config));
        assert!(!passes_filter(Srgb::new(30, 0, 0), &config));
        assert!(!passes_filter(Srgb::new(255, 0, 0), &config));
        assert!(!passes_filter(Srgb::new(200, 180, 180), &config));
    }

    #[test]
    fn translucent_pixels_are_not_counted() {
        let config = ExtractionConfig::default();
        let mut raster = RgbaImage::from_pixel(2, 1, Rgba([224, 0, 0, 255]));
        raster.put_pixel(1, 0, Rgba([0, 0, 224, 199]));
        let table = count_buckets(&raster, &config);
        assert_eq!(table.len(), 1);
        assert_eq!(table.count(key(224, 0, 0)), 1);
    }

    #[test]
    fn two_color_image_yields_both_buckets() {
        let mut raster = RgbaImage::from_pixel(2, 2, Rgba([224, 0, 0, 255]));
        raster.put_pixel(0, 1, Rgba([0, 0, 224, 255]));
        raster.put_pixel(1, 1, Rgba([0, 0, 224, 255]));
        let theme = extract_from_image(
            &DynamicImage::ImageRgba8(raster),
            &ExtractionConfig::default(),
        )
        .expect("theme");

        assert_eq!(theme.accent, Srgb::new(224, 0, 0));
        assert_eq!(theme.accent_secondary, Srgb::new(0, 0, 224));
        assert_eq!(theme.shadow.rgb, Srgb::new(224, 0, 0));
        assert_eq!(theme.shadow.alpha, 0.35);
    }

    #[test]
    fn gray_image_yields_nothing() {
        let raster = RgbaImage::from_pixel(4, 4, Rgba([128, 128, 128, 255]));
        assert_eq!(
            extract_from_image(&DynamicImage::ImageRgba8(raster), &ExtractionConfig::default()),
            None
        );
    }

    #[test]
    fn invalid_config_yields_nothing_instead_of_panicking() {
        let raster = RgbaImage::from_pixel(4, 4, Rgba([224, 0, 0, 255]));
        let config = ExtractionConfig {
            bucket_step: 0,
            ..ExtractionConfig::default()
        };
        assert_eq!(extract_from_image(&DynamicImage::ImageRgba8(raster), &config), None);
    }

    #[test]
    fn empty_image_yields_nothing() {
        let raster = RgbaImage::new(0, 0);
        assert_eq!(
            extract_from_image(&DynamicImage::ImageRgba8(raster), &ExtractionConfig::default()),
            None
        );
    }
}
