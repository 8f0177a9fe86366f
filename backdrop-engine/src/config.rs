use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Resampling filter used when rasterizing to the analysis width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Widest raster `validate` accepts.
pub const MAX_ANALYSIS_WIDTH: u32 = 4096;

/// Tunables for one extraction call. The defaults reproduce the stock theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Width of the raster that gets scanned; height follows the aspect ratio.
    pub analysis_width: u32,
    /// Upper bound on width times height of the analysis raster. Images
    /// whose aspect ratio would exceed it are rejected instead of resized.
    pub max_analysis_pixels: u64,
    pub filter: ResizeFilter,
    /// Pixels with alpha below this are skipped.
    pub min_alpha: u8,
    pub min_value: f32,
    pub max_value: f32,
    pub min_saturation: f32,
    /// Per-channel bucket size. Must divide 256.
    pub bucket_step: u8,
    pub shadow_alpha: f32,
    /// Luminance shifts for the start, mid and end background stops.
    pub background_shift: [f32; 3],
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            analysis_width: 120,
            max_analysis_pixels: 1_000_000,
            filter: ResizeFilter::Triangle,
            min_alpha: 200,
            min_value: 0.15,
            max_value: 0.98,
            min_saturation: 0.20,
            bucket_step: 16,
            shadow_alpha: 0.35,
            background_shift: [-0.85, -0.75, -0.65],
        }
    }
}

impl ExtractionConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis_width == 0 {
            return Err(ConfigError::Invalid("analysis_width must be positive".into()));
        }
        if self.analysis_width > MAX_ANALYSIS_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "analysis_width {} exceeds {MAX_ANALYSIS_WIDTH}",
                self.analysis_width
            )));
        }
        if u64::from(self.analysis_width) > self.max_analysis_pixels {
            return Err(ConfigError::Invalid(format!(
                "max_analysis_pixels {} is smaller than one row of {}",
                self.max_analysis_pixels, self.analysis_width
            )));
        }
        // A u8 power of two always divides 256.
        if !self.bucket_step.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "bucket_step {} does not divide 256",
                self.bucket_step
            )));
        }
        for (name, value) in [
            ("min_value", self.min_value),
            ("max_value", self.max_value),
            ("min_saturation", self.min_saturation),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} {value} is outside [0, 1]"
                )));
            }
        }
        if self.min_value > self.max_value {
            return Err(ConfigError::Invalid(format!(
                "min_value {} exceeds max_value {}",
                self.min_value, self.max_value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ExtractionConfig::default()
            .validate()
            .expect("default config should validate");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = ExtractionConfig::from_json(r#"{ "bucket_step": 32, "filter": "nearest" }"#)
            .expect("config should parse");
        assert_eq!(config.bucket_step, 32);
        assert_eq!(config.filter, ResizeFilter::Nearest);
        assert_eq!(config.analysis_width, 120);
        assert_eq!(config.background_shift, [-0.85, -0.75, -0.65]);
    }

    #[test]
    fn step_that_does_not_divide_256_is_rejected() {
        for step in [0, 3, 24, 255] {
            let raw = format!(r#"{{ "bucket_step": {step} }}"#);
            assert!(
                matches!(ExtractionConfig::from_json(&raw), Err(ConfigError::Invalid(_))),
                "step {step} should be rejected"
            );
        }
    }

    #[test]
    fn oversized_analysis_raster_is_rejected() {
        let err = ExtractionConfig::from_json(r#"{ "analysis_width": 100000 }"#)
            .expect_err("width should be rejected");
        assert!(err.to_string().contains("exceeds 4096"));

        let err = ExtractionConfig::from_json(r#"{ "max_analysis_pixels": 50 }"#)
            .expect_err("budget should be rejected");
        assert!(err.to_string().contains("smaller than one row"));
    }

    #[test]
    fn inverted_value_window_is_rejected() {
        let err = ExtractionConfig::from_json(r#"{ "min_value": 0.9, "max_value": 0.5 }"#)
            .expect_err("window should be rejected");
        assert!(err.to_string().contains("exceeds max_value"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ExtractionConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ExtractionConfig::load("/definitely/not/here.json").expect_err("missing file");
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
