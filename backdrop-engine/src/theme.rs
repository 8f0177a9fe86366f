use backdrop_color::{adjust_luminance, serde_hex, with_alpha, Rgb, Rgba};
use serde::Serialize;

use crate::config::ExtractionConfig;

/// The colors derived from one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThemeRecord {
    #[serde(with = "serde_hex")]
    pub accent: Rgb,
    #[serde(with = "serde_hex")]
    pub accent_secondary: Rgb,
    #[serde(with = "serde_hex")]
    pub bg_start: Rgb,
    #[serde(with = "serde_hex")]
    pub bg_mid: Rgb,
    #[serde(with = "serde_hex")]
    pub bg_end: Rgb,
    pub shadow: Rgba,
}

impl ThemeRecord {
    /// Builds the full theme from the two dominant colors.
    ///
    /// The start and end background stops darken `primary`; the middle stop
    /// darkens `secondary`.
    pub fn derive(primary: Rgb, secondary: Rgb, config: &ExtractionConfig) -> Self {
        let [start, mid, end] = config.background_shift;
        Self {
            accent: primary,
            accent_secondary: secondary,
            bg_start: adjust_luminance(primary, start),
            bg_mid: adjust_luminance(secondary, mid),
            bg_end: adjust_luminance(primary, end),
            shadow: with_alpha(primary, config.shadow_alpha),
        }
    }

    /// Gradient stops in start, mid, end order.
    pub fn backgrounds(&self) -> [Rgb; 3] {
        [self.bg_start, self.bg_mid, self.bg_end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;

    #[test]
    fn derive_uses_stock_shifts() {
        let primary = Srgb::new(224, 0, 0);
        let secondary = Srgb::new(0, 0, 224);
        let theme = ThemeRecord::derive(primary, secondary, &ExtractionConfig::default());

        assert_eq!(theme.accent, primary);
        assert_eq!(theme.accent_secondary, secondary);
        // 224 - 216.75, 224 - 191.25, 224 - 165.75
        assert_eq!(theme.bg_start, Srgb::new(7, 0, 0));
        assert_eq!(theme.bg_mid, Srgb::new(0, 0, 33));
        assert_eq!(theme.bg_end, Srgb::new(58, 0, 0));
        assert_eq!(theme.shadow, with_alpha(primary, 0.35));
    }

    #[test]
    fn serializes_as_css_strings() {
        let primary = Srgb::new(224, 0, 0);
        let theme = ThemeRecord::derive(primary, primary, &ExtractionConfig::default());
        let json = serde_json::to_value(theme).expect("theme should serialize");
        assert_eq!(json["accent"], "#e00000");
        assert_eq!(json["accent_secondary"], "#e00000");
        assert_eq!(json["bg_start"], "#070000");
        assert_eq!(json["shadow"], "rgba(224, 0, 0, 0.35)");
    }
}
