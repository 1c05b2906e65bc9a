use crate::error::{RenderError, Result};
use crate::matcher::{CharMatcher, MIN_CHARSET_LEN, RoundingPolicy};
use image::RgbImage;
use std::collections::BTreeSet;

/// Configuration for ASCII art conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Output columns, default 2
    pub resolution: u32,
    /// Rounding between brightness levels, default `abs` (nearest)
    pub rounding: RoundingPolicy,
    /// Characters to match with, default "0123456789"
    pub charset: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            resolution: 2,
            rounding: RoundingPolicy::Nearest,
            charset: CharMatcher::DEFAULT_CHARSET.to_string(),
        }
    }
}

impl RenderConfig {
    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(RenderError::InvalidConfig(
                "resolution must be at least 1, got 0".to_string(),
            ));
        }
        let unique = self.charset.chars().collect::<BTreeSet<_>>().len();
        if unique < MIN_CHARSET_LEN {
            return Err(RenderError::InvalidConfig(format!(
                "charset needs at least {MIN_CHARSET_LEN} distinct characters, got {unique}"
            )));
        }
        Ok(())
    }
}

/// Largest resolution an image supports: one column per pixel
pub fn max_resolution(image: &RgbImage) -> u32 {
    image.width().max(1)
}

/// Smallest resolution that keeps at least one full row of cells
pub fn min_resolution(image: &RgbImage) -> u32 {
    (image.width() / image.height().max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolution, 2);
        assert_eq!(config.rounding, RoundingPolicy::Nearest);
    }

    #[test]
    fn test_invalid_resolution() {
        let config = RenderConfig {
            resolution: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_charset() {
        let mut config = RenderConfig::default();
        config.charset = "aaaa".to_string();
        assert!(config.validate().is_err());

        config.charset = String::new();
        assert!(config.validate().is_err());

        config.charset = "ab".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolution_bounds() {
        let wide = RgbImage::new(64, 16);
        assert_eq!(max_resolution(&wide), 64);
        assert_eq!(min_resolution(&wide), 4);

        let tall = RgbImage::new(16, 64);
        assert_eq!(max_resolution(&tall), 16);
        assert_eq!(min_resolution(&tall), 1);
    }
}
