//! Stateful front door for interactive use
//!
//! A [`Session`] keeps everything that should live across renders: the
//! glyph brightness cache, the working character set, the render memo, the
//! padded image and the current resolution.

use crate::config::{RenderConfig, max_resolution, min_resolution};
use crate::error::{RenderError, Result};
use crate::glyph::{BitmapFont, GlyphCache, GlyphRasterizer};
use crate::matcher::{CharMatcher, RoundingPolicy};
use crate::padding::pad;
use crate::pipeline::{CharGrid, Renderer};
use image::RgbImage;
use std::ops::RangeInclusive;

#[derive(Debug)]
pub struct Session {
    glyphs: GlyphCache,
    matcher: CharMatcher,
    renderer: Renderer,
    image: Option<RgbImage>,
    resolution: u32,
}

impl Session {
    pub fn new(config: RenderConfig) -> Result<Self> {
        Self::with_rasterizer(config, BitmapFont)
    }

    pub fn with_rasterizer(
        config: RenderConfig,
        rasterizer: impl GlyphRasterizer + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let mut glyphs = GlyphCache::new(rasterizer);
        let mut matcher = CharMatcher::new(config.charset.chars(), &mut glyphs);
        matcher.set_rounding(config.rounding);

        Ok(Self {
            glyphs,
            matcher,
            renderer: Renderer::new(),
            image: None,
            resolution: config.resolution,
        })
    }

    /// Pad `image` and make it the render source
    pub fn load(&mut self, image: RgbImage) -> Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RenderError::EmptyImage);
        }
        let padded = pad(&image);
        log::info!(
            "loaded {}x{} image, padded to {}x{}",
            image.width(),
            image.height(),
            padded.width(),
            padded.height()
        );
        self.image = Some(padded);
        Ok(())
    }

    /// The padded source image, if one is loaded
    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    pub fn add_char(&mut self, c: char) {
        self.matcher.add_char(c, &mut self.glyphs);
    }

    pub fn remove_char(&mut self, c: char) {
        self.matcher.remove_char(c);
    }

    pub fn add_range(&mut self, range: RangeInclusive<char>) {
        self.matcher.add_range(range, &mut self.glyphs);
    }

    pub fn remove_range(&mut self, range: RangeInclusive<char>) {
        self.matcher.remove_range(range);
    }

    /// Working character set in ascending order
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.matcher.chars()
    }

    pub fn set_rounding(&mut self, policy: RoundingPolicy) {
        self.matcher.set_rounding(policy);
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.matcher.rounding()
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Double the resolution, up to one column per pixel
    pub fn resolution_up(&mut self) -> Result<u32> {
        let image = self.image.as_ref().ok_or(RenderError::NoImage)?;
        let (min, max) = (min_resolution(image), max_resolution(image));
        let requested = self.resolution.saturating_mul(2);
        if requested > max {
            return Err(RenderError::ResolutionOutOfBounds { requested, min, max });
        }
        self.resolution = requested;
        Ok(requested)
    }

    /// Halve the resolution, keeping at least one full row of cells
    pub fn resolution_down(&mut self) -> Result<u32> {
        let image = self.image.as_ref().ok_or(RenderError::NoImage)?;
        let (min, max) = (min_resolution(image), max_resolution(image));
        let requested = self.resolution / 2;
        if requested < min {
            return Err(RenderError::ResolutionOutOfBounds { requested, min, max });
        }
        self.resolution = requested;
        Ok(requested)
    }

    /// Render the loaded image at the current resolution
    ///
    /// Fails with `ResolutionOutOfBounds` when the image is narrower than
    /// the requested number of columns.
    pub fn render(&mut self) -> Result<CharGrid> {
        let image = self.image.as_ref().ok_or(RenderError::NoImage)?;
        let max = max_resolution(image);
        if self.resolution > max {
            return Err(RenderError::ResolutionOutOfBounds {
                requested: self.resolution,
                min: min_resolution(image),
                max,
            });
        }
        self.renderer.render(image, self.resolution, &mut self.matcher)
    }
}
