use crate::error::{RenderError, Result};
use crate::matcher::CharMatcher;
use crate::partition::{BrightnessGrid, Partitioner, TilePartitioner};
use image::RgbImage;
use std::fmt;

/// Rendered characters, one row per output line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharGrid {
    rows: Vec<Vec<char>>,
    columns: usize,
}

impl CharGrid {
    pub fn new(rows: Vec<Vec<char>>, columns: usize) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns));
        Self { rows, columns }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn as_rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    /// Each row collected into a `String`
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| row.iter().collect())
    }
}

impl fmt::Display for CharGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(&line)?;
        }
        Ok(())
    }
}

/// The last computed brightness grid and the inputs that produced it
#[derive(Debug, Clone, Default)]
pub struct RenderMemo {
    snapshot: Option<Snapshot>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    image: RgbImage,
    resolution: u32,
    grid: BrightnessGrid,
}

impl Snapshot {
    /// Full content comparison; dimensions are checked first
    fn matches(&self, image: &RgbImage, resolution: u32) -> bool {
        self.resolution == resolution
            && self.image.dimensions() == image.dimensions()
            && self.image == *image
    }
}

impl RenderMemo {
    /// Grid cached for `image` at `resolution`, if the snapshot matches
    ///
    /// Image identity is content equality, so every lookup costs a
    /// comparison of all pixels.
    pub fn lookup(&self, image: &RgbImage, resolution: u32) -> Option<&BrightnessGrid> {
        self.snapshot
            .as_ref()
            .filter(|snapshot| snapshot.matches(image, resolution))
            .map(|snapshot| &snapshot.grid)
    }

    /// Cached grid for the inputs, or `compute` it and replace the snapshot
    pub fn get_or_compute<F>(
        &mut self,
        image: &RgbImage,
        resolution: u32,
        compute: F,
    ) -> &BrightnessGrid
    where
        F: FnOnce() -> BrightnessGrid,
    {
        let (width, height) = image.dimensions();
        let snapshot = match self.snapshot.take() {
            Some(snapshot) if snapshot.matches(image, resolution) => {
                log::debug!("render memo hit ({width}x{height} @ {resolution})");
                snapshot
            }
            _ => {
                log::debug!("render memo miss ({width}x{height} @ {resolution}), partitioning");
                Snapshot {
                    image: image.clone(),
                    resolution,
                    grid: compute(),
                }
            }
        };
        &self.snapshot.insert(snapshot).grid
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}

/// Converts images into character grids
///
/// The renderer owns a single-slot [`RenderMemo`], so rendering the same
/// image at the same resolution twice only partitions it once. The memo can
/// be moved between renderers with [`Renderer::with_memo`] and
/// [`Renderer::into_memo`].
pub struct Renderer {
    partitioner: Box<dyn Partitioner>,
    memo: RenderMemo,
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_partitioner(TilePartitioner)
    }

    pub fn with_partitioner(partitioner: impl Partitioner + 'static) -> Self {
        Self {
            partitioner: Box::new(partitioner),
            memo: RenderMemo::default(),
        }
    }

    /// Reuse a memo from an earlier renderer
    pub fn with_memo(mut self, memo: RenderMemo) -> Self {
        self.memo = memo;
        self
    }

    pub fn memo(&self) -> &RenderMemo {
        &self.memo
    }

    pub fn into_memo(self) -> RenderMemo {
        self.memo
    }

    /// Render an image as a grid of characters
    ///
    /// This runs the conversion pipeline:
    /// 1. Validate the resolution, the matcher and the image
    /// 2. Size the output: `resolution` columns, `height * resolution / width` rows
    /// 3. Fetch the brightness grid from the memo or partition the image
    /// 4. Match every cell's brightness to a character
    ///
    /// # Arguments
    /// * `image` - Source image, usually padded to power-of-two dimensions
    /// * `resolution` - Number of character columns
    /// * `matcher` - Character set and rounding policy to match with
    ///
    /// # Returns
    /// A `rows × resolution` grid, or an error if the inputs cannot produce one
    pub fn render(
        &mut self,
        image: &RgbImage,
        resolution: u32,
        matcher: &mut CharMatcher,
    ) -> Result<CharGrid> {
        if resolution == 0 {
            return Err(RenderError::InvalidResolution(resolution));
        }
        matcher.ensure_matchable()?;
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage);
        }

        let rows = (u64::from(height) * u64::from(resolution) / u64::from(width)) as usize;
        let columns = resolution as usize;

        let partitioner = &self.partitioner;
        let grid = self.memo.get_or_compute(image, resolution, || {
            partitioner.brightness_grid(image, resolution)
        });

        let mut output = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut line = Vec::with_capacity(columns);
            for col in 0..columns {
                // cells the partition could not produce count as black
                let brightness = grid.get(row, col).unwrap_or(0.0);
                line.push(matcher.match_brightness(brightness)?);
            }
            output.push(line);
        }

        Ok(CharGrid::new(output, columns))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("memo", &self.memo)
            .finish_non_exhaustive()
    }
}
