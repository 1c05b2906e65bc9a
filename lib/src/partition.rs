use image::{Rgb, RgbImage, imageops};
use rayon::prelude::*;

const RED_WEIGHT: f64 = 0.2126;
const GREEN_WEIGHT: f64 = 0.7152;
const BLUE_WEIGHT: f64 = 0.0722;
const MAX_CHANNEL: f64 = 255.0;

/// Weighted luminance of a pixel, in channel units [0, 255]
#[inline]
pub fn luminance(pixel: &Rgb<u8>) -> f64 {
    let [r, g, b] = pixel.0;
    f64::from(r) * RED_WEIGHT + f64::from(g) * GREEN_WEIGHT + f64::from(b) * BLUE_WEIGHT
}

/// Side length of a square cell for `resolution` columns (never 0)
pub fn cell_side(image: &RgbImage, resolution: u32) -> u32 {
    match resolution {
        0 => image.width().max(1),
        _ => (image.width() / resolution).max(1),
    }
}

/// Split an image into a grid of square sub-images
///
/// The grid has `height / cell_side` rows and exactly `resolution` columns,
/// taken row-major from the top-left. Remainder pixels on the right/bottom
/// are dropped. A cell that does not fit inside the image (only possible
/// when `resolution` exceeds the width) is `None`.
pub fn sub_images(image: &RgbImage, resolution: u32) -> Vec<Vec<Option<RgbImage>>> {
    let side = cell_side(image, resolution);
    let rows = image.height() / side;

    (0..rows)
        .map(|row| {
            (0..resolution)
                .map(|col| {
                    let x = col * side;
                    let y = row * side;
                    fits(image, x, y, side)
                        .then(|| imageops::crop_imm(image, x, y, side, side).to_image())
                })
                .collect()
        })
        .collect()
}

/// Normalized brightness of a sub-image in [0, 1]
///
/// Absent or empty cells are treated as black.
pub fn brightness(cell: Option<&RgbImage>) -> f64 {
    let Some(cell) = cell else {
        return 0.0;
    };
    let count = u64::from(cell.width()) * u64::from(cell.height());
    if count == 0 {
        return 0.0;
    }

    let sum: f64 = cell.pixels().map(luminance).sum();
    sum / (count as f64 * MAX_CHANNEL)
}

fn fits(image: &RgbImage, x: u32, y: u32, side: u32) -> bool {
    u64::from(x) + u64::from(side) <= u64::from(image.width())
        && u64::from(y) + u64::from(side) <= u64::from(image.height())
}

/// Row-major grid of cell brightness values
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessGrid {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl BrightnessGrid {
    pub fn new(rows: usize, columns: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * columns, "grid size mismatch");
        Self { rows, columns, values }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Brightness at `(row, col)`, `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.columns {
            self.values.get(row * self.columns + col).copied()
        } else {
            None
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Produces the brightness grid the renderer matches against
pub trait Partitioner {
    fn brightness_grid(&self, image: &RgbImage, resolution: u32) -> BrightnessGrid;
}

/// Averages square tiles straight out of the source image
#[derive(Debug, Clone, Copy, Default)]
pub struct TilePartitioner;

impl Partitioner for TilePartitioner {
    fn brightness_grid(&self, image: &RgbImage, resolution: u32) -> BrightnessGrid {
        let side = cell_side(image, resolution);
        let rows = (image.height() / side) as usize;
        let columns = resolution as usize;
        let num_tiles = rows * columns;

        // Parallelize tile averaging
        let values = (0..num_tiles)
            .into_par_iter()
            .map(|tile_idx| {
                let x = (tile_idx % columns) as u32 * side;
                let y = (tile_idx / columns) as u32 * side;
                if !fits(image, x, y, side) {
                    return 0.0;
                }

                let mut sum = 0.0;
                for local_y in 0..side {
                    for local_x in 0..side {
                        sum += luminance(image.get_pixel(x + local_x, y + local_y));
                    }
                }
                sum / (f64::from(side) * f64::from(side) * MAX_CHANNEL)
            })
            .collect();

        BrightnessGrid::new(rows, columns, values)
    }
}
