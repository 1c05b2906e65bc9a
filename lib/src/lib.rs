//! ASCII Density - image to ASCII art by glyph brightness
//!
//! This library pads an image to power-of-two dimensions, averages it into
//! square cells and replaces every cell with the character whose glyph
//! density best matches the cell's brightness.
//!
//! # Example
//! ```no_run
//! use ascii_density::{RenderConfig, Session};
//!
//! let input = image::open("photo.jpg").unwrap().to_rgb8();
//! let mut session = Session::new(RenderConfig::default()).unwrap();
//! session.load(input).unwrap();
//! session.add_range('a'..='z');
//! println!("{}", session.render().unwrap());
//! ```

pub mod config;
pub mod error;
pub mod glyph;
pub mod matcher;
pub mod padding;
pub mod partition;
pub mod pipeline;
pub mod session;

// Re-export main types for convenience
pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use glyph::{BitmapFont, GlyphBitmap, GlyphCache, GlyphRasterizer};
pub use matcher::{CharMatcher, RoundingPolicy};
pub use padding::pad;
pub use partition::{Partitioner, TilePartitioner, brightness, sub_images};
pub use pipeline::{CharGrid, RenderMemo, Renderer};
pub use session::Session;
