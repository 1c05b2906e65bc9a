use thiserror::Error;

/// Errors raised while configuring or running a render
#[derive(Error, Debug)]
pub enum RenderError {
    /// Matching needs a darkest and a brightest anchor
    #[error("character set is too small: {len} character(s), at least 2 required")]
    CharsetTooSmall { len: usize },

    #[error("resolution must be positive, got {0}")]
    InvalidResolution(u32),

    #[error("resolution {requested} is outside the allowed range {min}..={max}")]
    ResolutionOutOfBounds { requested: u32, min: u32, max: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown rounding policy {0:?}, expected one of: up, down, abs")]
    UnknownRounding(String),

    #[error("no image loaded")]
    NoImage,

    #[error("image has no pixels")]
    EmptyImage,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
