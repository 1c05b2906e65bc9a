use ascii_density::{RenderConfig, RenderError, RoundingPolicy, Session};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Render an image as ASCII art
#[derive(Debug, Parser)]
#[command(name = "ascii-density", version, about)]
struct Cli {
    /// Image file to render
    image: PathBuf,

    /// Number of character columns
    #[arg(short, long, default_value_t = 2)]
    resolution: u32,

    /// How to resolve brightness between two characters
    #[arg(long, value_enum, default_value_t = Round::Abs)]
    round: Round,

    /// Characters to draw with
    #[arg(short, long, default_value = "0123456789")]
    chars: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Round {
    Up,
    Down,
    Abs,
}

impl From<Round> for RoundingPolicy {
    fn from(r: Round) -> Self {
        match r {
            Round::Up => RoundingPolicy::Up,
            Round::Down => RoundingPolicy::Down,
            Round::Abs => RoundingPolicy::Nearest,
        }
    }
}

fn main() -> Result<(), RenderError> {
    // Configure logging
    env_logger::init();

    let cli = Cli::parse();
    let config = RenderConfig {
        resolution: cli.resolution,
        rounding: cli.round.into(),
        charset: cli.chars,
    };

    let mut session = Session::new(config)?;
    let image = image::open(&cli.image)?.to_rgb8();
    log::info!("opened {}", cli.image.display());
    session.load(image)?;

    println!("{}", session.render()?);
    Ok(())
}
