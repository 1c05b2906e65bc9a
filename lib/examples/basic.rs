/// Basic example: Convert a simple test image to ASCII art
///
/// This draws a dark disc on a light background and prints it at a few
/// resolutions and rounding policies
use ascii_density::{RenderConfig, RoundingPolicy, Session};
use image::{Rgb, RgbImage};

fn main() -> Result<(), ascii_density::RenderError> {
    println!("ASCII Density - Basic Example");
    println!("=============================\n");

    // 100x60 test image, padded to 128x64 on load
    let width = 100;
    let height = 60;
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = 25.0;

    let img = RgbImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - center_x;
        let dy = y as f32 - center_y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < radius {
            // darker towards the middle
            let shade = (dist / radius * 200.0) as u8;
            Rgb([shade, shade, shade])
        } else {
            Rgb([230, 230, 230])
        }
    });

    println!("Created test image: {}x{}", width, height);

    let config = RenderConfig {
        resolution: 32,
        rounding: RoundingPolicy::Nearest,
        charset: " .:-=+*#%@".to_string(),
    };
    let mut session = Session::new(config)?;
    session.load(img)?;

    for policy in [RoundingPolicy::Nearest, RoundingPolicy::Up, RoundingPolicy::Down] {
        session.set_rounding(policy);
        println!("\nResolution {}, rounding {}:", session.resolution(), policy);
        println!("{}", session.render()?);
    }

    session.resolution_up()?;
    println!("\nResolution {}:", session.resolution());
    println!("{}", session.render()?);

    Ok(())
}
