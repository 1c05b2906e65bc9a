use image::{Rgb, RgbImage, imageops};

/// Background used for the padded border
pub const PAD_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Smallest power of two that is >= `length`, starting from 2
///
/// A dimension of 0 or 1 still pads to 2.
pub fn padded_length(length: u32) -> u32 {
    let mut padded = 2;
    while padded < length {
        padded *= 2;
    }
    padded
}

/// Pad an image so both dimensions are powers of two
///
/// The original pixels are centered on a white canvas. When the padding on
/// an axis is odd the extra column/row ends up on the right/bottom.
///
/// # Arguments
/// * `input` - The image to pad (left untouched)
///
/// # Returns
/// A new image of size `(padded_length(width), padded_length(height))`
pub fn pad(input: &RgbImage) -> RgbImage {
    let (width, height) = input.dimensions();
    let new_width = padded_length(width);
    let new_height = padded_length(height);

    if new_width == width && new_height == height {
        return input.clone();
    }

    let offset_x = (new_width - width) / 2;
    let offset_y = (new_height - height) / 2;

    let mut output = RgbImage::from_pixel(new_width, new_height, PAD_COLOR);
    imageops::replace(&mut output, input, i64::from(offset_x), i64::from(offset_y));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_padded_length() {
        assert_eq!(padded_length(0), 2);
        assert_eq!(padded_length(1), 2);
        assert_eq!(padded_length(2), 2);
        assert_eq!(padded_length(3), 4);
        assert_eq!(padded_length(5), 8);
        assert_eq!(padded_length(64), 64);
        assert_eq!(padded_length(65), 128);
    }

    #[test]
    fn test_pad_3x5_centered_on_white() {
        let black = Rgb([0, 0, 0]);
        let img = RgbImage::from_pixel(3, 5, black);
        let padded = pad(&img);

        assert_eq!(padded.dimensions(), (4, 8));

        // offsets: x = (4 - 3) / 2 = 0, y = (8 - 5) / 2 = 1
        for y in 0..8 {
            for x in 0..4 {
                let inside = x < 3 && (1..6).contains(&y);
                let expected = if inside { black } else { PAD_COLOR };
                assert_eq!(*padded.get_pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_pad_preserves_pixel_layout() {
        let mut img = RgbImage::from_pixel(2, 3, Rgb([0, 0, 0]));
        img.put_pixel(1, 2, Rgb([10, 20, 30]));
        let padded = pad(&img);

        assert_eq!(padded.dimensions(), (2, 4));
        // y offset = (4 - 3) / 2 = 0
        assert_eq!(*padded.get_pixel(1, 2), Rgb([10, 20, 30]));
        assert_eq!(*padded.get_pixel(0, 3), PAD_COLOR);
    }

    #[test]
    fn test_pad_power_of_two_is_noop() {
        let img = RgbImage::from_pixel(16, 8, Rgb([12, 34, 56]));
        let padded = pad(&img);
        assert_eq!(padded, img);
    }

    #[test]
    fn test_pad_does_not_mutate_input() {
        let img = RgbImage::from_pixel(3, 3, Rgb([1, 2, 3]));
        let copy = img.clone();
        let _ = pad(&img);
        assert_eq!(img, copy);
    }

    proptest! {
        #[test]
        fn prop_pad_is_idempotent(w in 1u32..70, h in 1u32..70) {
            let img = RgbImage::from_pixel(w, h, Rgb([0, 0, 0]));
            let once = pad(&img);
            let twice = pad(&once);
            prop_assert_eq!(once.dimensions(), twice.dimensions());
            prop_assert!(once.width().is_power_of_two());
            prop_assert!(once.height().is_power_of_two());
            prop_assert!(once.width() >= w && once.height() >= h);
        }
    }
}
