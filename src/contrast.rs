use image::{GrayImage, Luma, RgbImage};

/// Foreground value written into binary masks.
pub const MASK_ON: u8 = 255;

/// Converts a color frame to grayscale using the BT.601 luma weights
/// (`0.299 R + 0.587 G + 0.114 B`), which is what camera pipelines apply to
/// BGR captures.
///
/// `image`'s own `to_luma8` uses the Rec. 709 weights instead, which shifts
/// gray values by several levels on saturated colors and therefore moves
/// pixels across a fixed threshold. The weights here are the 14-bit
/// fixed-point form with rounding, so results are exact integers.
pub fn to_luma_bt601(frame: &RgbImage) -> GrayImage {
    const R_WEIGHT: u32 = 4899;
    const G_WEIGHT: u32 = 9617;
    const B_WEIGHT: u32 = 1868;
    const SHIFT: u32 = 14;

    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        let weighted = u32::from(r) * R_WEIGHT + u32::from(g) * G_WEIGHT + u32::from(b) * B_WEIGHT;
        Luma([((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8])
    })
}

/// Thresholds a grayscale image against the inclusive range `[min, max]`.
///
/// Pixels whose value lies inside the range become [`MASK_ON`], all others
/// become `0`. An empty range (`min > max`) yields an all-zero mask.
pub fn threshold_range(gray: &GrayImage, min: u8, max: u8) -> GrayImage {
    let mut mask = gray.clone();
    for pixel in mask.pixels_mut() {
        pixel.0[0] = if (min..=max).contains(&pixel.0[0]) {
            MASK_ON
        } else {
            0
        };
    }
    mask
}
