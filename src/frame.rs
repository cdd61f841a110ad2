use image::RgbImage;

use crate::error::FrameError;

/// Builds a frame from a tightly packed BGR buffer, as delivered by most
/// capture drivers.
pub fn frame_from_bgr(width: u32, height: u32, bgr: &[u8]) -> Result<RgbImage, FrameError> {
    let expected = width as usize * height as usize * 3;
    if bgr.len() != expected {
        return Err(FrameError::BufferSize {
            expected,
            actual: bgr.len(),
        });
    }

    let rgb: Vec<u8> = bgr
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();

    RgbImage::from_raw(width, height, rgb).ok_or(FrameError::BufferSize {
        expected,
        actual: bgr.len(),
    })
}

/// Packs a frame back into BGR byte order.
pub fn frame_to_bgr(frame: &RgbImage) -> Vec<u8> {
    frame
        .pixels()
        .flat_map(|p| {
            let [r, g, b] = p.0;
            [b, g, r]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_frame_from_bgr_swaps_channels() {
        let frame = frame_from_bgr(2, 1, &[255, 0, 0, 1, 2, 3]).unwrap();
        assert_eq!(*frame.get_pixel(0, 0), Rgb([0, 0, 255]));
        assert_eq!(*frame.get_pixel(1, 0), Rgb([3, 2, 1]));
        assert_eq!(frame_to_bgr(&frame), vec![255, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_frame_from_bgr_rejects_wrong_size() {
        assert_eq!(
            frame_from_bgr(2, 2, &[0; 11]),
            Err(FrameError::BufferSize {
                expected: 12,
                actual: 11
            })
        );
        assert_eq!(frame_from_bgr(0, 0, &[]).unwrap().dimensions(), (0, 0));
    }
}
