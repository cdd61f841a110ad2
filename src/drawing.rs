use image::{GrayImage, Rgb, RgbImage};
use imageproc::{contours::Contour, drawing::draw_line_segment_mut};

use crate::{colors::generate_contrasting_colors, contours::sort_by_areas_owned};

/// Draws the closed outline of a contour onto an RGB canvas.
///
/// `thickness` is the outline width in pixels. Widths above one are drawn by
/// repeating each segment over a square of offsets around the boundary, so a
/// width of 3 covers one pixel on either side of it. A width of 0 is treated
/// as 1. Points outside the canvas are clipped.
pub fn draw_contour_mut(
    canvas: &mut RgbImage,
    contour: &Contour<i32>,
    color: Rgb<u8>,
    thickness: u32,
) {
    let points = &contour.points;
    if points.is_empty() {
        return;
    }

    let reach = (thickness.max(1) as i32 - 1) / 2;
    let extra = (thickness.max(1) as i32 - 1) % 2;

    for dy in -reach..=reach + extra {
        for dx in -reach..=reach + extra {
            if points.len() == 1 {
                let p = points[0];
                put_pixel_clipped(canvas, p.x + dx, p.y + dy, color);
                continue;
            }
            for (p1, p2) in points.iter().zip(points.iter().cycle().skip(1)) {
                draw_line_segment_mut(
                    canvas,
                    ((p1.x + dx) as f32, (p1.y + dy) as f32),
                    ((p2.x + dx) as f32, (p2.y + dy) as f32),
                    color,
                );
            }
        }
    }
}

fn put_pixel_clipped(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
        canvas.put_pixel(x as u32, y as u32, color);
    }
}

/// Renders a binary mask with every contour outlined in a distinct color.
///
/// Larger contours are drawn first so nested, smaller ones stay visible on
/// top. Useful for checking which regions a threshold range isolates.
pub fn draw_contours_debug(mask: &GrayImage, contours: &[Contour<i32>]) -> RgbImage {
    let mut canvas = RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y).0[0] / 3;
        Rgb([v, v, v])
    });

    let colors = generate_contrasting_colors(contours.len());
    let sorted = sort_by_areas_owned(contours.to_vec());
    for ((contour, _), color) in sorted.iter().zip(colors) {
        draw_contour_mut(&mut canvas, contour, color, 1);
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::{contours::BorderType, point::Point};

    fn square(x0: i32, y0: i32, x1: i32, y1: i32) -> Contour<i32> {
        Contour {
            points: vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
            border_type: BorderType::Outer,
            parent: None,
        }
    }

    #[test]
    fn test_draw_contour_thin_outline() {
        let mut canvas = RgbImage::new(10, 10);
        let red = Rgb([255, 0, 0]);
        draw_contour_mut(&mut canvas, &square(2, 2, 6, 6), red, 1);

        assert_eq!(*canvas.get_pixel(2, 2), red);
        assert_eq!(*canvas.get_pixel(6, 4), red);
        assert_eq!(*canvas.get_pixel(4, 6), red);
        // Interior and outside untouched.
        assert_eq!(*canvas.get_pixel(4, 4), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(1, 4), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_contour_thick_outline() {
        let mut canvas = RgbImage::new(12, 12);
        let green = Rgb([0, 255, 0]);
        draw_contour_mut(&mut canvas, &square(3, 3, 8, 8), green, 3);

        // One pixel on each side of the left edge.
        assert_eq!(*canvas.get_pixel(2, 5), green);
        assert_eq!(*canvas.get_pixel(3, 5), green);
        assert_eq!(*canvas.get_pixel(4, 5), green);
        assert_eq!(*canvas.get_pixel(5, 5), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(1, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_contour_clips_and_handles_degenerate() {
        let mut canvas = RgbImage::new(4, 4);
        let blue = Rgb([0, 0, 255]);
        // Partially outside the canvas must not panic.
        draw_contour_mut(&mut canvas, &square(-2, -2, 2, 2), blue, 3);
        assert_eq!(*canvas.get_pixel(2, 0), blue);

        let single = Contour {
            points: vec![Point::new(3, 3)],
            border_type: BorderType::Outer,
            parent: None,
        };
        draw_contour_mut(&mut canvas, &single, Rgb([9, 9, 9]), 1);
        assert_eq!(*canvas.get_pixel(3, 3), Rgb([9, 9, 9]));

        let empty = Contour {
            points: vec![],
            border_type: BorderType::Outer,
            parent: None,
        };
        draw_contour_mut(&mut canvas, &empty, Rgb([1, 1, 1]), 1);
    }

    #[test]
    fn test_draw_contours_debug_colors_each_contour() {
        let mask = GrayImage::from_pixel(10, 10, image::Luma([255]));
        let contours = vec![square(1, 1, 8, 8), square(3, 3, 5, 5)];
        let canvas = draw_contours_debug(&mask, &contours);

        assert_eq!(canvas.dimensions(), (10, 10));
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([85, 85, 85]));
        let outer = *canvas.get_pixel(1, 4);
        let inner = *canvas.get_pixel(3, 4);
        assert_ne!(outer, inner);
        assert_ne!(outer, Rgb([85, 85, 85]));
    }
}
