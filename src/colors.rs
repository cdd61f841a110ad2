use image::Rgb;
use palette::{FromColor, Hsl, Srgb};

/// Colors used to annotate an analyzed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationPalette {
    /// Slot outline when the space is occupied.
    pub alert: Rgb<u8>,
    /// Slot outline when the space is vacant.
    pub clear: Rgb<u8>,
    /// Outline of every occlusion contour.
    pub occlusion: Rgb<u8>,
}

impl Default for AnnotationPalette {
    fn default() -> Self {
        Self {
            alert: Rgb([255, 0, 0]),
            clear: Rgb([0, 255, 0]),
            occlusion: Rgb([0, 0, 255]),
        }
    }
}

/// Parses a `#rrggbb` or `#rgb` hex string (the `#` is optional).
pub fn parse_hex_color(value: &str) -> Result<Rgb<u8>, palette::rgb::FromHexError> {
    let srgb: Srgb<u8> = value.trim().parse()?;
    Ok(Rgb([srgb.red, srgb.green, srgb.blue]))
}

/// Generates `n` visually distinct, contrasting RGB colors.
pub(crate) fn generate_contrasting_colors(n: usize) -> Vec<Rgb<u8>> {
    let mut colors = Vec::with_capacity(n);

    for i in 0..n {
        let hue = (i as f32 * 360.0) / n as f32;

        let saturation = 0.9;
        let lightness = 0.5;

        let hsl_color = Hsl::new(hue, saturation, lightness);
        let srgb_linear = Srgb::from_color(hsl_color);
        let srgb_u8: Srgb<u8> = srgb_linear.into_format();

        colors.push(Rgb([srgb_u8.red, srgb_u8.green, srgb_u8.blue]));
    }

    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_contrasting_colors_works() {
        assert!(generate_contrasting_colors(0).is_empty());
        assert_eq!(generate_contrasting_colors(1), vec![Rgb([242, 13, 13])]);
        assert_eq!(
            generate_contrasting_colors(3),
            vec![Rgb([242, 13, 13]), Rgb([13, 242, 13]), Rgb([13, 13, 242])]
        );
    }

    #[test]
    fn parse_hex_color_accepts_long_and_short_forms() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), Rgb([255, 128, 0]));
        assert_eq!(parse_hex_color("00ff00").unwrap(), Rgb([0, 255, 0]));
        assert_eq!(parse_hex_color(" #fff ").unwrap(), Rgb([255, 255, 255]));
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("not a color").is_err());
    }

    #[test]
    fn default_palette_is_red_green_blue() {
        let palette = AnnotationPalette::default();
        assert_eq!(palette.alert, Rgb([255, 0, 0]));
        assert_eq!(palette.clear, Rgb([0, 255, 0]));
        assert_eq!(palette.occlusion, Rgb([0, 0, 255]));
    }
}
