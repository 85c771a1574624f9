use image::{GrayImage, Luma};

use crate::range::{ScalarRange, Scale};
use crate::Field;

/// Maps every sample of `field` to a gray level between black (`low`) and
/// white (`high`).
///
/// `range` is expected to be prepared for `scale` already (see
/// [`ScalarRange::prepared`]). Non-finite samples are drawn black.
pub fn render(field: &Field, range: ScalarRange, scale: Scale) -> GrayImage {
    let (width, height) = field.dimensions();
    let mut img = GrayImage::new(width, height);

    for ((_, v), pix) in field.cells().zip(img.pixels_mut()) {
        let g = if v.is_finite() {
            range.normalize(v, scale) * 255.0
        } else {
            0.0
        };
        *pix = Luma([g.round() as u8]);
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(img: &GrayImage) -> Vec<u8> {
        img.pixels().map(|p| p.0[0]).collect()
    }

    #[test]
    fn test_render_linear() {
        let field = Field::parse("0 5 10\nNaN 10 0").unwrap();
        let (range, changed) = field.range().prepared(Scale::Linear);
        assert!(!changed);

        let img = render(&field, range, Scale::Linear);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(levels(&img), vec![0, 128, 255, 0, 255, 0]);
    }

    #[test]
    fn test_render_log() {
        let field = Field::parse("1 10 100").unwrap();
        let (range, _) = field.range().prepared(Scale::Log);

        let img = render(&field, range, Scale::Log);
        let levels = levels(&img);
        assert_eq!(levels[0], 0);
        assert!((127..=128).contains(&levels[1]), "{:?}", levels);
        assert_eq!(levels[2], 255);
    }

    #[test]
    fn test_render_constant_field() {
        let field = Field::parse("3 3\n3 3").unwrap();
        let (range, changed) = field.range().prepared(Scale::Linear);
        assert!(changed);

        let img = render(&field, range, Scale::Linear);
        assert_eq!(levels(&img), vec![0; 4]);
    }

    #[test]
    fn test_render_log_of_non_positive_field() {
        let field = Field::parse("-1 0 -3").unwrap();
        let (range, changed) = field.range().prepared(Scale::Log);
        assert!(changed);
        assert_eq!(range, ScalarRange::new(1.0e-4, 1.0));

        let img = render(&field, range, Scale::Log);
        assert_eq!(levels(&img), vec![0, 0, 0]);
    }
}
