use super::types::{Frame, Mask};
use crate::error::{KeyerError, Result};
use image::Rgb;

/// Blend `background` over `foreground` using `mask` as the background weight
///
/// For every pixel `w = mask / 255` and
/// `out = w * background + (1 - w) * foreground`, rounded and saturated per
/// channel. All three inputs must share the same dimensions.
pub fn composite(foreground: &Frame, background: &Frame, mask: &Mask) -> Result<Frame> {
    let _span = tracing::debug_span!("composite").entered();

    let dims = foreground.dimensions();
    if background.dimensions() != dims {
        return Err(KeyerError::DimensionMismatch {
            what: "background",
            expected: background.dimensions(),
            actual: dims,
        });
    }
    if mask.dimensions() != dims {
        return Err(KeyerError::DimensionMismatch {
            what: "mask",
            expected: mask.dimensions(),
            actual: dims,
        });
    }

    let mut out = Frame::new(dims.0, dims.1);
    for (((fg, bg), m), dst) in foreground
        .pixels()
        .zip(background.pixels())
        .zip(mask.pixels())
        .zip(out.pixels_mut())
    {
        let weight = m[0] as f32 / 255.0;
        let mut pixel = [0u8; 3];
        for c in 0..3 {
            let blended = weight * bg[c] as f32 + (1.0 - weight) * fg[c] as f32;
            pixel[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
        *dst = Rgb(pixel);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient(width: u32, height: u32) -> Frame {
        Frame::from_fn(width, height, |x, y| Rgb([(x * 20) as u8, (y * 30) as u8, 77]))
    }

    #[test]
    fn test_zero_mask_keeps_foreground() {
        let fg = gradient(8, 5);
        let bg = Frame::from_pixel(8, 5, Rgb([1, 2, 3]));
        let mask = Mask::new(8, 5);
        assert_eq!(composite(&fg, &bg, &mask).unwrap(), fg);
    }

    #[test]
    fn test_full_mask_shows_background() {
        let fg = gradient(8, 5);
        let bg = Frame::from_fn(8, 5, |x, y| Rgb([200, (x + y) as u8, 9]));
        let mask = Mask::from_pixel(8, 5, Luma([255]));
        assert_eq!(composite(&fg, &bg, &mask).unwrap(), bg);
    }

    #[test]
    fn test_partial_weight_blends() {
        let fg = Frame::from_pixel(1, 1, Rgb([0, 100, 255]));
        let bg = Frame::from_pixel(1, 1, Rgb([255, 200, 0]));
        let mask = Mask::from_pixel(1, 1, Luma([51]));

        let out = composite(&fg, &bg, &mask).unwrap();
        // 51 / 255 = 0.2
        assert_eq!(out.get_pixel(0, 0).0, [51, 120, 204]);
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let fg = gradient(4, 4);
        let bg = gradient(5, 4);
        let mask = Mask::new(4, 4);
        assert!(matches!(
            composite(&fg, &bg, &mask),
            Err(KeyerError::DimensionMismatch { what: "background", .. })
        ));
    }
}
