use super::types::{HsvFrame, KeyRange, Mask};
use image::{Luma, Rgb, RgbImage};

/// Largest soften slider position
pub const MAX_SOFTEN: u32 = 20;

/// Kernel size for a soften level: always odd, level 0 gives the identity
pub fn kernel_size(level: u32) -> u32 {
    level * 2 + 1
}

/// Mark every pixel inside `range` with 255 and everything else with 0
pub fn inclusion_mask(hsv: &HsvFrame, range: &KeyRange) -> Mask {
    let _span = tracing::debug_span!("inclusion_mask").entered();

    let (width, height) = hsv.dimensions();
    let mut mask = Mask::new(width, height);
    for (src, dst) in hsv.pixels().zip(mask.pixels_mut()) {
        *dst = Luma([if range.contains(src.0) { 255 } else { 0 }]);
    }
    mask
}

/// Gaussian-blur a binary mask into blend weights
///
/// The blur is separable with an odd `kernel_size`; even sizes are bumped to
/// the next odd one. Borders reflect without repeating the edge pixel.
pub fn soften_mask(mask: &Mask, kernel_size: u32) -> Mask {
    let _span = tracing::debug_span!("soften_mask", kernel_size).entered();

    let ksize = kernel_size | 1;
    let (width, height) = mask.dimensions();
    if ksize == 1 || width == 0 || height == 0 {
        return mask.clone();
    }

    let kernel = gaussian_kernel(ksize as usize);
    let radius = (ksize / 2) as i64;
    let (w, h) = (width as usize, height as usize);
    let src = mask.as_raw();

    let mut horizontal = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect101(x as i64 + k as i64 - radius, w as i64);
                acc += weight * row[sx] as f32;
            }
            horizontal[y * w + x] = acc;
        }
    }

    let mut out = Mask::new(width, height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = reflect101(y as i64 + k as i64 - radius, h as i64);
                acc += weight * horizontal[sy * w + x];
            }
            out.put_pixel(x as u32, y as u32, Luma([acc.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Normalised 1D Gaussian weights for an odd kernel size
///
/// Sizes up to 7 use the fixed binomial-style tables, larger sizes derive
/// sigma from the size as `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    match ksize {
        1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![
            0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
        ],
        _ => {
            let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
            let center = (ksize / 2) as f64;
            let raw: Vec<f64> = (0..ksize)
                .map(|i| {
                    let d = i as f64 - center;
                    (-(d * d) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let sum: f64 = raw.iter().sum();
            raw.iter().map(|v| (v / sum) as f32).collect()
        }
    }
}

/// Map an out-of-range index back inside `[0, len)` by mirroring around the
/// edge pixel (`dcb|abcd|cba`)
fn reflect101(i: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = i.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as usize
}

/// Render a mask as a grayscale RGB frame for display
pub fn mask_to_rgb(mask: &Mask) -> RgbImage {
    let (width, height) = mask.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let value = mask.get_pixel(x, y)[0];
        Rgb([value, value, value])
    })
}
