use image::{GrayImage, RgbImage};
use std::ops::{Deref, DerefMut};

/// Display-space frame, 8-bit RGB
pub type Frame = RgbImage;

/// Single-channel key mask
///
/// 0 keeps the foreground, 255 shows the background, anything in between
/// is a blend weight once the mask has been softened.
pub type Mask = GrayImage;

/// Largest hue value in the 8-bit half-angle convention (degrees / 2)
pub const HUE_MAX: i32 = 180;

/// Largest saturation / value
pub const CHANNEL_MAX: i32 = 255;

/// 8-bit HSV frame
///
/// Channel 0 holds hue in `[0, 180)` (degrees halved so it fits a byte),
/// channels 1 and 2 hold saturation and value in `[0, 255]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HsvFrame(RgbImage);

impl HsvFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self(RgbImage::new(width, height))
    }

    /// Wrap a buffer that already holds HSV triples
    pub fn from_image(image: RgbImage) -> Self {
        Self(image)
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: FnMut(u32, u32) -> image::Rgb<u8>,
    {
        Self(RgbImage::from_fn(width, height, f))
    }

    pub fn is_empty(&self) -> bool {
        self.0.width() == 0 || self.0.height() == 0
    }

    pub fn into_inner(self) -> RgbImage {
        self.0
    }
}

impl Deref for HsvFrame {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for HsvFrame {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// One of the three HSV channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Hue,
    Saturation,
    Value,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Hue, Channel::Saturation, Channel::Value];

    pub fn index(self) -> usize {
        match self {
            Channel::Hue => 0,
            Channel::Saturation => 1,
            Channel::Value => 2,
        }
    }

    pub fn floor(self) -> i32 {
        0
    }

    pub fn ceiling(self) -> i32 {
        match self {
            Channel::Hue => HUE_MAX,
            Channel::Saturation | Channel::Value => CHANNEL_MAX,
        }
    }
}

/// Low/high HSV bounds of the colour being keyed out
///
/// Bounds are kept as `i32` because the contraction path of the threshold
/// sliders adds to `low` without re-clamping, so a bound can leave the
/// channel's native domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRange {
    pub low: [i32; 3],
    pub high: [i32; 3],
}

impl KeyRange {
    /// The degenerate range that selects nothing: `low` at the channel
    /// ceilings and `high` at the floors.
    pub fn empty() -> Self {
        Self {
            low: [HUE_MAX, CHANNEL_MAX, CHANNEL_MAX],
            high: [0, 0, 0],
        }
    }

    pub fn new(low: [i32; 3], high: [i32; 3]) -> Self {
        Self { low, high }
    }

    /// True while any channel has `low > high`, i.e. nothing can match
    pub fn is_empty(&self) -> bool {
        self.low.iter().zip(self.high.iter()).any(|(lo, hi)| lo > hi)
    }

    /// Elementwise inclusive membership test
    pub fn contains(&self, pixel: [u8; 3]) -> bool {
        (0..3).all(|c| {
            let v = pixel[c] as i32;
            self.low[c] <= v && v <= self.high[c]
        })
    }

    /// Grow the range so it contains `pixel`
    pub fn include(&mut self, pixel: [u8; 3]) {
        for c in 0..3 {
            let v = pixel[c] as i32;
            self.low[c] = self.low[c].min(v);
            self.high[c] = self.high[c].max(v);
        }
    }

    pub fn low(&self, channel: Channel) -> i32 {
        self.low[channel.index()]
    }

    pub fn high(&self, channel: Channel) -> i32 {
        self.high[channel.index()]
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_range_matches_nothing() {
        let range = KeyRange::empty();
        assert!(range.is_empty());
        for pixel in [[0, 0, 0], [60, 255, 255], [179, 128, 1], [180, 255, 255]] {
            assert!(!range.contains(pixel), "empty range matched {:?}", pixel);
        }
    }

    #[test]
    fn test_one_inverted_channel_makes_range_empty() {
        let range = KeyRange::new([50, 0, 0], [70, 255, 255]);
        assert!(!range.is_empty());

        let inverted = KeyRange::new([50, 200, 0], [70, 100, 255]);
        assert!(inverted.is_empty());
        assert!(!inverted.contains([60, 150, 128]));
    }

    #[test]
    fn test_include_builds_bounding_box() {
        let mut range = KeyRange::empty();
        range.include([60, 200, 100]);
        range.include([70, 180, 120]);

        assert_eq!(range.low, [60, 180, 100]);
        assert_eq!(range.high, [70, 200, 120]);
        assert!(!range.is_empty());
        assert!(range.contains([65, 190, 110]));
        assert!(!range.contains([71, 190, 110]));
    }

    #[test]
    fn test_channel_bounds() {
        assert_eq!(Channel::Hue.ceiling(), 180);
        assert_eq!(Channel::Saturation.ceiling(), 255);
        assert_eq!(Channel::Value.floor(), 0);
    }
}
