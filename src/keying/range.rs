use super::types::{HsvFrame, KeyRange};

/// A pixel position inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Clamp raw pointer coordinates into `[0, width-1] x [0, height-1]`
    pub fn clamped(x: i32, y: i32, width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1) as i64;
        let max_y = height.saturating_sub(1) as i64;
        Self {
            x: (x as i64).clamp(0, max_x) as u32,
            y: (y as i64).clamp(0, max_y) as u32,
        }
    }
}

/// Rectangle spanned by two drag corners
///
/// The patch is half-open: it covers columns `min(x)..max(x)` and rows
/// `min(y)..max(y)`, so two equal coordinates give a zero-area region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRegion {
    pub first: Point,
    pub second: Point,
}

impl SelectionRegion {
    pub fn new(first: Point, second: Point) -> Self {
        Self { first, second }
    }

    /// Build a region from raw pointer coordinates, clamped to the frame
    pub fn clamped(first: (i32, i32), second: (i32, i32), width: u32, height: u32) -> Self {
        Self {
            first: Point::clamped(first.0, first.1, width, height),
            second: Point::clamped(second.0, second.1, width, height),
        }
    }

    /// `(x0, y0, x1, y1)` with `x0 <= x1`, `y0 <= y1`, upper bounds exclusive
    pub fn bounds(&self) -> (u32, u32, u32, u32) {
        (
            self.first.x.min(self.second.x),
            self.first.y.min(self.second.y),
            self.first.x.max(self.second.x),
            self.first.y.max(self.second.y),
        )
    }

    pub fn is_empty(&self) -> bool {
        let (x0, y0, x1, y1) = self.bounds();
        x0 == x1 || y0 == y1
    }

    pub fn area(&self) -> u64 {
        let (x0, y0, x1, y1) = self.bounds();
        (x1 - x0) as u64 * (y1 - y0) as u64
    }
}

/// Widen `range` so it covers every HSV pixel in `region`
///
/// Selections accumulate: the range only ever grows here. Empty regions and
/// regions outside the frame leave the range untouched. Returns the number of
/// pixels sampled.
pub fn estimate_range(hsv: &HsvFrame, region: &SelectionRegion, range: &mut KeyRange) -> u64 {
    let _span = tracing::debug_span!("estimate_range").entered();

    let (width, height) = hsv.dimensions();
    let (x0, y0, x1, y1) = region.bounds();
    let (x1, y1) = (x1.min(width), y1.min(height));
    if x0 >= x1 || y0 >= y1 {
        tracing::debug!("Ignoring empty selection {:?}", region);
        return 0;
    }

    for y in y0..y1 {
        for x in x0..x1 {
            range.include(hsv.get_pixel(x, y).0);
        }
    }

    let sampled = (x1 - x0) as u64 * (y1 - y0) as u64;
    tracing::info!(
        "Sampled {} pixels, key range now low={:?} high={:?}",
        sampled,
        range.low,
        range.high
    );
    sampled
}
