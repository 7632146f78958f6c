//! Spill suppression: desaturate foreground pixels tinted by the key colour.
//!
//! Only hue gates the effect. A pixel is treated as spill when its hue lies
//! strictly between the key range's hue bounds; saturation and value are not
//! checked. The saturation reduction is skipped (not clamped) when it would
//! reach zero or below.

use super::types::{HsvFrame, KeyRange};

/// Largest spill slider position
pub const MAX_SPILL: i32 = 100;

/// Write the spill-suppressed saturation of `source` into `working`
///
/// Pixels that are not spill, or whose saturation would drop to zero or
/// below, keep whatever `working` already holds, so `working` should start
/// as a copy of `source`.
pub fn suppress_spill_into(source: &HsvFrame, working: &mut HsvFrame, range: &KeyRange, strength: i32) {
    let _span = tracing::debug_span!("suppress_spill", strength).entered();

    debug_assert_eq!(source.dimensions(), working.dimensions());

    let (hue_low, hue_high) = (range.low[0], range.high[0]);
    for (src, dst) in source.pixels().zip(working.pixels_mut()) {
        let hue = src[0] as i32;
        if hue > hue_low && hue < hue_high {
            let reduced = src[1] as i32 - strength;
            if reduced > 0 {
                dst[1] = reduced.min(255) as u8;
            }
        }
    }
}

/// Spill-suppressed copy of `source`
pub fn suppress_spill(source: &HsvFrame, range: &KeyRange, strength: i32) -> HsvFrame {
    let mut working = source.clone();
    suppress_spill_into(source, &mut working, range, strength);
    working
}
