mod adjust;
mod color_space;
mod composite;
mod mask;
mod range;
mod spill;
pub mod types;

pub use adjust::{adjust_channel, RangeAdjuster, StepPolicy, ThresholdSlider, MAX_THRESHOLD};
pub use color_space::{hsv_to_rgb, rgb_to_hsv, to_hsv, to_rgb};
pub use composite::composite;
pub use mask::{gaussian_kernel, inclusion_mask, kernel_size, mask_to_rgb, soften_mask, MAX_SOFTEN};
pub use range::{estimate_range, Point, SelectionRegion};
pub use spill::{suppress_spill, suppress_spill_into, MAX_SPILL};
pub use types::{Channel, Frame, HsvFrame, KeyRange, Mask};

use crate::error::Result;

/// Everything the per-frame keying pass reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParams {
    pub range: KeyRange,
    /// Soften slider position, see [`kernel_size`]
    pub soften: u32,
    /// Saturation taken off spill pixels
    pub spill: i32,
}

/// Result of keying one frame
pub struct KeyedFrame {
    pub composite: Frame,
    pub mask: Mask,
}

/// Run the keying stages on one frame
///
/// Order: inclusion mask, spill suppression into `working`, back to display
/// space, soften the mask, blend over `background`.
pub fn key_frame(
    hsv: &HsvFrame,
    working: &mut HsvFrame,
    background: &Frame,
    params: &KeyParams,
) -> Result<KeyedFrame> {
    let _span = tracing::debug_span!("key_frame").entered();

    let hard = inclusion_mask(hsv, &params.range);
    suppress_spill_into(hsv, working, &params.range, params.spill);
    let foreground = to_rgb(working);
    let mask = soften_mask(&hard, kernel_size(params.soften));
    let composite = composite(&foreground, background, &mask)?;

    Ok(KeyedFrame { composite, mask })
}
