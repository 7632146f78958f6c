//! Threshold sliders that widen or narrow the key range per channel.
//!
//! Moving a slider up widens both bounds of its channel, clamped to the
//! channel domain. Moving it down only raises `low` and does not re-clamp,
//! which can leave `low` above the channel ceiling; the inclusion test just
//! stops matching on that channel in that case.

use super::types::{Channel, KeyRange};
use serde::Deserialize;

/// Largest threshold slider position
pub const MAX_THRESHOLD: i32 = 40;

/// How far a slider move shifts the bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPolicy {
    /// Shift by the slider's new position
    #[default]
    Absolute,
    /// Shift by the distance the slider travelled
    Incremental,
}

impl std::str::FromStr for StepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "absolute" => Ok(Self::Absolute),
            "incremental" | "delta" => Ok(Self::Incremental),
            _ => Err(format!("Unknown step policy: {}", s)),
        }
    }
}

/// A slider position plus the last position that was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdSlider {
    pub value: i32,
    pub previous: i32,
}

impl ThresholdSlider {
    pub fn new(value: i32) -> Self {
        Self { value, previous: 0 }
    }
}

impl Default for ThresholdSlider {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Apply one slider move to a single channel of `range`
pub fn adjust_channel(
    range: &mut KeyRange,
    channel: Channel,
    current: i32,
    previous: i32,
    policy: StepPolicy,
) {
    let c = channel.index();

    if current > previous {
        let amount = match policy {
            StepPolicy::Absolute => current,
            StepPolicy::Incremental => current - previous,
        };
        range.low[c] = (range.low[c] - amount).max(channel.floor());
        range.high[c] = (range.high[c] + amount).min(channel.ceiling());
    } else if current < previous {
        let amount = match policy {
            StepPolicy::Absolute => current,
            StepPolicy::Incremental => previous - current,
        };
        range.low[c] += amount;
    }
}

/// The hue / saturation / value threshold sliders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAdjuster {
    sliders: [ThresholdSlider; 3],
    policy: StepPolicy,
}

impl RangeAdjuster {
    pub fn new(initial: [i32; 3], policy: StepPolicy) -> Self {
        Self {
            sliders: initial.map(ThresholdSlider::new),
            policy,
        }
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }

    pub fn slider(&self, channel: Channel) -> ThresholdSlider {
        self.sliders[channel.index()]
    }

    /// Move the slider for `channel` to `value` and update `range`
    pub fn set(&mut self, channel: Channel, value: i32, range: &mut KeyRange) {
        let slider = &mut self.sliders[channel.index()];
        slider.value = value;
        adjust_channel(range, channel, slider.value, slider.previous, self.policy);
        slider.previous = slider.value;

        tracing::debug!(
            "{:?} threshold {} -> low={} high={}",
            channel,
            value,
            range.low(channel),
            range.high(channel)
        );
    }
}

impl Default for RangeAdjuster {
    fn default() -> Self {
        Self::new([1, 1, 1], StepPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green_range() -> KeyRange {
        KeyRange::new([60, 200, 200], [60, 220, 230])
    }

    #[test]
    fn test_incremental_widen_by_step() {
        let mut range = green_range();
        adjust_channel(&mut range, Channel::Hue, 5, 1, StepPolicy::Incremental);
        assert_eq!(range.low[0], 56, "low should drop by the 4 step");
        assert_eq!(range.high[0], 64, "high should rise by the 4 step");
    }

    #[test]
    fn test_absolute_widen_by_position() {
        let mut range = green_range();
        adjust_channel(&mut range, Channel::Hue, 5, 1, StepPolicy::Absolute);
        assert_eq!(range.low[0], 55);
        assert_eq!(range.high[0], 65);
    }

    #[test]
    fn test_widen_clamps_to_channel_domain() {
        let mut range = KeyRange::new([2, 3, 250], [178, 252, 254]);
        adjust_channel(&mut range, Channel::Hue, 10, 0, StepPolicy::Absolute);
        adjust_channel(&mut range, Channel::Saturation, 10, 0, StepPolicy::Absolute);
        adjust_channel(&mut range, Channel::Value, 10, 0, StepPolicy::Absolute);

        assert_eq!((range.low[0], range.high[0]), (0, 180));
        assert_eq!((range.low[1], range.high[1]), (0, 255));
        assert_eq!((range.low[2], range.high[2]), (240, 255));
    }

    #[test]
    fn test_hue_high_can_reach_180() {
        let mut range = KeyRange::new([100, 0, 0], [176, 0, 0]);
        adjust_channel(&mut range, Channel::Hue, 4, 0, StepPolicy::Absolute);
        assert_eq!(range.high[0], 180);
    }

    #[test]
    fn test_widen_on_degenerate_range_clamps() {
        let mut range = KeyRange::empty();
        adjust_channel(&mut range, Channel::Hue, 5, 1, StepPolicy::Incremental);
        assert_eq!(range.low[0], 176);
        assert_eq!(range.high[0], 4);
        assert!(range.is_empty());
    }

    #[test]
    fn test_contract_only_moves_low_without_clamp() {
        let mut range = KeyRange::new([170, 250, 0], [180, 255, 255]);
        adjust_channel(&mut range, Channel::Hue, 20, 30, StepPolicy::Absolute);
        assert_eq!(range.low[0], 190, "low is not re-clamped on contraction");
        assert_eq!(range.high[0], 180, "high is untouched on contraction");

        adjust_channel(&mut range, Channel::Saturation, 20, 30, StepPolicy::Incremental);
        assert_eq!(range.low[1], 260);
        assert_eq!(range.high[1], 255);
    }

    #[test]
    fn test_equal_positions_are_noop() {
        let mut range = green_range();
        adjust_channel(&mut range, Channel::Value, 7, 7, StepPolicy::Absolute);
        assert_eq!(range, green_range());
    }

    #[test]
    fn test_increasing_never_shrinks() {
        for policy in [StepPolicy::Absolute, StepPolicy::Incremental] {
            let mut adjuster = RangeAdjuster::new([0, 0, 0], policy);
            let mut range = green_range();
            let mut prev = range;
            for value in 1..=MAX_THRESHOLD {
                adjuster.set(Channel::Saturation, value, &mut range);
                assert!(range.low[1] <= prev.low[1], "{:?}: low grew at {}", policy, value);
                assert!(range.high[1] >= prev.high[1], "{:?}: high shrank at {}", policy, value);
                prev = range;
            }
        }
    }

    #[test]
    fn test_previous_tracks_every_call() {
        let mut adjuster = RangeAdjuster::default();
        let mut range = green_range();
        assert_eq!(adjuster.slider(Channel::Hue), ThresholdSlider { value: 1, previous: 0 });

        adjuster.set(Channel::Hue, 6, &mut range);
        assert_eq!(adjuster.slider(Channel::Hue).previous, 6);

        adjuster.set(Channel::Hue, 6, &mut range);
        assert_eq!(adjuster.slider(Channel::Hue).previous, 6);

        adjuster.set(Channel::Hue, 2, &mut range);
        assert_eq!(adjuster.slider(Channel::Hue), ThresholdSlider { value: 2, previous: 2 });
    }

    #[test]
    fn test_first_move_from_default_uses_previous_zero() {
        // Sliders start at 1 but nothing has been applied yet
        let mut adjuster = RangeAdjuster::default();
        let mut range = green_range();
        adjuster.set(Channel::Hue, 1, &mut range);
        assert_eq!((range.low[0], range.high[0]), (59, 61));
    }

    #[test]
    fn test_step_policy_parse() {
        assert_eq!("absolute".parse::<StepPolicy>(), Ok(StepPolicy::Absolute));
        assert_eq!("Incremental".parse::<StepPolicy>(), Ok(StepPolicy::Incremental));
        assert!("sideways".parse::<StepPolicy>().is_err());
    }
}
