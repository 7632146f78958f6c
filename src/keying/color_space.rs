//! RGB <-> 8-bit HSV conversion
//!
//! Hue uses the half-angle byte convention (`degrees / 2`, so `[0, 180)`),
//! saturation and value are scaled to `[0, 255]`. Both directions round to
//! nearest, so a round trip is exact up to one step of quantisation.

use super::types::{Frame, HsvFrame, HUE_MAX};
use image::Rgb;

/// Convert a display frame to HSV. An empty frame yields an empty frame.
pub fn to_hsv(frame: &Frame) -> HsvFrame {
    let _span = tracing::debug_span!("to_hsv").entered();

    let (width, height) = frame.dimensions();
    let mut hsv = HsvFrame::new(width, height);
    for (src, dst) in frame.pixels().zip(hsv.pixels_mut()) {
        *dst = Rgb(rgb_to_hsv(src.0));
    }
    hsv
}

/// Convert an HSV frame back to display space
pub fn to_rgb(hsv: &HsvFrame) -> Frame {
    let _span = tracing::debug_span!("to_rgb").entered();

    let (width, height) = hsv.dimensions();
    let mut frame = Frame::new(width, height);
    for (src, dst) in hsv.pixels().zip(frame.pixels_mut()) {
        *dst = Rgb(hsv_to_rgb(src.0));
    }
    frame
}

pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let degrees = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };

    // Rounding can land exactly on 180, which is the same hue as 0
    let mut h = (degrees / 2.0).round() as i32;
    if h >= HUE_MAX {
        h -= HUE_MAX;
    }

    [h as u8, s.round() as u8, max as u8]
}

pub fn hsv_to_rgb([h, s, v]: [u8; 3]) -> [u8; 3] {
    let s = s as f32 / 255.0;
    let v = v as f32 / 255.0;

    if s == 0.0 {
        let gray = to_byte(v);
        return [gray, gray, gray];
    }

    let sector_pos = (h as f32 * 2.0 / 60.0) % 6.0;
    let sector = sector_pos.floor();
    let f = sector_pos - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [to_byte(r), to_byte(g), to_byte(b)]
}

fn to_byte(unit: f32) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
