mod image_sequence;
mod v4l_capture;

pub use image_sequence::ImageSequenceCapture;
pub use v4l_capture::WebcamCapture;

use crate::error::Result;
use image::RgbImage;
use serde::Serialize;

/// Properties of a frame stream, used when exporting it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f32,
}

/// Trait for frame sources
pub trait CaptureSource {
    /// Capture the next frame, or `None` once the stream has ended
    fn capture_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);

    /// Frames per second the source was recorded or is delivered at
    fn frame_rate(&self) -> f32;

    /// Live sources deliver a new frame every tick instead of on request
    fn is_live(&self) -> bool {
        false
    }

    fn stream_info(&self) -> StreamInfo {
        let (width, height) = self.resolution();
        StreamInfo {
            width,
            height,
            frame_rate: self.frame_rate(),
        }
    }
}

/// Resize `frame` to `(width, height)` if it differs
pub(crate) fn fit_frame(frame: RgbImage, width: u32, height: u32) -> RgbImage {
    if frame.dimensions() == (width, height) {
        frame
    } else {
        tracing::debug!(
            "Resizing frame from {:?} to {}x{}",
            frame.dimensions(),
            width,
            height
        );
        image::imageops::resize(&frame, width, height, image::imageops::FilterType::Triangle)
    }
}
