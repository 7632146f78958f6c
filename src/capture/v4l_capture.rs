use super::{fit_frame, CaptureSource};
use crate::error::{KeyerError, Result};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

/// Live webcam source; never reaches end of stream
pub struct WebcamCapture {
    camera: Camera,
    width: u32,
    height: u32,
    frame_rate: f32,
}

impl WebcamCapture {
    pub fn new(device_index: u32) -> Result<Self> {
        tracing::info!("Initializing webcam {}", device_index);

        let index = CameraIndex::Index(device_index);
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

        let mut camera = Camera::new(index, requested).map_err(|e| {
            KeyerError::UnopenableSource(format!("camera {}", device_index), e.to_string())
        })?;

        camera.open_stream().map_err(|e| {
            KeyerError::UnopenableSource(format!("camera {}", device_index), e.to_string())
        })?;

        let resolution = camera.resolution();
        let frame_rate = camera.frame_rate() as f32;

        tracing::info!(
            "Webcam streaming at {}x{} @ {} fps",
            resolution.width(),
            resolution.height(),
            frame_rate
        );

        Ok(Self {
            camera,
            width: resolution.width(),
            height: resolution.height(),
            frame_rate,
        })
    }
}

impl CaptureSource for WebcamCapture {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        let frame = self.camera.frame()?;
        let decoded = frame.decode_image::<RgbFormat>()?;

        // Rebuild through the raw buffer so the frame type is ours
        let (width, height) = (decoded.width(), decoded.height());
        let image = RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| KeyerError::Other("Camera returned a truncated frame".into()))?;

        Ok(Some(fit_frame(image, self.width, self.height)))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    fn is_live(&self) -> bool {
        true
    }
}
