use super::{fit_frame, CaptureSource};
use crate::error::{KeyerError, Result};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Frames read in file-name order from a directory of still images
///
/// Every frame is scaled to the resolution of the first one. Files that fail
/// to decode are skipped with a warning.
pub struct ImageSequenceCapture {
    paths: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
    frame_rate: f32,
}

impl ImageSequenceCapture {
    pub fn open<P: AsRef<Path>>(dir: P, frame_rate: f32) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Opening frame directory {}", dir.display());

        let entries = fs::read_dir(dir).map_err(|e| {
            KeyerError::UnopenableSource(dir.display().to_string(), e.to_string())
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_frame_file(path))
            .collect();
        paths.sort();

        let first = paths
            .iter()
            .find_map(|path| image::open(path).ok())
            .ok_or_else(|| KeyerError::EmptySource(dir.display().to_string()))?;
        let (width, height) = first.into_rgb8().dimensions();

        tracing::info!(
            "Found {} frames at {}x{}, {} fps",
            paths.len(),
            width,
            height,
            frame_rate
        );

        Ok(Self {
            paths,
            next: 0,
            width,
            height,
            frame_rate,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl CaptureSource for ImageSequenceCapture {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        while let Some(path) = self.paths.get(self.next) {
            self.next += 1;
            match image::open(path) {
                Ok(decoded) => {
                    return Ok(Some(fit_frame(decoded.into_rgb8(), self.width, self.height)));
                }
                Err(e) => tracing::warn!("Skipping unreadable frame {}: {}", path.display(), e),
            }
        }
        Ok(None)
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_rate(&self) -> f32 {
        self.frame_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn write_frame(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) {
        RgbImage::from_pixel(width, height, Rgb(color))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_reads_frames_in_name_order_then_ends() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "frame_002.png", 4, 3, [0, 0, 255]);
        write_frame(dir.path(), "frame_001.png", 4, 3, [255, 0, 0]);
        fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut capture = ImageSequenceCapture::open(dir.path(), 24.0).unwrap();
        assert_eq!(capture.len(), 2);
        assert_eq!(
            capture.stream_info(),
            crate::capture::StreamInfo { width: 4, height: 3, frame_rate: 24.0 }
        );

        let first = capture.capture_frame().unwrap().unwrap();
        assert_eq!(first.get_pixel(0, 0).0, [255, 0, 0]);
        let second = capture.capture_frame().unwrap().unwrap();
        assert_eq!(second.get_pixel(0, 0).0, [0, 0, 255]);
        assert!(capture.capture_frame().unwrap().is_none());
        assert!(capture.capture_frame().unwrap().is_none());
    }

    #[test]
    fn test_frames_are_scaled_to_first_resolution() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "a.png", 8, 6, [10, 20, 30]);
        write_frame(dir.path(), "b.png", 16, 12, [10, 20, 30]);

        let mut capture = ImageSequenceCapture::open(dir.path(), 30.0).unwrap();
        capture.capture_frame().unwrap();
        let scaled = capture.capture_frame().unwrap().unwrap();
        assert_eq!(scaled.dimensions(), (8, 6));
    }

    #[test]
    fn test_missing_directory_is_unopenable() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageSequenceCapture::open(dir.path().join("nope"), 30.0);
        assert!(matches!(result, Err(KeyerError::UnopenableSource(..))));
    }

    #[test]
    fn test_directory_without_frames_is_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageSequenceCapture::open(dir.path(), 30.0);
        assert!(matches!(result, Err(KeyerError::EmptySource(_))));
    }
}
