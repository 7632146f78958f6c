use super::OutputSink;
use crate::capture::StreamInfo;
use crate::error::{KeyerError, Result};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the stream description written next to the frames
pub const STREAM_INFO_FILE: &str = "stream.toml";

/// Export sink writing numbered PNG frames into a directory
///
/// The source's stream info (dimensions and frame rate) is recorded in
/// `stream.toml` so the frames can be muxed back into a video.
pub struct ImageSequenceWriter {
    dir: PathBuf,
    info: StreamInfo,
    written: u64,
}

impl ImageSequenceWriter {
    pub fn create<P: AsRef<Path>>(dir: P, info: StreamInfo) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let text = toml::to_string_pretty(&info).map_err(|e| KeyerError::Other(e.to_string()))?;
        fs::write(dir.join(STREAM_INFO_FILE), text)?;

        tracing::info!(
            "Writing {}x{} @ {} fps frames to {}",
            info.width,
            info.height,
            info.frame_rate,
            dir.display()
        );

        Ok(Self {
            dir,
            info,
            written: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for ImageSequenceWriter {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.info.width, self.info.height) {
            return Err(KeyerError::DimensionMismatch {
                what: "export stream",
                expected: (self.info.width, self.info.height),
                actual: frame.dimensions(),
            });
        }

        let path = self.dir.join(format!("frame_{:06}.png", self.written));
        frame.save(&path)?;
        self.written += 1;
        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }
}
