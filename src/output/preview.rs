use super::OutputSink;
use crate::error::{KeyerError, Result};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Presents frames by rewriting a single PNG file
///
/// Used when no loopback device is available. The file is only rewritten when
/// the frame changes, and each write goes through a temporary file that is
/// renamed into place so viewers never read a partial image.
pub struct PreviewWriter {
    path: PathBuf,
    width: u32,
    height: u32,
    last: Option<RgbImage>,
    writes: u64,
}

impl PreviewWriter {
    pub fn new<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        tracing::info!("Presenting {}x{} preview at {}", width, height, path.display());

        Ok(Self {
            path,
            width,
            height,
            last: None,
            writes: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the preview file was rewritten
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl OutputSink for PreviewWriter {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(KeyerError::DimensionMismatch {
                what: "preview",
                expected: (self.width, self.height),
                actual: frame.dimensions(),
            });
        }
        if self.last.as_ref() == Some(frame) {
            return Ok(());
        }

        let tmp = self.path.with_extension("tmp.png");
        frame.save(&tmp)?;
        fs::rename(&tmp, &self.path)?;

        self.last = Some(frame.clone());
        self.writes += 1;
        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
