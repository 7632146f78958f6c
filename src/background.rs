//! Replacement background shown wherever the key matches.

use crate::error::{KeyerError, Result};
use crate::keying::Frame;
use image::imageops::{self, FilterType};
use image::Rgb;
use std::path::{Path, PathBuf};

/// Where the background comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundSource {
    Solid([u8; 3]),
    Image(PathBuf),
}

impl Default for BackgroundSource {
    fn default() -> Self {
        BackgroundSource::Solid([0, 0, 0])
    }
}

impl BackgroundSource {
    /// Produce a background frame of exactly `width` x `height`
    pub fn render(&self, width: u32, height: u32) -> Result<Frame> {
        match self {
            BackgroundSource::Solid(color) => Ok(solid(*color, width, height)),
            BackgroundSource::Image(path) => load_image(path, width, height),
        }
    }
}

pub fn solid(color: [u8; 3], width: u32, height: u32) -> Frame {
    Frame::from_pixel(width, height, Rgb(color))
}

/// Load a still image and scale it to the foreground's dimensions
pub fn load_image<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Frame> {
    let path = path.as_ref();
    tracing::info!("Loading background image {}", path.display());

    let image = image::open(path)
        .map_err(|source| KeyerError::Background {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgb8();

    if image.dimensions() == (width, height) {
        return Ok(image);
    }

    tracing::debug!(
        "Resizing background from {:?} to {}x{}",
        image.dimensions(),
        width,
        height
    );
    Ok(imageops::resize(&image, width, height, FilterType::Triangle))
}

/// Parse `r,g,b` into a colour
pub fn parse_color(text: &str) -> std::result::Result<[u8; 3], String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected r,g,b but got `{}`", text));
    }

    let mut color = [0u8; 3];
    for (slot, part) in color.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("`{}` is not a value in 0-255", part))?;
    }
    Ok(color)
}
