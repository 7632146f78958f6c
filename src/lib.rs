//! Interactive chroma keyer.
//!
//! A key colour range is sampled from a dragged patch of the frame, widened
//! or narrowed with per-channel threshold sliders, turned into a softened
//! alpha mask and used to blend a replacement background over the frame
//! after spill suppression.

pub mod background;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod keying;
pub mod output;

pub use error::{KeyerError, Result};
