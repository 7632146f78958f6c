//! Keyer settings file.
//!
//! Settings are read from TOML. Every field is optional and falls back to the
//! tool's startup defaults, and out-of-range values are clamped to what the
//! sliders allow.

use crate::keying::{StepPolicy, MAX_SOFTEN, MAX_SPILL, MAX_THRESHOLD};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File names looked for in the working directory when no path is given
const CONFIG_FILENAMES: &[&str] = &["chromakey.toml", ".chromakey.toml"];

/// Initial slider positions and session settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeyerSettings {
    pub hue_threshold: i32,
    pub sat_threshold: i32,
    pub val_threshold: i32,
    pub soften: u32,
    pub spill: i32,
    pub step_policy: StepPolicy,
    /// Frame rate reported for frame-directory sources
    pub frame_rate: f32,
    /// Delay between ticks of the interactive loop
    pub tick_ms: u64,
    pub export_dir: PathBuf,
    pub background_color: [u8; 3],
}

impl Default for KeyerSettings {
    fn default() -> Self {
        Self {
            hue_threshold: 1,
            sat_threshold: 1,
            val_threshold: 1,
            soften: 1,
            spill: 0,
            step_policy: StepPolicy::Absolute,
            frame_rate: 30.0,
            tick_ms: 25,
            export_dir: PathBuf::from("./chromakey-sample"),
            background_color: [0, 0, 0],
        }
    }
}

impl KeyerSettings {
    pub fn sanitize(mut self) -> Self {
        self.hue_threshold = self.hue_threshold.clamp(0, MAX_THRESHOLD);
        self.sat_threshold = self.sat_threshold.clamp(0, MAX_THRESHOLD);
        self.val_threshold = self.val_threshold.clamp(0, MAX_THRESHOLD);
        self.soften = self.soften.min(MAX_SOFTEN);
        self.spill = self.spill.clamp(0, MAX_SPILL);
        if !self.frame_rate.is_finite() || self.frame_rate < 1.0 {
            self.frame_rate = 1.0;
        }
        self.tick_ms = self.tick_ms.clamp(1, 1000);
        self
    }

    pub fn thresholds(&self) -> [i32; 3] {
        [self.hue_threshold, self.sat_threshold, self.val_threshold]
    }
}

/// Loaded settings plus where they came from and anything worth reporting
pub struct SettingsHandle {
    pub settings: KeyerSettings,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Load settings, preferring `custom_path` over the default file names
///
/// A missing file yields defaults silently. A file that fails to parse yields
/// defaults plus a warning.
pub fn load_settings(custom_path: Option<&Path>) -> SettingsHandle {
    let mut warnings = Vec::new();

    let candidates: Vec<PathBuf> = match custom_path {
        Some(path) => {
            if !path.is_file() {
                warnings.push(format!("Settings file {} not found", path.display()));
            }
            vec![path.to_path_buf()]
        }
        None => CONFIG_FILENAMES.iter().map(PathBuf::from).collect(),
    };

    for candidate in candidates {
        if !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(&candidate) {
            Ok(contents) => match toml::from_str::<KeyerSettings>(&contents) {
                Ok(settings) => {
                    let source = fs::canonicalize(&candidate).unwrap_or(candidate);
                    return SettingsHandle {
                        settings: settings.sanitize(),
                        source: Some(source),
                        warnings,
                    };
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse settings {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read settings {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    SettingsHandle {
        settings: KeyerSettings::default(),
        source: None,
        warnings,
    }
}
