//! Persistable settings for a hinting/autoplay session.

use crate::autoplay::AutoplayConfig;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size};
use crate::hinter::HintConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Largest accepted dismissal jitter, in pixels.
pub const MAX_DISMISS_JITTER: u32 = 100;

/// Default capture size, in screen pixels.
pub const DEFAULT_WIDTH: u32 = 252;
pub const DEFAULT_HEIGHT: u32 = 330;

/// All user-tunable options, stored as JSON.
///
/// Missing fields take their defaults, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Screen rectangle to capture; its top-left is the click offset.
    pub capture_region: Rect,
    /// Captures per second.
    pub capture_frequency: u32,
    /// Recognizer sensitivity, 0..=100.
    pub sensitivity: u32,
    /// Recognizer grid size.
    pub columns: usize,
    pub rows: usize,
    /// Percentage of unknown cells at which a board is not trusted.
    pub invalid_threshold: u32,
    pub prefer_best_move: bool,
    pub highlight_mode: bool,
    pub autoplay: bool,
    /// Dialog dismissal point relative to the capture region.
    pub dismiss_offset: Point,
    pub dismiss_jitter: u32,
    pub dismiss_interval_ms: u64,
    pub panic_one_in: u32,
    pub highlight_cutoff: u32,
    pub min_match: u32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        let hint = HintConfig::default();
        Self {
            capture_region: Rect::new(0, 0, DEFAULT_WIDTH, DEFAULT_HEIGHT),
            capture_frequency: 5,
            sensitivity: 50,
            columns: 8,
            rows: 8,
            invalid_threshold: 10,
            prefer_best_move: false,
            highlight_mode: false,
            autoplay: false,
            dismiss_offset: Point::new(DEFAULT_WIDTH as i32 / 2, DEFAULT_HEIGHT as i32 / 2),
            dismiss_jitter: 5,
            dismiss_interval_ms: 400,
            panic_one_in: hint.panic_one_in,
            highlight_cutoff: hint.highlight_cutoff,
            min_match: hint.min_match,
            seed: None,
        }
    }
}

impl Settings {
    /// Defaults with the capture region centred on a screen of `screen` size.
    pub fn centered_on(screen: Size) -> Self {
        let mut settings = Settings::default();
        settings.capture_region.left = screen.width.saturating_sub(DEFAULT_WIDTH) as i32 / 2;
        settings.capture_region.top = screen.height.saturating_sub(DEFAULT_HEIGHT) as i32 / 2;
        settings
    }

    /// Reads and validates settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.capture_region.size().is_empty() {
            return Err(Error::InvalidSetting(
                "capture_region must have a non-zero size".to_string(),
            ));
        }
        if self.capture_frequency == 0 {
            return Err(Error::InvalidSetting(
                "capture_frequency must be at least 1".to_string(),
            ));
        }
        if self.sensitivity > 100 {
            return Err(Error::InvalidSetting(format!(
                "sensitivity must be 0..=100, got {}",
                self.sensitivity
            )));
        }
        if self.invalid_threshold > 100 {
            return Err(Error::InvalidSetting(format!(
                "invalid_threshold must be 0..=100, got {}",
                self.invalid_threshold
            )));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(Error::InvalidSetting(format!(
                "board grid must be at least 1x1, got {}x{}",
                self.columns, self.rows
            )));
        }
        if self.dismiss_jitter > MAX_DISMISS_JITTER {
            return Err(Error::InvalidSetting(format!(
                "dismiss_jitter must be 0..={}, got {}",
                MAX_DISMISS_JITTER, self.dismiss_jitter
            )));
        }
        if self.min_match < 2 {
            return Err(Error::InvalidSetting(format!(
                "min_match must be at least 2, got {}",
                self.min_match
            )));
        }
        Ok(())
    }

    /// Time between two captures.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.capture_frequency.max(1)
    }

    /// Sensitivity as the recognizer expects it.
    pub fn recognizer_sensitivity(&self) -> f32 {
        self.sensitivity as f32 / 100.0
    }

    pub fn hint_config(&self) -> HintConfig {
        HintConfig {
            min_match: self.min_match,
            panic_one_in: self.panic_one_in,
            highlight_cutoff: self.highlight_cutoff,
        }
    }

    pub fn autoplay_config(&self) -> AutoplayConfig {
        AutoplayConfig {
            invalid_threshold: self.invalid_threshold,
            prefer_best_move: self.prefer_best_move,
            capture_region: self.capture_region,
            dismiss_offset: self.dismiss_offset,
            dismiss_jitter: self.dismiss_jitter,
            dismiss_interval: Duration::from_millis(self.dismiss_interval_ms),
        }
    }
}
