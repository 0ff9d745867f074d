//! Session configuration: encoder rendering parameters, sink locations and
//! the timestamp policy, persisted as JSON.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{TimestampPolicy, DEFAULT_TIMESTAMP_FORMAT};

pub mod loader;
pub mod theme;

#[cfg(test)]
mod tests;

pub use loader::{load_config, save_config, DEFAULT_CONFIG_FILE};
pub use theme::{theme_presets, ThemePreset};

pub const DEFAULT_FONT_FILE: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";
pub const DEFAULT_RECORD_DIR: &str = "./recordings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Streaming destination; streaming is unavailable while unset.
    pub rtmp_url: Option<String>,
    pub ffmpeg_path: String,
    pub font_size: u32,
    pub font_color: String,
    pub background_color: String,
    pub font_file: PathBuf,
    /// Caller-owned capture file. When unset, streaming uses a temporary file.
    pub output_file: Option<PathBuf>,
    pub show_timestamp: bool,
    /// chrono strftime format, e.g. `%Y-%m-%d %H:%M:%S`.
    pub timestamp_format: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub record_path: PathBuf,
    pub theme_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rtmp_url: None,
            ffmpeg_path: "ffmpeg".to_string(),
            font_size: 24,
            font_color: "white".to_string(),
            background_color: "black".to_string(),
            font_file: PathBuf::from(DEFAULT_FONT_FILE),
            output_file: None,
            show_timestamp: false,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            screen_width: ScreenSize::DEFAULT.width,
            screen_height: ScreenSize::DEFAULT.height,
            record_path: PathBuf::from(DEFAULT_RECORD_DIR),
            theme_name: "default".to_string(),
        }
    }
}

impl Config {
    pub fn timestamp_policy(&self) -> Result<TimestampPolicy> {
        TimestampPolicy::new(self.show_timestamp, self.timestamp_format.clone())
    }

    /// Apply a theme preset's colors. Unknown names leave the config untouched.
    pub fn apply_theme(&mut self, name: &str) -> Result<()> {
        let presets = theme_presets();
        let theme = presets
            .get(name)
            .ok_or_else(|| Error::ThemeNotFound(name.to_string()))?;

        self.theme_name = name.to_string();
        self.font_color = theme.font_color.to_string();
        self.background_color = theme.background_color.to_string();
        Ok(())
    }

    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize {
            width: self.screen_width,
            height: self.screen_height,
        }
    }

    pub fn set_screen_size(&mut self, size: ScreenSize) {
        self.screen_width = size.width;
        self.screen_height = size.height;
    }

    pub fn destination(&self) -> Option<&str> {
        self.rtmp_url.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub const DEFAULT: ScreenSize = ScreenSize {
        width: 1280,
        height: 720,
    };

    /// Parse `WIDTHxHEIGHT`, falling back to 1280x720 on malformed input.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|e| {
            tracing::warn!("{}; using {}", e, Self::DEFAULT);
            Self::DEFAULT
        })
    }
}

impl std::str::FromStr for ScreenSize {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || {
            Error::Config(format!(
                "invalid screen size '{value}' (expected WIDTHxHEIGHT)"
            ))
        };
        let (width, height) = value.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
