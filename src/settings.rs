//! Machine settings
//!
//! Read-only collaborator for the estimator, the compiler and the document.
//! Loaded from a TOML file; every field has a default so partial files work:
//!
//! ```toml
//! pen_up_angle = 90.0
//! pen_down_feed_rate = 120.0
//! pen_down_color = "#202020"
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a packed `0xRRGGBB` integer; bits above 24 are ignored
    pub fn from_packed(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    pub fn packed(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(text: &str) -> Result<Self, String> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(format!("expected a #rrggbb color, got '{}'", text));
        }

        u32::from_str_radix(digits, 16)
            .map(Self::from_packed)
            .map_err(|_| format!("expected a #rrggbb color, got '{}'", text))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Machine and preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Home position, mm
    pub home_x: f64,
    pub home_y: f64,
    /// Z value meaning "pen lifted", degrees
    pub pen_up_angle: f64,
    /// Z value meaning "pen touching paper", degrees
    pub pen_down_angle: f64,
    /// Cruise speed while drawing, mm/s
    pub pen_down_feed_rate: f64,
    /// mm/s²
    pub acceleration: f64,
    /// Pen lift speed
    pub z_rate: f64,
    pub pen_up_color: Color,
    pub pen_down_color: Color,
    /// Emit geometry for moves made with the pen lifted
    pub show_pen_up: bool,
    /// Mirror programs on load for drawing on the back of glass
    pub reverse_for_glass: bool,
    /// Lines past the cursor highlighted as upcoming during playback
    pub look_ahead_segments: usize,
    /// Keep showing not-yet-reached geometry during playback
    pub draw_all_while_running: bool,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            home_x: 0.0,
            home_y: 0.0,
            pen_up_angle: 90.0,
            pen_down_angle: 50.0,
            pen_down_feed_rate: 90.0,
            acceleration: 250.0,
            z_rate: 50.0,
            pen_up_color: Color::GREEN,
            pen_down_color: Color::BLACK,
            show_pen_up: false,
            reverse_for_glass: false,
            look_ahead_segments: 3,
            draw_all_while_running: true,
        }
    }
}

impl MachineSettings {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;

        Self::from_toml_str(&content).map_err(|e| Error::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The line a program uses to lift the pen, used as a safe resume marker
    pub fn pen_up_command(&self) -> String {
        format!("G00 Z{}", self.pen_up_angle)
    }

    /// The line a program uses to lower the pen
    pub fn pen_down_command(&self) -> String {
        format!("G01 Z{}", self.pen_down_angle)
    }
}
