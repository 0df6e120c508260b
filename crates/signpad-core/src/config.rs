//! Export configuration, output formats and page profiles.
//!
//! Every setter validates against the active profile. A rejected value is
//! dropped and the previous one kept; nothing is surfaced to the user.

use peniko::Color;
use peniko::color::{parse_color, Srgb};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: ConfigField,
        value: i64,
        min: u32,
        max: u32,
    },
    #[error("Not a number: {0:?}")]
    NotANumber(String),
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
    #[error("Unsupported format: {0:?}")]
    InvalidFormat(String),
}

/// Numeric configuration fields editable from text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigField {
    Width,
    Height,
    MaxSizeKb,
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConfigField::Width => "width",
            ConfigField::Height => "height",
            ConfigField::MaxSizeKb => "max size",
        })
    }
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpg,
    Jpeg,
}

impl ExportFormat {
    /// All selectable formats, in display order.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpg, ExportFormat::Jpeg];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpg => "JPG",
            ExportFormat::Jpeg => "JPEG",
        }
    }

    /// Lowercase file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type, `image/<extension>`.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpg => "image/jpg",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    /// Name of the downloaded file.
    pub fn file_name(self) -> String {
        format!("signature.{}", self.extension())
    }

    /// Whether the encoder applies a quality factor.
    pub fn is_lossy(self) -> bool {
        !matches!(self, ExportFormat::Png)
    }

    /// Parse a label or extension, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" => Some(ExportFormat::Jpg),
            "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }
}

/// A named background swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetColor {
    pub name: &'static str,
    pub value: &'static str,
}

/// Background swatches offered next to the free color picker.
pub const PRESET_COLORS: [PresetColor; 3] = [
    PresetColor { name: "White", value: "#FFFFFF" },
    PresetColor { name: "Light Gray", value: "#F5F5F5" },
    PresetColor { name: "Cream", value: "#FFEFD5" },
];

/// A background fill color, keeping the text it was parsed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackgroundColor {
    text: String,
    color: Color,
}

impl BackgroundColor {
    /// Parse any CSS color (`#fff`, `#FFEFD5`, `rgb(...)`, `papayawhip`...).
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let trimmed = text.trim();
        let color = parse_color(trimmed)
            .map_err(|_| ConfigError::InvalidColor(text.to_string()))?
            .to_alpha_color::<Srgb>();
        Ok(Self {
            text: trimmed.to_string(),
            color,
        })
    }

    /// The text as entered.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Straight RGBA8 components.
    pub fn rgba8(&self) -> [u8; 4] {
        let c = self.color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }
}

impl PartialEq for BackgroundColor {
    fn eq(&self, other: &Self) -> bool {
        self.rgba8() == other.rgba8()
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self {
            text: "#FFFFFF".to_string(),
            color: Color::from_rgba8(255, 255, 255, 255),
        }
    }
}

impl TryFrom<String> for BackgroundColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BackgroundColor> for String {
    fn from(color: BackgroundColor) -> Self {
        color.text
    }
}

/// The pages of the product differ in defaults and in the size cap range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportProfile {
    /// Draw or upload a signature (the home page).
    #[default]
    Signature,
    /// Resize an existing signature.
    Resize,
}

impl ExportProfile {
    /// Look up a profile by its serialized name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "signature" => Some(ExportProfile::Signature),
            "resize" => Some(ExportProfile::Resize),
            _ => None,
        }
    }

    /// Accepted output widths.
    pub fn width_range(self) -> RangeInclusive<u32> {
        50..=1000
    }

    /// Accepted output heights.
    pub fn height_range(self) -> RangeInclusive<u32> {
        50..=1000
    }

    /// Accepted size caps in kilobytes.
    pub fn max_size_range(self) -> RangeInclusive<u32> {
        match self {
            ExportProfile::Signature => 10..=500,
            ExportProfile::Resize => 100..=2000,
        }
    }

    /// Default output size.
    pub fn default_dimensions(self) -> (u32, u32) {
        match self {
            ExportProfile::Signature => (350, 150),
            ExportProfile::Resize => (300, 150),
        }
    }

    /// Default size cap in kilobytes.
    pub fn default_max_size_kb(self) -> u32 {
        match self {
            ExportProfile::Signature => 45,
            ExportProfile::Resize => 500,
        }
    }
}

/// User-set export options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    profile: ExportProfile,
    width: u32,
    height: u32,
    background_enabled: bool,
    background_color: BackgroundColor,
    format: ExportFormat,
    max_size_kb: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::for_profile(ExportProfile::default())
    }
}

impl ExportConfig {
    /// Defaults for a page profile.
    pub fn for_profile(profile: ExportProfile) -> Self {
        let (width, height) = profile.default_dimensions();
        Self {
            profile,
            width,
            height,
            background_enabled: false,
            background_color: BackgroundColor::default(),
            format: ExportFormat::default(),
            max_size_kb: profile.default_max_size_kb(),
        }
    }

    /// Re-apply every field through its setter, starting from profile defaults.
    ///
    /// Use on configs that bypassed the setters, e.g. after deserializing.
    pub fn validated(&self) -> Self {
        let mut config = Self::for_profile(self.profile);
        config.set_width(self.width);
        config.set_height(self.height);
        config.set_max_size_kb(self.max_size_kb);
        config.set_background_enabled(self.background_enabled);
        config.background_color = self.background_color.clone();
        config.set_format(self.format);
        config
    }

    pub fn profile(&self) -> ExportProfile {
        self.profile
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background_enabled(&self) -> bool {
        self.background_enabled
    }

    pub fn background_color(&self) -> &BackgroundColor {
        &self.background_color
    }

    /// Fill color when the background is enabled.
    pub fn background(&self) -> Option<Color> {
        self.background_enabled.then(|| self.background_color.color())
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn max_size_kb(&self) -> u32 {
        self.max_size_kb
    }

    /// The size cap in bytes.
    pub fn max_size_bytes(&self) -> usize {
        self.max_size_kb as usize * 1024
    }

    /// Check a value against the profile's range for `field`.
    pub fn check(&self, field: ConfigField, value: i64) -> Result<u32, ConfigError> {
        let range = match field {
            ConfigField::Width => self.profile.width_range(),
            ConfigField::Height => self.profile.height_range(),
            ConfigField::MaxSizeKb => self.profile.max_size_range(),
        };
        match u32::try_from(value) {
            Ok(v) if range.contains(&v) => Ok(v),
            _ => Err(ConfigError::OutOfRange {
                field,
                value,
                min: *range.start(),
                max: *range.end(),
            }),
        }
    }

    fn apply(&mut self, field: ConfigField, value: i64) -> bool {
        match self.check(field, value) {
            Ok(v) => {
                match field {
                    ConfigField::Width => self.width = v,
                    ConfigField::Height => self.height = v,
                    ConfigField::MaxSizeKb => self.max_size_kb = v,
                }
                true
            }
            Err(e) => {
                log::debug!("Ignoring {}: {}", field, e);
                false
            }
        }
    }

    /// Set the output width. Returns whether the value was accepted.
    pub fn set_width(&mut self, width: u32) -> bool {
        self.apply(ConfigField::Width, width as i64)
    }

    /// Set the output height. Returns whether the value was accepted.
    pub fn set_height(&mut self, height: u32) -> bool {
        self.apply(ConfigField::Height, height as i64)
    }

    /// Set the size cap in KB. Returns whether the value was accepted.
    pub fn set_max_size_kb(&mut self, max_size_kb: u32) -> bool {
        self.apply(ConfigField::MaxSizeKb, max_size_kb as i64)
    }

    /// Apply raw text from a numeric form field.
    ///
    /// The leading integer is used (`"120px"` is 120); text with no leading
    /// integer is ignored.
    pub fn set_from_input(&mut self, field: ConfigField, raw: &str) -> bool {
        match parse_leading_int(raw) {
            Ok(value) => self.apply(field, value),
            Err(e) => {
                log::debug!("Ignoring {}: {}", field, e);
                false
            }
        }
    }

    pub fn set_background_enabled(&mut self, enabled: bool) {
        self.background_enabled = enabled;
    }

    /// Set the background color from CSS text. Returns whether it parsed.
    pub fn set_background_color(&mut self, text: &str) -> bool {
        match BackgroundColor::parse(text) {
            Ok(color) => {
                self.background_color = color;
                true
            }
            Err(e) => {
                log::debug!("Ignoring background color: {}", e);
                false
            }
        }
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    /// Select the format by label or extension. Returns whether it was known.
    pub fn set_format_name(&mut self, name: &str) -> bool {
        match ExportFormat::from_name(name) {
            Some(format) => {
                self.format = format;
                true
            }
            None => {
                log::debug!("Ignoring format: {}", ConfigError::InvalidFormat(name.to_string()));
                false
            }
        }
    }
}

/// Parse the leading (optionally signed) integer of `raw`.
fn parse_leading_int(raw: &str) -> Result<i64, ConfigError> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end]
        .parse()
        .map_err(|_| ConfigError::NotANumber(raw.to_string()))?;
    Ok(if negative { -value } else { value })
}
