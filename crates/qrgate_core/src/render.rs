//! Render requests as received from callers and the sanitized form handed to
//! the rendering capability.

use crate::{Feature, FeatureSet};
use qrgate_error::{GatewayError, GatewayErrorKind, GatewayResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Edge length in pixels used when the caller does not choose one.
pub const DEFAULT_SIZE: u32 = 256;
/// Smallest accepted edge length in pixels.
pub const MIN_SIZE: u32 = 64;
/// Largest accepted edge length in pixels.
pub const MAX_SIZE: u32 = 2048;

/// Output encoding of a rendered code.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImageFormat {
    /// Portable Network Graphics
    #[default]
    Png,
    /// JPEG
    Jpeg,
    /// Scalable Vector Graphics
    Svg,
}

impl ImageFormat {
    /// MIME type of the encoded bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// Opaque 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// `#000000`
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// `#FFFFFF`
    pub const WHITE: Color = Color {
        r: 0xFF,
        g: 0xFF,
        b: 0xFF,
    };

    /// Upper-case `#RRGGBB` form.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = GatewayError;

    /// Parse `#RRGGBB` or `RRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        let invalid = || {
            GatewayError::new(GatewayErrorKind::InvalidRequest(format!(
                "color must be #RRGGBB, got '{}'",
                s
            )))
        };
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Color {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

/// Render request as sent by a caller.
///
/// Every field except `data` is optional; empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderRequest {
    /// Payload to encode
    pub data: String,
    /// Edge length in pixels
    pub size: Option<u32>,
    /// `png`, `jpeg` or `svg`
    pub format: Option<String>,
    /// Foreground color
    pub color: Option<String>,
    /// Background color
    pub bg_color: Option<String>,
}

impl RenderRequest {
    /// A request for `data` with every option left at its default.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Normalized render parameters consumed by the rendering capability.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct RenderSpec {
    payload: String,
    size: u32,
    format: ImageFormat,
    foreground: Color,
    background: Color,
}

impl RenderSpec {
    /// Apply defaults and plan gating to a caller request.
    ///
    /// Colors are honoured only when `features` contains
    /// [`Feature::CustomColors`]; otherwise they are ignored, not rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use qrgate_core::{Color, FeatureSet, RenderRequest, RenderSpec};
    ///
    /// let mut request = RenderRequest::new("hello");
    /// request.color = Some("#FF0000".to_string());
    /// let spec = RenderSpec::sanitize(&request, FeatureSet::empty()).unwrap();
    /// assert_eq!(*spec.foreground(), Color::BLACK);
    /// assert_eq!(*spec.size(), 256);
    /// ```
    pub fn sanitize(request: &RenderRequest, features: FeatureSet) -> GatewayResult<Self> {
        if request.data.is_empty() {
            return Err(GatewayError::new(GatewayErrorKind::InvalidRequest(
                "data is required".to_string(),
            )));
        }

        let size = match request.size {
            None | Some(0) => DEFAULT_SIZE,
            Some(size) if (MIN_SIZE..=MAX_SIZE).contains(&size) => size,
            Some(size) => {
                return Err(GatewayError::new(GatewayErrorKind::InvalidRequest(
                    format!("size must be between {} and {}, got {}", MIN_SIZE, MAX_SIZE, size),
                )));
            }
        };

        let format = match present(&request.format) {
            None => ImageFormat::default(),
            Some(name) => ImageFormat::from_str(name).map_err(|_| {
                GatewayError::new(GatewayErrorKind::InvalidRequest(format!(
                    "unsupported format '{}'",
                    name
                )))
            })?,
        };

        let (foreground, background) = if features.contains(Feature::CustomColors) {
            (
                present(&request.color)
                    .map(Color::from_str)
                    .transpose()?
                    .unwrap_or(Color::BLACK),
                present(&request.bg_color)
                    .map(Color::from_str)
                    .transpose()?
                    .unwrap_or(Color::WHITE),
            )
        } else {
            (Color::BLACK, Color::WHITE)
        };

        Ok(Self {
            payload: request.data.clone(),
            size,
            format,
            foreground,
            background,
        })
    }

    /// Build a spec directly, bypassing request validation.
    pub fn new(
        payload: impl Into<String>,
        size: u32,
        format: ImageFormat,
        foreground: Color,
        background: Color,
    ) -> Self {
        Self {
            payload: payload.into(),
            size,
            format,
            foreground,
            background,
        }
    }
}
