//! Rendering a sanitized spec into image bytes.

use image::{ImageBuffer, Rgb};
use qrcode::QrCode;
use qrcode::render::svg;
use qrgate_core::{Color, ImageFormat, RenderSpec};
use qrgate_error::RenderError;
use qrgate_interface::QrRenderer;
use std::io::Cursor;
use tracing::{debug, instrument};

/// Stateless QR code renderer.
///
/// # Example
///
/// ```
/// use qrgate_core::{Color, ImageFormat, RenderSpec};
/// use qrgate_interface::QrRenderer;
/// use qrgate_render::QrCodeRenderer;
///
/// let spec = RenderSpec::new("hello", 256, ImageFormat::Png, Color::BLACK, Color::WHITE);
/// let png = QrCodeRenderer::new().render(&spec).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeRenderer;

impl QrCodeRenderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self
    }
}

fn rgb(color: Color) -> Rgb<u8> {
    Rgb([color.r, color.g, color.b])
}

fn encode_raster(
    image: &ImageBuffer<Rgb<u8>, Vec<u8>>,
    format: image::ImageFormat,
) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, format)
        .map_err(|e| RenderError::new(format!("Failed to encode {:?}: {}", format, e)))?;
    Ok(bytes.into_inner())
}

impl QrRenderer for QrCodeRenderer {
    #[instrument(skip_all, fields(size = spec.size(), format = %spec.format()))]
    fn render(&self, spec: &RenderSpec) -> Result<Vec<u8>, RenderError> {
        let code = QrCode::new(spec.payload().as_bytes())
            .map_err(|e| RenderError::new(format!("Failed to encode payload: {}", e)))?;
        let size = *spec.size();

        let bytes = match spec.format() {
            ImageFormat::Svg => {
                let dark = spec.foreground().to_hex();
                let light = spec.background().to_hex();
                code.render::<svg::Color<'_>>()
                    .min_dimensions(size, size)
                    .max_dimensions(size, size)
                    .dark_color(svg::Color(&dark))
                    .light_color(svg::Color(&light))
                    .build()
                    .into_bytes()
            }
            raster => {
                let image = code
                    .render::<Rgb<u8>>()
                    .min_dimensions(size, size)
                    .max_dimensions(size, size)
                    .dark_color(rgb(*spec.foreground()))
                    .light_color(rgb(*spec.background()))
                    .build();
                let format = match raster {
                    ImageFormat::Jpeg => image::ImageFormat::Jpeg,
                    _ => image::ImageFormat::Png,
                };
                encode_raster(&image, format)?
            }
        };

        debug!(bytes = bytes.len(), "Rendered QR code");
        Ok(bytes)
    }
}
