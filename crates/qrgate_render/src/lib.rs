//! QR code rendering for qrgate.
//!
//! [`QrCodeRenderer`] implements the rendering capability with the `qrcode`
//! crate, encoding PNG and JPEG through `image` and SVG directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod renderer;

pub use renderer::QrCodeRenderer;
