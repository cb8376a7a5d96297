//! Render capability backed by the `qrcode` crate

use crate::error::{Error, Result};
use crate::render::{RenderBackend, RenderOptions};
use async_trait::async_trait;
use image::{DynamicImage, GrayImage, Luma, imageops};
use qrcode::QrCode;
use tracing::warn;

/// In-process QR renderer
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl NativeBackend {
    /// Create a new native backend
    pub fn new() -> Self {
        Self
    }

    /// Render synchronously; the async trait method delegates here.
    pub fn render_blocking(&self, text: &str, options: &RenderOptions) -> Result<DynamicImage> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), options.level.ec_level())
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))?;

        let image = code
            .render::<Luma<u8>>()
            .max_dimensions(options.size, options.size)
            .build();

        // Whole modules rarely divide the requested size exactly; pad the
        // quiet zone so the output is exactly `size` pixels wide.
        if image.width() >= options.size {
            if image.width() > options.size {
                warn!(
                    requested = options.size,
                    actual = image.width(),
                    "Requested size is below the smallest symbol, rendering larger"
                );
            }
            return Ok(DynamicImage::ImageLuma8(image));
        }

        let mut canvas = GrayImage::from_pixel(options.size, options.size, Luma([255u8]));
        let offset = i64::from((options.size - image.width()) / 2);
        imageops::overlay(&mut canvas, &image, offset, offset);

        Ok(DynamicImage::ImageLuma8(canvas))
    }
}

#[async_trait]
impl RenderBackend for NativeBackend {
    fn name(&self) -> &str {
        "native"
    }

    async fn render(&self, text: &str, options: &RenderOptions) -> Result<DynamicImage> {
        self.render_blocking(text, options)
    }
}
