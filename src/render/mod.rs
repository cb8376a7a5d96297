//! Render capability and invocation
//!
//! A [`RenderBackend`] is the capability the loader waits for: something that
//! turns a payload string into a QR image. Two backends ship with the crate,
//! one built on the `qrcode` crate and one calling a remote render service.

pub mod native;
pub mod preview;
pub mod remote;
pub mod verify;

pub use native::NativeBackend;
pub use remote::RemoteBackend;

use crate::error::{Error, Result};
use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Default edge length of rendered codes in pixels
pub const DEFAULT_SIZE: u32 = 256;

/// A capability able to render payload text into a QR image
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Short identifier used in logs and summaries
    fn name(&self) -> &str;

    /// Render `text` into an image honouring `options`
    async fn render(&self, text: &str, options: &RenderOptions) -> Result<DynamicImage>;
}

/// QR error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl ErrorCorrection {
    /// Parse a level letter (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }

    /// Parse a level letter, falling back to `M` for anything unrecognised.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            tracing::warn!(value, "Unknown error correction level, using M");
            Self::M
        })
    }

    /// Single-letter representation
    pub fn as_letter(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }

    pub(crate) fn ec_level(self) -> qrcode::EcLevel {
        match self {
            Self::L => qrcode::EcLevel::L,
            Self::M => qrcode::EcLevel::M,
            Self::Q => qrcode::EcLevel::Q,
            Self::H => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_letter())
    }
}

/// Display options passed to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Requested edge length in pixels
    pub size: u32,
    /// Error correction level
    pub level: ErrorCorrection,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            level: ErrorCorrection::default(),
        }
    }
}

/// A payload rendered by some backend
#[derive(Debug, Clone)]
pub struct RenderedCode {
    /// The payload that was encoded
    pub text: String,
    /// Rendered image
    pub image: DynamicImage,
    /// Name of the backend that produced the image
    pub backend: String,
}

impl RenderedCode {
    /// Write the image as PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(Error::from)
    }
}

/// Render `text` with the given capability.
pub async fn render_payload(
    backend: &Arc<dyn RenderBackend>,
    text: &str,
    options: &RenderOptions,
) -> Result<RenderedCode> {
    if options.size == 0 {
        return Err(Error::QrEncode("size must be greater than zero".to_string()));
    }

    let image = backend.render(text, options).await?;
    tracing::debug!(
        backend = backend.name(),
        width = image.width(),
        height = image.height(),
        level = %options.level,
        "Rendered QR code"
    );

    Ok(RenderedCode {
        text: text.to_string(),
        image,
        backend: backend.name().to_string(),
    })
}

/// Default export file name for a payload mode, e.g. `qrcode-wifi.png`.
pub fn default_file_name(mode: &str) -> String {
    format!("qrcode-{mode}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!(ErrorCorrection::parse("h"), Some(ErrorCorrection::H));
        assert_eq!(ErrorCorrection::parse(" Q "), Some(ErrorCorrection::Q));
        assert_eq!(ErrorCorrection::parse("X"), None);
        assert_eq!(ErrorCorrection::parse_or_default("bogus"), ErrorCorrection::M);
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name("vcard"), "qrcode-vcard.png");
    }

    #[tokio::test]
    async fn test_render_payload_rejects_zero_size() {
        let backend: Arc<dyn RenderBackend> = Arc::new(NativeBackend::new());
        let options = RenderOptions {
            size: 0,
            level: ErrorCorrection::M,
        };
        let result = render_payload(&backend, "hello", &options).await;
        assert!(matches!(result, Err(Error::QrEncode(_))));
    }

    #[tokio::test]
    async fn test_save_png_writes_file() {
        let backend: Arc<dyn RenderBackend> = Arc::new(NativeBackend::new());
        let rendered = render_payload(&backend, "https://example.com", &RenderOptions::default())
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(default_file_name("url"));
        rendered.save_png(&path).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!(reloaded.width(), DEFAULT_SIZE);
        assert_eq!(rendered.backend, "native");
    }
}
