//! Scan check of rendered output using rqrr

use crate::error::{Error, Result};
use image::{DynamicImage, GrayImage};

/// Decode the first QR code found in `img`.
pub fn decode(img: &DynamicImage) -> Result<String> {
    decode_gray(img.to_luma8())
}

/// Decode the first QR code found in a grayscale image.
pub fn decode_gray(img: GrayImage) -> Result<String> {
    let mut prepared = rqrr::PreparedImage::prepare(img);
    let grids = prepared.detect_grids();

    let grid = grids.first().ok_or(Error::NoQrCodeFound)?;

    match grid.decode() {
        Ok((meta, content)) => {
            tracing::debug!(
                "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                meta.version,
                meta.ecc_level,
                content.len()
            );
            Ok(content)
        }
        Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
    }
}

/// Confirm that `img` decodes back to `expected`.
pub fn check(img: &DynamicImage, expected: &str) -> Result<()> {
    let decoded = decode(img)?;
    if decoded == expected {
        Ok(())
    } else {
        Err(Error::VerificationMismatch { decoded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_image_has_no_code() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, image::Luma([255])));
        assert!(matches!(decode(&blank), Err(Error::NoQrCodeFound)));
    }

    #[test]
    fn test_check_detects_mismatch() {
        use crate::render::{NativeBackend, RenderOptions};

        let image = NativeBackend::new()
            .render_blocking("first", &RenderOptions::default())
            .unwrap();
        assert!(check(&image, "first").is_ok());
        assert!(matches!(
            check(&image, "second"),
            Err(Error::VerificationMismatch { decoded }) if decoded == "first"
        ));
    }
}
