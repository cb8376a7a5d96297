//! Error types for qrforge operations

use thiserror::Error;

/// Result type alias using qrforge's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qrforge operations
#[derive(Error, Debug)]
pub enum Error {
    /// The selected payload mode produced no content
    #[error("Please enter valid content ({0} payload is empty)")]
    EmptyPayload(String),

    /// No render capability is available after resolution
    #[error("Failed to load QR renderer")]
    CapabilityUnavailable,

    /// A capability source could not provide a backend
    #[error("Capability source '{source_name}' failed: {reason}")]
    Acquisition {
        /// Name of the source that failed
        source_name: String,
        /// Why the acquisition failed
        reason: String,
    },

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// Rendered image decoded to something other than the payload
    #[error("Rendered code does not match payload (decoded {decoded:?})")]
    VerificationMismatch {
        /// Text recovered from the rendered image
        decoded: String,
    },

    /// Terminal preview could not be derived from the image
    #[error("Preview failed: {0}")]
    Preview(String),

    /// HTTP transport error talking to a remote renderer
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
