//! qrforge - QR payload builder with a fallback-loaded render capability
//!
//! Builds URL, WiFi, vCard and mailto payloads and renders them through a
//! render capability that is acquired at runtime: first through a primary
//! channel declared at startup, then, if that is slow or fails, through a
//! single fallback channel.
//!
//! # Features
//!
//! - **Payloads**: `WIFI:`, vCard 3.0, `mailto:` and plain text builders
//! - **Capability loading**: first-signal-wins race between the primary
//!   channel and a 1200 ms timer, with at most one fallback injection
//! - **Backends**: in-process `qrcode` rendering or a remote render service
//! - **Async-first**: Built on Tokio; resolution never fails or hangs
//!
//! # Example
//!
//! ```no_run
//! use qrforge::loader::CapabilityResolver;
//! use qrforge::payload::{PayloadRequest, WifiCredentials};
//! use qrforge::render::{RenderOptions, render_payload};
//! use qrforge::{Error, LoaderOptions};
//!
//! #[tokio::main]
//! async fn main() -> qrforge::Result<()> {
//!     let resolver = CapabilityResolver::from_options(&LoaderOptions::default())?;
//!
//!     let request = PayloadRequest::Wifi(WifiCredentials {
//!         ssid: "HomeNet".into(),
//!         password: "hunter2".into(),
//!         ..Default::default()
//!     });
//!     let text = request.build().ok_or(Error::EmptyPayload("wifi".into()))?;
//!
//!     resolver.ensure_capability().await;
//!     let backend = resolver.capability().ok_or(Error::CapabilityUnavailable)?;
//!     let code = render_payload(&backend, &text, &RenderOptions::default()).await?;
//!     code.save_png("qrcode-wifi.png".as_ref())?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod payload;
pub mod prefs;
pub mod render;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{LoaderOptions, LogRotation, LoggingOptions, PrimarySource, QrforgeConfig};
pub use loader::{CapabilityHandle, CapabilityResolver, Channel, ChannelSignal, FALLBACK_DELAY};
pub use payload::{PayloadMode, PayloadRequest};
pub use prefs::{PreferenceStore, Theme};
pub use render::{ErrorCorrection, RenderBackend, RenderOptions, RenderedCode};
