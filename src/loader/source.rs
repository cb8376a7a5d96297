//! Capability sources
//!
//! A source performs one acquisition of the render capability. Channels run
//! sources; the resolver decides which channel runs when.

use crate::config::{LoaderOptions, PrimarySource};
use crate::error::{Error, Result};
use crate::render::{ErrorCorrection, NativeBackend, RemoteBackend, RenderBackend, RenderOptions};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Hardcoded secondary location of the render capability
pub const DEFAULT_FALLBACK_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Something that can produce the render capability
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Acquire the capability once.
    async fn acquire(&self) -> Result<Arc<dyn RenderBackend>>;
}

/// The in-process `qrcode` renderer
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSource;

#[async_trait]
impl CapabilitySource for NativeSource {
    fn name(&self) -> &str {
        "native"
    }

    async fn acquire(&self) -> Result<Arc<dyn RenderBackend>> {
        Ok(Arc::new(NativeBackend::new()))
    }
}

/// A source that is switched off and fails straight away
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSource;

#[async_trait]
impl CapabilitySource for DisabledSource {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn acquire(&self) -> Result<Arc<dyn RenderBackend>> {
        Err(Error::Acquisition {
            source_name: self.name().to_string(),
            reason: "source is disabled".to_string(),
        })
    }
}

/// A remote render service, fetched once to confirm it is reachable
#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
    timeout: Duration,
}

impl RemoteSource {
    /// Source for the service at `url`; every request is bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    /// Service URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CapabilitySource for RemoteSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn acquire(&self) -> Result<Arc<dyn RenderBackend>> {
        let backend = RemoteBackend::new(self.url(), self.timeout)?;
        let probe = RenderOptions {
            size: 64,
            level: ErrorCorrection::L,
        };

        backend
            .fetch("qrforge", &probe)
            .await
            .map_err(|e| Error::Acquisition {
                source_name: self.url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Arc::new(backend))
    }
}

/// Source for the primary channel as configured.
pub fn primary_source(options: &LoaderOptions) -> Result<Arc<dyn CapabilitySource>> {
    Ok(match options.primary {
        PrimarySource::Native => Arc::new(NativeSource),
        PrimarySource::Disabled => Arc::new(DisabledSource),
        PrimarySource::Remote => {
            let url = options.primary_url.as_deref().ok_or_else(|| {
                Error::Config("loader.primary = \"remote\" requires loader.primary_url".to_string())
            })?;
            Arc::new(RemoteSource::new(url, options.request_timeout()))
        }
    })
}

/// Source for the fallback channel as configured.
pub fn fallback_source(options: &LoaderOptions) -> Arc<dyn CapabilitySource> {
    Arc::new(RemoteSource::new(
        options.fallback_url.clone(),
        options.request_timeout(),
    ))
}
