//! Render capability backed by a remote HTTP render service
//!
//! The service is expected to answer `GET {base}?data=..&size=WxH&ecc=L&format=png`
//! with a PNG body, which is what the public `create-qr-code` API does.

use crate::error::{Error, Result};
use crate::render::{RenderBackend, RenderOptions};
use async_trait::async_trait;
use image::DynamicImage;
use reqwest::{Client, Url};
use std::time::Duration;

/// Renderer calling out to an HTTP service
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    base_url: Url,
    client: Client,
}

impl RemoteBackend {
    /// Create a backend for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid render service URL '{base_url}': {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    /// Base URL of the service
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the request URL for one render.
    pub fn request_url(&self, text: &str, options: &RenderOptions) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("data", text)
            .append_pair("size", &format!("{0}x{0}", options.size))
            .append_pair("ecc", options.level.as_letter())
            .append_pair("format", "png");
        url
    }

    pub(crate) async fn fetch(&self, text: &str, options: &RenderOptions) -> Result<DynamicImage> {
        let url = self.request_url(text, options);
        tracing::debug!(host = url.host_str(), "Requesting remote render");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!(
                "Render service returned status {}",
                status.as_u16()
            )));
        }

        let body = response.bytes().await?;
        image::load_from_memory(&body).map_err(Error::from)
    }
}

#[async_trait]
impl RenderBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn render(&self, text: &str, options: &RenderOptions) -> Result<DynamicImage> {
        self.fetch(text, options).await
    }
}
