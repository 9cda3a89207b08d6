//! Image loading for image-style backgrounds.
//!
//! Loading is split in two so no borrow of editor state is held across an
//! await point:
//!
//! 1. [`LoadRequest::resolve`] runs synchronously and copies whatever it
//!    needs out of the [`ResourceRegistry`].
//! 2. [`ImageLoader::load`] does the slow part (HTTP, filesystem, decode).
//!
//! Each load is tagged with a [`LoadTicket`] from a [`LoadTracker`]. Starting
//! a new load or cancelling bumps the generation, and results carrying a
//! stale ticket are dropped by the caller, so an abandoned load never
//! mutates anything.

use std::path::PathBuf;
use std::time::Duration;

use image::DynamicImage;

use crate::design::ImageSource;
use crate::error::{QrwallError, Result};
use crate::resources::{ResourceHandle, ResourceRegistry};

/// Everything needed to finish a load without touching editor state.
#[derive(Debug, Clone)]
pub enum LoadRequest {
    Url(String),
    Path(PathBuf),
    Bytes {
        handle: ResourceHandle,
        bytes: Vec<u8>,
    },
}

impl LoadRequest {
    pub fn resolve(source: &ImageSource, registry: &ResourceRegistry) -> Result<Self> {
        match source {
            ImageSource::Url(url) => Ok(LoadRequest::Url(url.clone())),
            ImageSource::Path(path) => Ok(LoadRequest::Path(path.clone())),
            ImageSource::Blob(handle) => {
                let bytes = registry.get(handle).ok_or_else(|| {
                    QrwallError::ImageLoad(format!("{} was already released", handle))
                })?;
                Ok(LoadRequest::Bytes {
                    handle: *handle,
                    bytes: bytes.to_vec(),
                })
            }
        }
    }

    /// The blob handle to release once the decoded image is in place.
    pub fn blob_handle(&self) -> Option<ResourceHandle> {
        match self {
            LoadRequest::Bytes { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}

/// Fetches and decodes images.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    http_client: reqwest::Client,
}

impl ImageLoader {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("qrwall/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| QrwallError::ImageLoad(format!("HTTP client error: {}", e)))?;
        Ok(Self { http_client })
    }

    pub async fn load(&self, request: LoadRequest) -> Result<DynamicImage> {
        let bytes = match request {
            LoadRequest::Url(url) => self.download(&url).await?,
            LoadRequest::Path(path) => tokio::fs::read(&path).await.map_err(|e| {
                QrwallError::ImageLoad(format!("Failed to read {}: {}", path.display(), e))
            })?,
            LoadRequest::Bytes { bytes, .. } => bytes,
        };
        decode(bytes).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| QrwallError::ImageLoad(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(QrwallError::ImageLoad(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| QrwallError::ImageLoad(format!("Failed to read image data: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

/// Decode off the async thread.
async fn decode(bytes: Vec<u8>) -> Result<DynamicImage> {
    tokio::task::spawn_blocking(move || decode_sync(&bytes))
        .await
        .map_err(|e| QrwallError::ImageLoad(format!("Decode task failed: {}", e)))?
}

pub fn decode_sync(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| QrwallError::ImageLoad(format!("Failed to decode image: {}", e)))
}

/// Identifies one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Hands out tickets and remembers which one is current.
#[derive(Debug, Default)]
pub struct LoadTracker {
    generation: u64,
}

impl LoadTracker {
    /// Start a new load, invalidating any in flight.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Invalidate whatever is in flight without starting anything.
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }
}
