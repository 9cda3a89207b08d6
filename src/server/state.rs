//! Server state and configuration.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::design::DesignDocument;
use crate::error::Result;
use crate::loader::ImageLoader;

/// Remixes untouched for this long are dropped (1 hour).
pub const REMIX_EXPIRATION_SECS: u64 = 3600;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Rendering settings applied to every request
    pub editor: EditorConfig,
}

/// A shared design stored for later retrieval.
#[derive(Debug, Clone)]
pub struct StoredRemix {
    pub document: DesignDocument,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Instant,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub boot_time: DateTime<Utc>,
    pub loader: ImageLoader,
    pub remixes: RwLock<HashMap<Uuid, StoredRemix>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self> {
        Ok(Self {
            config,
            boot_time: Utc::now(),
            loader: ImageLoader::new()?,
            remixes: RwLock::new(HashMap::new()),
        })
    }
}
