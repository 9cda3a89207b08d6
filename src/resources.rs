//! Ownership of transient binary resources.
//!
//! Uploaded image bytes are parked here under a [`ResourceHandle`] until the
//! background compositor has decoded them into a layer. The component that
//! created a handle releases it explicitly on replacement; whatever is left
//! is released when the registry is dropped.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque reference to bytes held by a [`ResourceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(Uuid);

impl ResourceHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    blobs: HashMap<ResourceHandle, Vec<u8>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `bytes` and hand back a handle to them.
    pub fn insert(&mut self, bytes: Vec<u8>) -> ResourceHandle {
        let handle = ResourceHandle::new();
        tracing::debug!(%handle, len = bytes.len(), "registered blob");
        self.blobs.insert(handle, bytes);
        handle
    }

    pub fn get(&self, handle: &ResourceHandle) -> Option<&[u8]> {
        self.blobs.get(handle).map(Vec::as_slice)
    }

    /// Drop the bytes behind `handle`. Returns false if it was already gone.
    pub fn release(&mut self, handle: &ResourceHandle) -> bool {
        let released = self.blobs.remove(handle).is_some();
        if released {
            tracing::debug!(%handle, "released blob");
        }
        released
    }

    pub fn release_all(&mut self) {
        if !self.blobs.is_empty() {
            tracing::debug!(count = self.blobs.len(), "releasing all blobs");
        }
        self.blobs.clear();
    }

    pub fn live_count(&self) -> usize {
        self.blobs.len()
    }

    pub fn contains(&self, handle: &ResourceHandle) -> bool {
        self.blobs.contains_key(handle)
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_release() {
        let mut registry = ResourceRegistry::new();
        let handle = registry.insert(vec![1, 2, 3]);
        assert_eq!(registry.get(&handle), Some(&[1u8, 2, 3][..]));
        assert_eq!(registry.live_count(), 1);

        assert!(registry.release(&handle));
        assert!(!registry.release(&handle));
        assert_eq!(registry.get(&handle), None);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut registry = ResourceRegistry::new();
        let a = registry.insert(vec![]);
        let b = registry.insert(vec![]);
        assert_ne!(a, b);
        registry.release_all();
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_handle_serializes_as_uuid_string() {
        let mut registry = ResourceRegistry::new();
        let handle = registry.insert(vec![]);
        let json = serde_json::to_string(&handle).unwrap();
        let back: ResourceHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);
    }
}
