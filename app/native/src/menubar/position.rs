//! Last known on-screen positions of the boundary markers.
//!
//! A marker expanded to blocking length cannot be queried, so every read of a
//! marker's X goes through [`PositionCache::origin_x`]:
//!
//! 1. blocking length: return the cached value, never query live
//! 2. otherwise query live; a valid reading is written back before returning
//! 3. an invalid or missing live reading falls back to the cache
//!
//! Any expand (including the shield) therefore refreshes the cache for free.
//! The cache lives for the whole process and is never persisted.

use dashmap::DashMap;

use super::marker::{MarkerKind, is_blocking};
use crate::platform::WindowShell;

/// Process-wide cache of marker `originX` values.
#[derive(Debug, Default)]
pub struct PositionCache {
    origins: DashMap<MarkerKind, f64>,
}

impl PositionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Resolves a marker's left edge given its current `length`.
    pub fn origin_x(&self, shell: &dyn WindowShell, kind: MarkerKind, length: f64) -> Option<f64> {
        if is_blocking(length) {
            return self.cached(kind);
        }

        match shell.marker_frame(kind) {
            Some(frame) if frame.is_valid() => {
                self.origins.insert(kind, frame.x);
                Some(frame.x)
            }
            _ => {
                tracing::trace!(marker = %kind, "live position unavailable, using cache");
                self.cached(kind)
            }
        }
    }

    /// Returns the cached value without touching the shell.
    #[must_use]
    pub fn cached(&self, kind: MarkerKind) -> Option<f64> {
        self.origins.get(&kind).map(|entry| *entry.value())
    }

    /// Drops the cached value, e.g. after the marker was removed.
    pub fn forget(&self, kind: MarkerKind) { self.origins.remove(&kind); }
}
