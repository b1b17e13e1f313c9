//! Bidirectional name <-> ShortGuid cache.
//!
//! Entries are append-only: once a name is registered it is never removed or
//! remapped. On an id collision the first registered name wins.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;

use super::ShortGuid;
use crate::core::{DataType, FunctionType, ResourceKind, RESOURCE_PARAMETER};

#[derive(Default)]
struct CacheInner {
    by_name: HashMap<String, ShortGuid>,
    by_id: HashMap<ShortGuid, String>,
}

/// Thread-safe name cache.
///
/// Pass one explicitly into decode to keep archives isolated, or use
/// [`GuidCache::global`] for a shared process-wide instance.
#[derive(Default)]
pub struct GuidCache {
    inner: RwLock<CacheInner>,
}

impl GuidCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-seeded with every built-in data type, resource
    /// kind and function type name.
    pub fn with_known_names() -> Self {
        let cache = Self::new();
        for dt in DataType::ALL {
            cache.insert(dt.name(), dt.tag());
        }
        for kind in ResourceKind::ALL {
            cache.insert(kind.name(), kind.tag());
        }
        for ft in FunctionType::ALL {
            cache.insert(ft.name(), ft.id());
        }
        cache.generate(RESOURCE_PARAMETER);
        cache
    }

    /// Process-wide cache seeded with the known names.
    pub fn global() -> &'static GuidCache {
        static GLOBAL: OnceLock<GuidCache> = OnceLock::new();
        GLOBAL.get_or_init(GuidCache::with_known_names)
    }

    /// Get the id for a name, hashing and registering it on a miss.
    pub fn generate(&self, name: &str) -> ShortGuid {
        if let Some(id) = self.inner.read().by_name.get(name) {
            return *id;
        }
        let id = ShortGuid::from_name(name);
        self.insert(name, id);
        id
    }

    /// Register a known pair. Existing entries are kept.
    pub fn insert(&self, name: &str, id: ShortGuid) {
        let mut inner = self.inner.write();
        inner.by_name.entry(name.to_string()).or_insert(id);
        inner.by_id.entry(id).or_insert_with(|| name.to_string());
    }

    /// Name for an id, if one has been registered.
    pub fn lookup(&self, id: ShortGuid) -> Option<String> {
        self.inner.read().by_id.get(&id).cloned()
    }

    /// Name for an id, falling back to its hex byte rendering.
    pub fn find_string(&self, id: ShortGuid) -> String {
        self.lookup(id).unwrap_or_else(|| id.to_string())
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_stable() {
        let cache = GuidCache::new();
        let a = cache.generate("CAGEAnimation");
        let b = cache.generate("CAGEAnimation");
        assert_eq!(a, b);
        assert_eq!(a, ShortGuid::from_name("CAGEAnimation"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_find_string() {
        let cache = GuidCache::new();
        let id = cache.generate("DoorOpen");
        assert_eq!(cache.find_string(id), "DoorOpen");

        let unknown = ShortGuid::new(0x0403_0201);
        assert_eq!(cache.find_string(unknown), "01-02-03-04");
        assert!(cache.lookup(unknown).is_none());
    }

    #[test]
    fn test_first_writer_wins() {
        let cache = GuidCache::new();
        let id = ShortGuid::new(7);
        cache.insert("first", id);
        cache.insert("second", id);
        assert_eq!(cache.find_string(id), "first");
    }

    #[test]
    fn test_known_names() {
        let cache = GuidCache::with_known_names();
        assert_eq!(cache.find_string(ShortGuid::from_name("TriggerSequence")), "TriggerSequence");
        assert_eq!(cache.find_string(DataType::Spline.tag()), "SPLINE");
        assert_eq!(cache.find_string(ShortGuid::from_name("resource")), "resource");
    }

    #[test]
    fn test_concurrent_generate() {
        let cache = GuidCache::new();
        std::thread::scope(|s| {
            for t in 0..4 {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..64 {
                        cache.generate(&format!("name_{}", (i + t) % 64));
                    }
                });
            }
        });
        assert_eq!(cache.len(), 64);
    }
}
