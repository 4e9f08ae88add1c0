use std::collections::HashMap;

use super::ModMetadata;

/// Session-lifetime memo of parsed metadata, keyed by source.
///
/// Remote files key on their download URL; local entries key on
/// `local:<pack_id>:<path>`. A hit never re-fetches and never re-parses.
/// Raw bytes are retained for remote sources so the final emission does
/// not download the same file twice.
#[derive(Default)]
pub struct MetadataCache {
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub metadata: ModMetadata,
    pub raw_bytes: Option<Vec<u8>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a local archive entry.
    pub fn local_key(pack_id: &str, path: &str) -> String {
        format!("local:{pack_id}:{path}")
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, metadata: ModMetadata, raw_bytes: Option<Vec<u8>>) {
        self.entries.insert(key, CacheEntry { metadata, raw_bytes });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_returns_inserted_entry() {
        let mut cache = MetadataCache::new();
        cache.insert(
            "https://cdn.example/mod.jar".to_string(),
            ModMetadata::fallback("mod.jar"),
            Some(vec![1, 2, 3]),
        );

        let entry = cache.get("https://cdn.example/mod.jar").unwrap();
        assert_eq!(entry.metadata.primary().unwrap().id, "mod.jar");
        assert_eq!(entry.raw_bytes.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn local_keys_are_scoped_by_pack() {
        let a = MetadataCache::local_key("pack-a", "mods/x.jar");
        let b = MetadataCache::local_key("pack-b", "mods/x.jar");
        assert_ne!(a, b);
    }

    #[test]
    fn miss_is_none() {
        let cache = MetadataCache::new();
        assert!(cache.get("nope").is_none());
    }
}
