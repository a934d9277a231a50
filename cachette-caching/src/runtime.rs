//! Runtime tier: a process-lifetime mirror of stored payloads

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Write-through mirror of payloads written by [`Cache::store`](crate::Cache::store)
///
/// The cache facade only writes here; it never reads back from it. Callers
/// that want a process-local hit before going to the backend consult the tier
/// themselves. Handles are cheap to clone and share one map; the last writer
/// for a key wins.
#[derive(Debug, Clone, Default)]
pub struct RuntimeTier {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl RuntimeTier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, payload: Vec<u8>) {
        self.entries.write().insert(key.into(), payload);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.write().remove(key)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let tier = RuntimeTier::new();
        let other = tier.clone();

        tier.insert("page:/", b"<html>".to_vec());
        other.insert("page:/", b"<html2>".to_vec());

        assert_eq!(tier.get("page:/"), Some(b"<html2>".to_vec()));
        assert_eq!(tier.len(), 1);

        assert_eq!(other.remove("page:/"), Some(b"<html2>".to_vec()));
        assert!(tier.is_empty());
    }

    #[test]
    fn test_separate_tiers_are_isolated() {
        let a = RuntimeTier::new();
        let b = RuntimeTier::new();

        a.insert("k", vec![1]);
        assert!(a.contains_key("k"));
        assert!(!b.contains_key("k"));

        a.clear();
        assert!(a.is_empty());
    }
}
