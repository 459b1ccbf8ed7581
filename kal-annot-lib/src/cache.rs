//! Bounded memoization of per-line annotation results.

use std::collections::HashMap;

/// Default ceiling on cached input lines.
pub const DEFAULT_CAPACITY: usize = 20_000;

/// Maps raw input lines to their finished output lines. When the ceiling is
/// reached the whole cache is dropped before the next insertion; analysis
/// streams repeat the same readings constantly, so a full rebuild is cheap
/// and keeps lookups O(1) without eviction bookkeeping.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<String, Vec<String>>,
    capacity: usize,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ResultCache {
            entries: HashMap::new(),
            capacity,
        }
    }

    pub fn get(&self, line: &str) -> Option<&[String]> {
        self.entries.get(line).map(Vec::as_slice)
    }

    pub fn insert(&mut self, line: &str, output: Vec<String>) {
        if self.entries.len() >= self.capacity {
            tracing::debug!(entries = self.entries.len(), "clearing result cache");
            self.entries.clear();
        }
        self.entries.insert(line.to_string(), output);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss() {
        let mut cache = ResultCache::new();
        assert!(cache.get("\t\"taku\" V Ind 3Sg").is_none());
        cache.insert("\t\"taku\" V Ind 3Sg", vec!["out".to_string()]);
        assert_eq!(
            cache.get("\t\"taku\" V Ind 3Sg"),
            Some(&["out".to_string()][..])
        );
    }

    #[test]
    fn test_full_clear_at_capacity() {
        let mut cache = ResultCache::with_capacity(3);
        for i in 0..3 {
            cache.insert(&format!("line {}", i), vec![]);
        }
        assert_eq!(cache.len(), 3);
        cache.insert("line 3", vec![]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("line 0").is_none());
        assert!(cache.get("line 3").is_some());
    }
}
