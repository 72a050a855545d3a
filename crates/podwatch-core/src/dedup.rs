//! Bounded memory of the last label emitted per pod.

use std::collections::{HashMap, VecDeque};

type PodKey = (String, String);

/// Last emitted label per (namespace, name), oldest keys evicted first.
#[derive(Debug)]
pub struct LastLabelCache {
    capacity: usize,
    labels: HashMap<PodKey, String>,
    order: VecDeque<PodKey>,
}

impl LastLabelCache {
    /// Creates a cache holding at most `capacity` pods.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            labels: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Records `label` for the pod and returns `false` if it was already
    /// the last label emitted for it.
    pub fn observe(&mut self, namespace: &str, name: &str, label: &str) -> bool {
        let key = (namespace.to_string(), name.to_string());
        match self.labels.get_mut(&key) {
            Some(last) if last == label => false,
            Some(last) => {
                label.clone_into(last);
                true
            }
            None => {
                if self.labels.len() >= self.capacity {
                    self.evict_oldest();
                }
                self.order.push_back(key.clone());
                let _ = self.labels.insert(key, label.to_string());
                true
            }
        }
    }

    /// Drops whatever is remembered for the pod.
    pub fn forget(&mut self, namespace: &str, name: &str) {
        let key = (namespace.to_string(), name.to_string());
        if self.labels.remove(&key).is_some() {
            self.order.retain(|k| k != &key);
        }
    }

    /// Number of pods currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            let _ = self.labels.remove(&oldest);
            tracing::trace!(namespace = %oldest.0, name = %oldest.1, "evicted from label cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_label_is_suppressed() {
        let mut cache = LastLabelCache::new(8);
        assert!(cache.observe("prod", "web-0", "Pending"));
        assert!(!cache.observe("prod", "web-0", "Pending"));
        assert!(cache.observe("prod", "web-0", "Running"));
        assert!(!cache.observe("prod", "web-0", "Running"));
    }

    #[test]
    fn same_name_in_other_namespace_is_distinct() {
        let mut cache = LastLabelCache::new(8);
        assert!(cache.observe("prod", "web-0", "Running"));
        assert!(cache.observe("staging", "web-0", "Running"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn oldest_pod_is_evicted_at_capacity() {
        let mut cache = LastLabelCache::new(2);
        assert!(cache.observe("ns", "a", "Running"));
        assert!(cache.observe("ns", "b", "Running"));
        assert!(cache.observe("ns", "c", "Running"));
        assert_eq!(cache.len(), 2);
        assert!(cache.observe("ns", "a", "Running"));
        assert!(!cache.observe("ns", "c", "Running"));
    }

    #[test]
    fn forget_allows_reemission() {
        let mut cache = LastLabelCache::new(2);
        assert!(cache.observe("ns", "a", "Running"));
        cache.forget("ns", "a");
        assert!(cache.is_empty());
        assert!(cache.observe("ns", "a", "Running"));
    }
}
