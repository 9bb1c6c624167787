//! Memo of measured text widths.
//!
//! Every host measurement creates and destroys a throwaway node, so repeated
//! strings (column labels, candidate wrap lines) are worth remembering for
//! the lifetime of a builder. Eviction is by insertion order; lookups do not
//! refresh an entry.

use std::collections::{HashMap, VecDeque};

pub struct WidthCache {
    widths: HashMap<String, f64>,
    order: VecDeque<String>,
    capacity: usize,
    hits: u64,
}

impl WidthCache {
    /// A capacity of 0 disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            widths: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            hits: 0,
        }
    }

    pub fn get(&mut self, text: &str) -> Option<f64> {
        if self.capacity == 0 {
            return None;
        }
        let width = self.widths.get(text).copied();
        if width.is_some() {
            self.hits += 1;
        }
        width
    }

    /// Remember a width. Existing entries keep their first value.
    pub fn insert(&mut self, text: &str, width: f64) {
        if self.capacity == 0 || self.widths.contains_key(text) {
            return;
        }
        self.widths.insert(text.to_string(), width);
        self.order.push_back(text.to_string());
        while self.widths.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.widths.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn remove(&mut self, text: &str) -> Option<f64> {
        let width = self.widths.remove(text)?;
        self.order.retain(|t| t != text);
        Some(width)
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Lookups answered without touching the host
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn clear(&mut self) {
        self.widths.clear();
        self.order.clear();
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get() {
        let mut cache = WidthCache::new(3);
        cache.insert("Name", 30.0);
        cache.insert("Email", 37.5);
        assert_eq!(cache.get("Name"), Some(30.0));
        assert_eq!(cache.get("Phone"), None);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_oldest_evicted_first() {
        let mut cache = WidthCache::new(2);
        cache.insert("a", 1.0);
        cache.insert("b", 2.0);
        cache.insert("c", 3.0);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some(3.0));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let mut cache = WidthCache::new(0);
        cache.insert("a", 1.0);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_first_value_wins() {
        let mut cache = WidthCache::new(3);
        cache.insert("a", 1.0);
        cache.insert("a", 2.0);
        assert_eq!(cache.get("a"), Some(1.0));
        cache.clear();
        assert!(cache.is_empty());
    }
}
