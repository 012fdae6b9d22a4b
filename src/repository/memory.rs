// SPDX-License-Identifier: MPL-2.0

use std::collections::{HashMap, VecDeque};

/// Simple LRU cache using a HashMap + access order tracking
pub struct LruCache<V> {
    map: HashMap<String, V>,
    order: VecDeque<String>, // Most recently used at the back
    capacity: usize,
}

impl<V: Clone> LruCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        let value = self.map.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    pub fn insert(&mut self, key: String, value: V) {
        // Evict oldest if at capacity
        if !self.map.contains_key(&key) {
            while self.map.len() >= self.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.map.remove(&oldest);
            }
        }

        self.map.insert(key.clone(), value);
        self.touch(&key);
    }

    /// Apply `f` to a cached value in place; returns false on a miss
    pub fn update<F: FnOnce(&mut V)>(&mut self, key: &str, f: F) -> bool {
        match self.map.get_mut(key) {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.order.retain(|k| k != key);
        self.map.remove(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
    }
}
