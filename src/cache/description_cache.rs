use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::core::Register;
use crate::rdf::Iri;

/// Cache capability for register descriptions keyed by URI.
pub trait DescriptionCache: Send + Sync {
    fn get(&self, uri: &Iri) -> Option<Register>;

    fn put(&self, register: Register);

    fn invalidate(&self, uri: &Iri);

    fn clear(&self);
}

#[derive(Debug, Default)]
struct LruState {
    entries: HashMap<Iri, Register>,
    /// Least recently used first.
    order: VecDeque<Iri>,
}

impl LruState {
    fn touch(&mut self, uri: &Iri) {
        if let Some(pos) = self.order.iter().position(|u| u == uri) {
            self.order.remove(pos);
        }
        self.order.push_back(uri.clone());
    }
}

/// Bounded least-recently-used cache. A capacity of 0 stores nothing.
#[derive(Debug)]
pub struct LruDescriptionCache {
    capacity: usize,
    state: Mutex<LruState>,
}

impl LruDescriptionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(LruState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DescriptionCache for LruDescriptionCache {
    fn get(&self, uri: &Iri) -> Option<Register> {
        let mut state = self.state.lock();
        let found = state.entries.get(uri).cloned();
        if found.is_some() {
            state.touch(uri);
        }
        found
    }

    fn put(&self, register: Register) {
        if self.capacity == 0 {
            return;
        }
        let Some(uri) = register.uri().cloned() else {
            return;
        };
        let mut state = self.state.lock();
        state.touch(&uri);
        state.entries.insert(uri, register);
        while state.entries.len() > self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
        }
    }

    fn invalidate(&self, uri: &Iri) {
        let mut state = self.state.lock();
        if state.entries.remove(uri).is_some() {
            state.order.retain(|u| u != uri);
        }
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Description;
    use crate::rdf::Graph;

    fn register(uri: &str) -> Register {
        Register::new(Description::new(Iri::new(uri).unwrap(), Graph::new()))
    }

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = LruDescriptionCache::new(2);
        cache.put(register("http://example.com/a"));
        cache.put(register("http://example.com/b"));
        assert!(cache.get(&iri("http://example.com/a")).is_some());
        cache.put(register("http://example.com/c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&iri("http://example.com/b")).is_none());
        assert!(cache.get(&iri("http://example.com/a")).is_some());
        assert!(cache.get(&iri("http://example.com/c")).is_some());
    }

    #[test]
    fn test_zero_capacity_disables() {
        let cache = LruDescriptionCache::new(0);
        cache.put(register("http://example.com/a"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = LruDescriptionCache::new(4);
        cache.put(register("http://example.com/a"));
        cache.put(register("http://example.com/b"));
        cache.invalidate(&iri("http://example.com/a"));
        assert!(cache.get(&iri("http://example.com/a")).is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
