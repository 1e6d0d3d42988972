//! Session-scoped key/value storage contracts and in-memory adapters.
//!
//! Values are opaque strings; callers decide the encoding. The runtime stores base64-wrapped JSON.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Host service for tab-lifetime key/value storage (`sessionStorage` in browsers).
pub trait SessionStore {
    /// Reads a raw value by key.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a raw value by key.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage is unavailable or rejects the write (quota).
    fn set(&self, key: &str, value: &str) -> Result<(), String>;

    /// Removes a value by key. Missing keys are ignored.
    fn remove(&self, key: &str);
}

#[derive(Debug, Clone, Copy, Default)]
/// Session store that keeps nothing, for hosts without session storage.
pub struct NoopSessionStore;

impl SessionStore for NoopSessionStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    fn remove(&self, _key: &str) {}
}

#[derive(Debug, Clone, Default)]
/// In-memory session store. Clones share the same map, which lets tests simulate a page reload
/// by building a second runtime over the same store.
pub struct MemorySessionStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemorySessionStore {
    /// Returns the stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.inner.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_session_store_round_trip_and_remove() {
        let store = MemorySessionStore::default();
        let store_obj: &dyn SessionStore = &store;

        store_obj.set("queue", "W10=").expect("set");
        assert_eq!(store_obj.get("queue"), Some("W10=".to_string()));
        store_obj.remove("queue");
        assert_eq!(store_obj.get("queue"), None);
    }

    #[test]
    fn memory_session_store_clones_share_state() {
        let store = MemorySessionStore::default();
        let reloaded = store.clone();
        store.set("a", "1").expect("set");
        store.set("b", "2").expect("set");

        assert_eq!(reloaded.get("a"), Some("1".to_string()));
        assert_eq!(reloaded.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn noop_session_store_is_empty_and_successful() {
        let store = NoopSessionStore;
        store.set("k", "v").expect("set");
        assert_eq!(store.get("k"), None);
        store.remove("k");
    }
}
