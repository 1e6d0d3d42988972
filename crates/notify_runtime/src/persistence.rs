//! Session-scoped mirror of the queue and the selected notification.
//!
//! Values are base64-encoded JSON so they survive storage layers that mangle raw JSON.

use base64::{engine::general_purpose::STANDARD, Engine};
use notify_host::SessionStore;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::model::Notification;

/// Session key holding the mirrored queue.
pub const QUEUE_KEY: &str = "notify.queue.v1";
/// Session key holding the notification to inject on the next page load.
pub const SELECTED_KEY: &str = "notify.selected.v1";

#[derive(Debug, Error)]
/// Session mirror encode/decode failures.
pub enum PersistenceError {
    /// The stored value is not valid base64.
    #[error("stored value is not base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded value is not valid UTF-8.
    #[error("stored value is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// The JSON could not be encoded or decoded.
    #[error("stored value is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    /// The session store rejected the write.
    #[error("session write failed: {0}")]
    Write(String),
}

/// Encodes a value as base64(JSON).
///
/// # Errors
///
/// Returns [`PersistenceError::Json`] if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<String, PersistenceError> {
    Ok(STANDARD.encode(serde_json::to_vec(value)?))
}

/// Decodes a base64(JSON) value.
///
/// # Errors
///
/// Returns the first decoding stage that failed.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, PersistenceError> {
    let bytes = STANDARD.decode(raw.trim())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

/// Mirrors the queue; an empty queue removes the key.
///
/// # Errors
///
/// Returns encode or session write failures.
pub fn persist_queue(
    store: &dyn SessionStore,
    queue: &[Notification],
) -> Result<(), PersistenceError> {
    if queue.is_empty() {
        store.remove(QUEUE_KEY);
        return Ok(());
    }
    store
        .set(QUEUE_KEY, &encode(&queue)?)
        .map_err(PersistenceError::Write)
}

/// Mirrors the selection; `None` removes the key.
///
/// # Errors
///
/// Returns encode or session write failures.
pub fn persist_selected(
    store: &dyn SessionStore,
    selected: Option<&Notification>,
) -> Result<(), PersistenceError> {
    let Some(selected) = selected else {
        store.remove(SELECTED_KEY);
        return Ok(());
    };
    store
        .set(SELECTED_KEY, &encode(selected)?)
        .map_err(PersistenceError::Write)
}

/// Loads the mirrored queue. Missing keys yield `None`; corrupt values are logged and yield `None`.
pub fn load_queue(store: &dyn SessionStore) -> Option<Vec<Notification>> {
    load(store, QUEUE_KEY)
}

/// Loads the mirrored selection. Missing keys yield `None`; corrupt values are logged and yield
/// `None`.
pub fn load_selected(store: &dyn SessionStore) -> Option<Notification> {
    load(store, SELECTED_KEY)
}

fn load<T: DeserializeOwned>(store: &dyn SessionStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match decode(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            leptos::logging::warn!("session mirror `{key}` unreadable: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use notify_host::MemorySessionStore;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn queue_mirror_is_base64_json() {
        let store = MemorySessionStore::default();
        let queue = vec![Notification::new("a", "b").with_id("1")];
        persist_queue(&store, &queue).expect("persist");

        let raw = store.get(QUEUE_KEY).expect("stored");
        assert!(!raw.contains('{'));
        assert_eq!(load_queue(&store), Some(queue));
    }

    #[test]
    fn empty_queue_and_no_selection_remove_keys() {
        let store = MemorySessionStore::default();
        persist_queue(&store, &[Notification::new("a", "b")]).expect("persist");
        persist_selected(&store, Some(&Notification::new("a", "b"))).expect("persist");

        persist_queue(&store, &[]).expect("persist");
        persist_selected(&store, None).expect("persist");

        assert_eq!(store.get(QUEUE_KEY), None);
        assert_eq!(store.get(SELECTED_KEY), None);
    }

    #[test]
    fn corrupt_values_load_as_none() {
        let store = MemorySessionStore::default();
        store.set(QUEUE_KEY, "%%% not base64").expect("set");
        store
            .set(SELECTED_KEY, &STANDARD.encode("{ broken json"))
            .expect("set");
        assert_eq!(load_queue(&store), None);
        assert_eq!(load_selected(&store), None);
    }

    #[test]
    fn selection_round_trips() {
        let store = MemorySessionStore::default();
        let selected = Notification::new("s", "d").with_url("https://a.test/x");
        persist_selected(&store, Some(&selected)).expect("persist");
        assert_eq!(load_selected(&store), Some(selected));
    }
}
