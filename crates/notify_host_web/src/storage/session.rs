//! `sessionStorage`-backed store for the tab-lifetime queue mirror.

use notify_host::SessionStore;

#[derive(Debug, Clone, Copy, Default)]
/// Session store backed by `window.sessionStorage`.
pub struct WebSessionStore;

#[cfg(target_arch = "wasm32")]
fn session_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.session_storage().ok().flatten()
}

impl SessionStore for WebSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            session_storage()?.get_item(key).ok().flatten()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = session_storage().ok_or_else(|| "sessionStorage unavailable".to_string())?;
            storage
                .set_item(key, value)
                .map_err(|e| format!("sessionStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, value);
            Ok(())
        }
    }

    fn remove(&self, key: &str) {
        #[cfg(target_arch = "wasm32")]
        if let Some(storage) = session_storage() {
            let _ = storage.remove_item(key);
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = key;
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_build_is_empty_and_accepts_writes() {
        let store = WebSessionStore;
        assert!(store.set("k", "v").is_ok());
        assert_eq!(store.get("k"), None);
        store.remove("k");
    }
}
