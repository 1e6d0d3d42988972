//! Handle to the platform SDK object the embedding page exposes, plus the JS glue the push and
//! mailbox adapters call through.
//!
//! The SDK is expected at `globalThis[SDK_GLOBAL]` with `push` and `mailbox` members:
//!
//! - `push.addListener(fn)` / `push.removeListener(fn)`
//! - `push.joinGroup(name)` / `push.leaveGroup(name)` returning a promise (or nothing)
//! - `push.isReady()` or a boolean `push.ready`
//! - `mailbox.find(query)` resolving to `[{ id, payload }]`
//! - `mailbox.delete(query)` rejecting with `{ status: 404 }` for missing records

/// Global property name the SDK object is looked up under.
pub const SDK_GLOBAL: &str = "notifyPlatform";

#[derive(Debug, Clone, Default)]
/// Possibly-missing reference to an SDK object (or one of its members).
pub struct SdkHandle {
    #[cfg(target_arch = "wasm32")]
    value: Option<wasm_bindgen::JsValue>,
}

impl SdkHandle {
    /// Looks up the SDK object on `globalThis[name]`.
    pub fn from_global(name: &str) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let value = js_sys::Reflect::get(&js_sys::global(), &name.into())
                .ok()
                .filter(|value| !value.is_undefined() && !value.is_null());
            Self { value }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = name;
            Self::default()
        }
    }

    /// Wraps an SDK object obtained by the caller.
    #[cfg(target_arch = "wasm32")]
    pub fn from_value(value: wasm_bindgen::JsValue) -> Self {
        let value = (!value.is_undefined() && !value.is_null()).then_some(value);
        Self { value }
    }

    /// Returns the handle for member `name`, missing if this handle is missing.
    pub fn member(&self, name: &str) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let value = self.value.as_ref().and_then(|object| {
                js_sys::Reflect::get(object, &name.into())
                    .ok()
                    .filter(|value| !value.is_undefined() && !value.is_null())
            });
            Self { value }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = name;
            Self::default()
        }
    }

    /// Returns whether the handle references an object.
    pub fn is_present(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            self.value.is_some()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            false
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub(crate) fn value(&self) -> Option<&wasm_bindgen::JsValue> {
        self.value.as_ref()
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) mod js {
    use js_sys::Promise;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    #[wasm_bindgen(inline_js = r#"
function settle(result) {
  return Promise.resolve(result);
}

export function jsPushAddListener(push, callback) { push.addListener(callback); }
export function jsPushRemoveListener(push, callback) { push.removeListener(callback); }
export function jsPushIsReady(push) {
  if (typeof push.isReady === 'function') { return !!push.isReady(); }
  return !!push.ready;
}
export function jsPushJoinGroup(push, name) { return settle(push.joinGroup(name)); }
export function jsPushLeaveGroup(push, name) { return settle(push.leaveGroup(name)); }
export function jsMailboxFind(mailbox, query) { return settle(mailbox.find(query)); }
export function jsMailboxDelete(mailbox, query) { return settle(mailbox.delete(query)); }
export function jsErrorStatus(err) {
  if (err && typeof err.status === 'number') { return err.status; }
  return 0;
}
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = jsPushAddListener, catch)]
        pub fn push_add_listener(push: &JsValue, callback: &JsValue) -> Result<(), JsValue>;
        #[wasm_bindgen(js_name = jsPushRemoveListener, catch)]
        pub fn push_remove_listener(push: &JsValue, callback: &JsValue) -> Result<(), JsValue>;
        #[wasm_bindgen(js_name = jsPushIsReady)]
        pub fn push_is_ready(push: &JsValue) -> bool;
        #[wasm_bindgen(js_name = jsPushJoinGroup, catch)]
        pub fn push_join_group(push: &JsValue, name: &str) -> Result<Promise, JsValue>;
        #[wasm_bindgen(js_name = jsPushLeaveGroup, catch)]
        pub fn push_leave_group(push: &JsValue, name: &str) -> Result<Promise, JsValue>;
        #[wasm_bindgen(js_name = jsMailboxFind, catch)]
        pub fn mailbox_find(mailbox: &JsValue, query: JsValue) -> Result<Promise, JsValue>;
        #[wasm_bindgen(js_name = jsMailboxDelete, catch)]
        pub fn mailbox_delete(mailbox: &JsValue, query: JsValue) -> Result<Promise, JsValue>;
        #[wasm_bindgen(js_name = jsErrorStatus)]
        pub fn error_status(err: &JsValue) -> u32;
    }

    pub async fn await_promise(promise: Promise) -> Result<JsValue, JsValue> {
        JsFuture::from(promise).await
    }

    pub fn js_error_to_string(err: &JsValue) -> String {
        if let Some(text) = err.as_string() {
            return text;
        }
        if let Ok(message) = js_sys::Reflect::get(err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                return text;
            }
        }
        format!("{err:?}")
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_build_never_finds_the_sdk() {
        let sdk = SdkHandle::from_global(SDK_GLOBAL);
        assert!(!sdk.is_present());
        assert!(!sdk.member("push").is_present());
    }
}
