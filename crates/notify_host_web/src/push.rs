//! Push channel adapter wrapping the platform SDK's `push` member.

use std::{cell::Cell, rc::Rc};

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;

use notify_host::{ListenerId, PushFuture, PushListener, PushService};

use crate::sdk::SdkHandle;

#[cfg(target_arch = "wasm32")]
type JsListener = wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>;

#[derive(Default)]
struct PushInner {
    next_listener: Cell<u64>,
    #[cfg(target_arch = "wasm32")]
    listeners: RefCell<Vec<(ListenerId, JsListener)>>,
}

#[derive(Clone)]
/// Push service backed by the SDK's push client. A missing SDK behaves like a silent channel.
pub struct JsPushService {
    push: SdkHandle,
    inner: Rc<PushInner>,
}

impl JsPushService {
    /// Wraps the `push` member of `sdk`.
    pub fn new(sdk: &SdkHandle) -> Self {
        Self {
            push: sdk.member("push"),
            inner: Rc::new(PushInner::default()),
        }
    }

    fn allocate(&self) -> ListenerId {
        let next = self.inner.next_listener.get() + 1;
        self.inner.next_listener.set(next);
        ListenerId(next)
    }
}

impl PushService for JsPushService {
    fn add_listener(&self, listener: PushListener) -> ListenerId {
        let id = self.allocate();

        #[cfg(target_arch = "wasm32")]
        if let Some(push) = self.push.value() {
            use wasm_bindgen::JsCast;

            let callback: JsListener = wasm_bindgen::closure::Closure::wrap(Box::new(
                move |raw: wasm_bindgen::JsValue| {
                    match serde_wasm_bindgen::from_value::<serde_json::Value>(raw) {
                        Ok(payload) => listener(payload),
                        // Non-JSON payloads still reach the runtime so they are reported.
                        Err(_) => listener(serde_json::Value::Null),
                    }
                },
            )
                as Box<dyn FnMut(wasm_bindgen::JsValue)>);
            if crate::sdk::js::push_add_listener(push, callback.as_ref().unchecked_ref()).is_ok() {
                self.inner.listeners.borrow_mut().push((id, callback));
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = listener;

        id
    }

    fn remove_listener(&self, id: ListenerId) {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;

            let removed = {
                let mut listeners = self.inner.listeners.borrow_mut();
                listeners
                    .iter()
                    .position(|(candidate, _)| *candidate == id)
                    .map(|index| listeners.remove(index))
            };
            if let (Some(push), Some((_, callback))) = (self.push.value(), removed) {
                let _ = crate::sdk::js::push_remove_listener(push, callback.as_ref().unchecked_ref());
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = id;
    }

    fn is_ready(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            self.push.value().is_some_and(crate::sdk::js::push_is_ready)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            false
        }
    }

    fn join_group<'a>(&'a self, group: &'a str) -> PushFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use crate::sdk::js;

                let push = self
                    .push
                    .value()
                    .ok_or_else(|| "push client unavailable".to_string())?;
                let promise = js::push_join_group(push, group).map_err(|e| js::js_error_to_string(&e))?;
                js::await_promise(promise)
                    .await
                    .map(|_| ())
                    .map_err(|e| format!("join group `{group}` failed: {}", js::js_error_to_string(&e)))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = group;
                Err("push client unavailable".to_string())
            }
        })
    }

    fn leave_group<'a>(&'a self, group: &'a str) -> PushFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use crate::sdk::js;

                let push = self
                    .push
                    .value()
                    .ok_or_else(|| "push client unavailable".to_string())?;
                let promise = js::push_leave_group(push, group).map_err(|e| js::js_error_to_string(&e))?;
                js::await_promise(promise)
                    .await
                    .map(|_| ())
                    .map_err(|e| format!("leave group `{group}` failed: {}", js::js_error_to_string(&e)))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = group;
                Err("push client unavailable".to_string())
            }
        })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn missing_sdk_is_never_ready_and_rejects_groups() {
        let push = JsPushService::new(&SdkHandle::default());
        let first = push.add_listener(Rc::new(|_| {}));
        let second = push.add_listener(Rc::new(|_| {}));

        assert_ne!(first, second);
        assert!(!push.is_ready());
        assert!(block_on(push.join_group("ops")).is_err());
        push.remove_listener(first);
    }
}
