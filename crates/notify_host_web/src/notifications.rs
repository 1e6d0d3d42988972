//! Native notification adapter backed by the Web Notifications API.

use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, collections::HashMap};

use notify_host::{
    NativeCallbacks, NativeHandle, NativeNotificationRequest, NativePermission, NotificationFuture,
    NotificationService,
};

#[cfg(target_arch = "wasm32")]
struct ShownNotification {
    notification: web_sys::Notification,
    handlers: [wasm_bindgen::closure::Closure<dyn FnMut()>; 3],
}

#[derive(Default)]
struct WebNotificationInner {
    #[cfg(target_arch = "wasm32")]
    shown: RefCell<HashMap<NativeHandle, ShownNotification>>,
}

#[derive(Clone, Default)]
/// Browser notification service. Clones share the set of open notifications.
pub struct WebNotificationService {
    inner: Rc<WebNotificationInner>,
}

#[cfg(target_arch = "wasm32")]
fn supported() -> bool {
    web_sys::window().is_some_and(|window| {
        js_sys::Reflect::has(&window, &wasm_bindgen::JsValue::from_str("Notification"))
            .unwrap_or(false)
    })
}

#[cfg(target_arch = "wasm32")]
fn map_permission(permission: web_sys::NotificationPermission) -> NativePermission {
    match permission {
        web_sys::NotificationPermission::Granted => NativePermission::Granted,
        web_sys::NotificationPermission::Denied => NativePermission::Denied,
        web_sys::NotificationPermission::Default => NativePermission::Default,
        _ => NativePermission::Unsupported,
    }
}

impl NotificationService for WebNotificationService {
    fn permission(&self) -> NativePermission {
        #[cfg(target_arch = "wasm32")]
        {
            if !supported() {
                return NativePermission::Unsupported;
            }
            map_permission(web_sys::Notification::permission())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            NativePermission::Unsupported
        }
    }

    fn request_permission<'a>(&'a self) -> NotificationFuture<'a, Result<NativePermission, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                if !supported() {
                    return Ok(NativePermission::Unsupported);
                }
                let promise = web_sys::Notification::request_permission()
                    .map_err(|err| format!("permission request failed: {err:?}"))?;
                wasm_bindgen_futures::JsFuture::from(promise)
                    .await
                    .map_err(|err| format!("permission request failed: {err:?}"))?;
                Ok(map_permission(web_sys::Notification::permission()))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Ok(NativePermission::Unsupported)
            }
        })
    }

    fn show(
        &self,
        handle: NativeHandle,
        request: &NativeNotificationRequest,
        callbacks: NativeCallbacks,
    ) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{closure::Closure, JsCast, JsValue};

            if !supported() {
                return Err("native notifications unsupported".to_string());
            }
            let options = web_sys::NotificationOptions::new();
            options.set_body(&request.body);
            if let Some(icon) = &request.icon {
                options.set_icon(icon);
            }
            let notification = web_sys::Notification::new_with_options(&request.title, &options)
                .map_err(|err: JsValue| format!("notification dispatch failed: {err:?}"))?;

            let on_click = callbacks.on_click.clone();
            let click = Closure::<dyn FnMut()>::wrap(Box::new(move || on_click()));
            let on_show = callbacks.on_show.clone();
            let show = Closure::<dyn FnMut()>::wrap(Box::new(move || on_show()));
            let inner = Rc::downgrade(&self.inner);
            let on_close = callbacks.on_close;
            let close = Closure::<dyn FnMut()>::wrap(Box::new(move || {
                // Unregister before notifying so a re-entrant close is a no-op.
                if let Some(inner) = inner.upgrade() {
                    if let Some(shown) = inner.shown.borrow_mut().remove(&handle) {
                        forget_handlers(shown);
                    }
                }
                on_close();
            }));
            notification.set_onclick(Some(click.as_ref().unchecked_ref()));
            notification.set_onshow(Some(show.as_ref().unchecked_ref()));
            notification.set_onclose(Some(close.as_ref().unchecked_ref()));

            self.inner.shown.borrow_mut().insert(
                handle,
                ShownNotification {
                    notification,
                    handlers: [click, show, close],
                },
            );
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (handle, request, callbacks);
            Err("native notifications unsupported".to_string())
        }
    }

    fn close(&self, handle: NativeHandle) {
        #[cfg(target_arch = "wasm32")]
        {
            let notification = self
                .inner
                .shown
                .borrow()
                .get(&handle)
                .map(|shown| shown.notification.clone());
            // `onclose` fires from here and unregisters the handle.
            if let Some(notification) = notification {
                notification.close();
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = handle;
    }
}

#[cfg(target_arch = "wasm32")]
fn forget_handlers(shown: ShownNotification) {
    // A closure may not be dropped while it is running.
    let ShownNotification {
        notification,
        handlers,
    } = shown;
    notification.set_onclick(None);
    notification.set_onshow(None);
    for handler in handlers {
        handler.forget();
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn native_build_reports_unsupported() {
        let service = WebNotificationService::default();
        assert_eq!(service.permission(), NativePermission::Unsupported);
        assert_eq!(
            block_on(service.request_permission()),
            Ok(NativePermission::Unsupported)
        );
        let callbacks = NativeCallbacks {
            on_click: Rc::new(|| {}),
            on_close: Rc::new(|| {}),
            on_show: Rc::new(|| {}),
        };
        let request = NativeNotificationRequest {
            title: "Inbox".to_string(),
            body: "hello".to_string(),
            icon: None,
        };
        assert!(service.show(NativeHandle(1), &request, callbacks).is_err());
    }
}
