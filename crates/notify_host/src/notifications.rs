//! Native (OS desktop) notification contracts and adapters.

use std::{
    cell::{Cell, RefCell},
    fmt,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`NotificationService`].
pub type NotificationFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Native notification permission state.
pub enum NativePermission {
    /// The user has not decided yet.
    Default,
    /// Notifications may be shown.
    Granted,
    /// The user refused; the runtime never asks again.
    Denied,
    /// The host has no native notification support.
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Runtime-assigned handle for one native notification.
pub struct NativeHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Content of a native notification.
pub struct NativeNotificationRequest {
    /// Notification title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Optional icon URL.
    pub icon: Option<String>,
}

#[derive(Clone)]
/// Lifecycle callbacks attached to a native notification.
pub struct NativeCallbacks {
    /// Invoked when the user clicks the notification.
    pub on_click: Rc<dyn Fn()>,
    /// Invoked when the notification closes for any reason.
    pub on_close: Rc<dyn Fn()>,
    /// Invoked once the notification is actually on screen.
    pub on_show: Rc<dyn Fn()>,
}

impl fmt::Debug for NativeCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCallbacks").finish_non_exhaustive()
    }
}

/// Host service for native desktop notifications.
pub trait NotificationService {
    /// Returns the current permission state.
    fn permission(&self) -> NativePermission;

    /// Asks the user for permission and resolves with the outcome.
    fn request_permission<'a>(&'a self) -> NotificationFuture<'a, Result<NativePermission, String>>;

    /// Shows a notification under `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host refuses to construct the notification.
    fn show(
        &self,
        handle: NativeHandle,
        request: &NativeNotificationRequest,
        callbacks: NativeCallbacks,
    ) -> Result<(), String>;

    /// Closes a shown notification. Unknown handles are ignored.
    fn close(&self, handle: NativeHandle);
}

#[derive(Debug, Clone, Copy, Default)]
/// Notification service for hosts without native notifications.
pub struct NoopNotificationService;

impl NotificationService for NoopNotificationService {
    fn permission(&self) -> NativePermission {
        NativePermission::Unsupported
    }

    fn request_permission<'a>(&'a self) -> NotificationFuture<'a, Result<NativePermission, String>> {
        Box::pin(async { Ok(NativePermission::Unsupported) })
    }

    fn show(
        &self,
        _handle: NativeHandle,
        _request: &NativeNotificationRequest,
        _callbacks: NativeCallbacks,
    ) -> Result<(), String> {
        Err("native notifications unsupported".to_string())
    }

    fn close(&self, _handle: NativeHandle) {}
}

struct ShownNative {
    handle: NativeHandle,
    request: NativeNotificationRequest,
    callbacks: NativeCallbacks,
}

struct MemoryNotificationInner {
    permission: Cell<NativePermission>,
    answer: Cell<NativePermission>,
    permission_requests: Cell<u32>,
    shown: RefCell<Vec<ShownNative>>,
    closed: RefCell<Vec<NativeHandle>>,
}

#[derive(Clone)]
/// Recording native notification service for tests. Clones share state.
pub struct MemoryNotificationService {
    inner: Rc<MemoryNotificationInner>,
}

impl Default for MemoryNotificationService {
    fn default() -> Self {
        Self::with_permission(NativePermission::Default)
    }
}

impl MemoryNotificationService {
    /// Creates a service reporting `permission`; permission requests are answered with `Granted`.
    pub fn with_permission(permission: NativePermission) -> Self {
        Self {
            inner: Rc::new(MemoryNotificationInner {
                permission: Cell::new(permission),
                answer: Cell::new(NativePermission::Granted),
                permission_requests: Cell::new(0),
                shown: RefCell::new(Vec::new()),
                closed: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Sets the answer returned by the next permission request.
    pub fn answer_requests_with(&self, answer: NativePermission) {
        self.inner.answer.set(answer);
    }

    /// Returns how many times permission was requested.
    pub fn permission_requests(&self) -> u32 {
        self.inner.permission_requests.get()
    }

    /// Returns shown notifications that have not been closed.
    pub fn open(&self) -> Vec<(NativeHandle, NativeNotificationRequest)> {
        let closed = self.inner.closed.borrow();
        self.inner
            .shown
            .borrow()
            .iter()
            .filter(|shown| !closed.contains(&shown.handle))
            .map(|shown| (shown.handle, shown.request.clone()))
            .collect()
    }

    /// Returns closed handles in close order.
    pub fn closed(&self) -> Vec<NativeHandle> {
        self.inner.closed.borrow().clone()
    }

    /// Simulates the host reporting the notification as displayed.
    pub fn simulate_show(&self, handle: NativeHandle) {
        if let Some(callbacks) = self.callbacks(handle) {
            (callbacks.on_show)();
        }
    }

    /// Simulates a user click.
    pub fn simulate_click(&self, handle: NativeHandle) {
        if let Some(callbacks) = self.callbacks(handle) {
            (callbacks.on_click)();
        }
    }

    fn callbacks(&self, handle: NativeHandle) -> Option<NativeCallbacks> {
        self.inner
            .shown
            .borrow()
            .iter()
            .find(|shown| shown.handle == handle)
            .map(|shown| shown.callbacks.clone())
    }
}

impl NotificationService for MemoryNotificationService {
    fn permission(&self) -> NativePermission {
        self.inner.permission.get()
    }

    fn request_permission<'a>(&'a self) -> NotificationFuture<'a, Result<NativePermission, String>> {
        Box::pin(async move {
            self.inner
                .permission_requests
                .set(self.inner.permission_requests.get() + 1);
            let answer = self.inner.answer.get();
            self.inner.permission.set(answer);
            Ok(answer)
        })
    }

    fn show(
        &self,
        handle: NativeHandle,
        request: &NativeNotificationRequest,
        callbacks: NativeCallbacks,
    ) -> Result<(), String> {
        if self.inner.permission.get() != NativePermission::Granted {
            return Err("native notification permission not granted".to_string());
        }
        self.inner.shown.borrow_mut().push(ShownNative {
            handle,
            request: request.clone(),
            callbacks,
        });
        Ok(())
    }

    fn close(&self, handle: NativeHandle) {
        if self.inner.closed.borrow().contains(&handle) {
            return;
        }
        let Some(callbacks) = self.callbacks(handle) else {
            return;
        };
        self.inner.closed.borrow_mut().push(handle);
        (callbacks.on_close)();
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    fn callbacks(log: Rc<RefCell<Vec<&'static str>>>) -> NativeCallbacks {
        let click = log.clone();
        let close = log.clone();
        NativeCallbacks {
            on_click: Rc::new(move || click.borrow_mut().push("click")),
            on_close: Rc::new(move || close.borrow_mut().push("close")),
            on_show: Rc::new(move || log.borrow_mut().push("show")),
        }
    }

    fn request() -> NativeNotificationRequest {
        NativeNotificationRequest {
            title: "Inbox".to_string(),
            body: "Build finished".to_string(),
            icon: None,
        }
    }

    #[test]
    fn show_requires_granted_permission() {
        let service = MemoryNotificationService::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        assert!(service
            .show(NativeHandle(1), &request(), callbacks(log.clone()))
            .is_err());

        assert_eq!(
            block_on(service.request_permission()).expect("request"),
            NativePermission::Granted
        );
        service
            .show(NativeHandle(1), &request(), callbacks(log))
            .expect("show");
        assert_eq!(service.open().len(), 1);
        assert_eq!(service.permission_requests(), 1);
    }

    #[test]
    fn close_fires_on_close_once() {
        let service = MemoryNotificationService::with_permission(NativePermission::Granted);
        let log = Rc::new(RefCell::new(Vec::new()));
        service
            .show(NativeHandle(7), &request(), callbacks(log.clone()))
            .expect("show");

        service.simulate_show(NativeHandle(7));
        service.simulate_click(NativeHandle(7));
        service.close(NativeHandle(7));
        service.close(NativeHandle(7));

        assert_eq!(*log.borrow(), vec!["show", "click", "close"]);
        assert_eq!(service.closed(), vec![NativeHandle(7)]);
        assert!(service.open().is_empty());
    }

    #[test]
    fn noop_service_is_unsupported() {
        let service = NoopNotificationService;
        assert_eq!(service.permission(), NativePermission::Unsupported);
        assert_eq!(
            block_on(service.request_permission()).expect("request"),
            NativePermission::Unsupported
        );
    }
}
