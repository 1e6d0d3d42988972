//! Leptos context wiring for a [`NotifyRuntime`].

use leptos::{provide_context, use_context};

use crate::host::NotifyRuntime;

/// Provides `runtime` to descendant components.
pub fn provide_notify_runtime(runtime: NotifyRuntime) {
    provide_context(runtime);
}

/// Returns the provided [`NotifyRuntime`], if any.
pub fn try_use_notify_runtime() -> Option<NotifyRuntime> {
    use_context::<NotifyRuntime>()
}

/// Returns the provided [`NotifyRuntime`].
///
/// # Panics
///
/// Panics if called outside a component tree where [`provide_notify_runtime`] ran.
pub fn use_notify_runtime() -> NotifyRuntime {
    try_use_notify_runtime().expect("NotifyRuntime not provided")
}
