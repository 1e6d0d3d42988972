//! Browser (`wasm32`) implementations of [`notify_host`] service contracts.
//!
//! Every adapter compiles on all targets. Outside `wasm32` they degrade to inert behavior
//! (empty reads, successful no-op writes, unsupported native notifications) so the runtime can be
//! built and exercised natively.
//!
//! The push and mailbox adapters wrap the platform SDK object that the embedding page exposes on
//! `globalThis` (see [`sdk::SDK_GLOBAL`]).

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Adapter factories used to wire the runtime to the browser.
pub mod adapters;
pub mod inject;
pub mod mailbox;
pub mod notifications;
pub mod page;
pub mod push;
pub mod sdk;
pub mod spawn;
pub mod storage;
pub mod timers;
pub mod toast;

pub use adapters::{
    build_host_services, build_host_services_with_sdk, mailbox_service, push_service,
};
pub use inject::WebInjectionTarget;
pub use mailbox::JsMailboxService;
pub use notifications::WebNotificationService;
pub use page::WebPageService;
pub use push::JsPushService;
pub use sdk::{SdkHandle, SDK_GLOBAL};
pub use spawn::WebTaskSpawner;
pub use storage::session::WebSessionStore;
pub use timers::WebTimerService;
pub use toast::{WebToastSurface, TOAST_CONTAINER_ID, TOAST_START_OFFSET};
