//! Notification queue, selection, and toast stacking runtime.
//!
//! Live push payloads and mailbox records are normalized into [`Notification`]s, kept in an
//! insertion-ordered [`NotificationQueue`] with a single weakly-referenced selection, and shown as
//! native desktop notifications or stacked in-page toasts. All transitions go through
//! [`reduce_notify`]; [`NotifyRuntime`] executes the resulting effects against injected
//! [`notify_host::HostServices`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod context;
pub mod events;
pub mod host;
pub mod injection;
pub mod model;
pub mod normalize;
pub mod persistence;
pub mod push_groups;
pub mod queue;
pub mod reducer;
pub mod toast_stack;

pub use config::{
    AutoHide, AutoSelect, CloseButtonConfig, ConfigError, DuplicatePolicy, NativeConfig,
    NotifyConfig, NotifyConfigBuilder, StackLimit, ToastConfig,
};
pub use context::{provide_notify_runtime, try_use_notify_runtime, use_notify_runtime};
pub use events::{
    DisplayKind, HookDecision, NoopHooks, NotifyEvent, NotifyHooks, QueueChange, QueueOp,
};
pub use host::{NotifyHostContext, NotifyRuntime};
pub use model::{EntryId, Notification, NotificationId, NotificationOrigin, QueuedNotification};
pub use normalize::{normalize_mail_record, normalize_push_payload, NormalizeError};
pub use persistence::PersistenceError;
pub use push_groups::{GroupOp, GroupRegistry};
pub use queue::{NotificationQueue, RemovedEntry};
pub use reducer::{reduce_notify, NotifyAction, NotifyEffect, NotifyError, NotifyState};
pub use toast_stack::{ToastCommand, ToastLane, ToastPhase, ToastSlot, ToastStack};
