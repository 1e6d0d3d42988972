//! Typed host-service contracts shared by the notification runtime and its browser adapters.
//!
//! Every collaborator the runtime touches (session storage, push channel, mailbox, native
//! notifications, the toast presentation surface, page injection targets, navigation, timers and
//! task spawning) is an object-safe trait here. Concrete browser adapters live in
//! `notify_host_web`; the in-memory adapters in this crate back tests and non-browser targets.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod inject;
pub mod mailbox;
pub mod notifications;
pub mod page;
pub mod push;
pub mod session;
pub mod spawn;
pub mod surface;
pub mod time;
pub mod timers;

pub use host::{HostServices, MemoryHost};
pub use inject::{ElementKind, InjectionTarget, MarkedElement, MemoryInjectionTarget, RenderedValue};
pub use mailbox::{
    MailRecord, MailboxError, MailboxFuture, MailboxQuery, MailboxService, MemoryMailboxService,
    NoopMailboxService,
};
pub use notifications::{
    MemoryNotificationService, NativeCallbacks, NativeHandle, NativeNotificationRequest,
    NativePermission, NoopNotificationService, NotificationFuture, NotificationService,
};
pub use page::{MemoryPageService, PageService};
pub use push::{ListenerId, MemoryPushService, NoopPushService, PushFuture, PushListener, PushService};
pub use session::{MemorySessionStore, NoopSessionStore, SessionStore};
pub use spawn::{ImmediateSpawner, LocalTask, TaskSpawner};
pub use surface::{
    MemoryToastSurface, SurfaceError, ToastCallbacks, ToastId, ToastPosition, ToastSurface,
    ToastView,
};
pub use time::unix_time_ms_now;
pub use timers::{ManualTimerService, TimerCallback, TimerHandle, TimerService};
