//! Host service bundle injected into the notification runtime.

use std::rc::Rc;

use crate::{
    ImmediateSpawner, InjectionTarget, MailboxService, ManualTimerService,
    MemoryInjectionTarget, MemoryMailboxService, MemoryNotificationService, MemoryPageService,
    MemoryPushService, MemorySessionStore, MemoryToastSurface, NotificationService, PageService,
    PushService, SessionStore, TaskSpawner, TimerService, ToastSurface,
};

/// Runtime-selected host service bundle.
///
/// All environment-specific adapter selection happens before this bundle reaches the runtime,
/// which keeps the runtime free of browser types.
#[derive(Clone)]
pub struct HostServices {
    /// Tab-lifetime storage for the queue mirror.
    pub session: Rc<dyn SessionStore>,
    /// External push/broadcast channel.
    pub push: Rc<dyn PushService>,
    /// Persistent mailbox.
    pub mailbox: Rc<dyn MailboxService>,
    /// Native desktop notifications.
    pub notifications: Rc<dyn NotificationService>,
    /// Toast presentation surface.
    pub surface: Rc<dyn ToastSurface>,
    /// Marked page elements for data injection.
    pub injection: Rc<dyn InjectionTarget>,
    /// Page location and navigation.
    pub page: Rc<dyn PageService>,
    /// One-shot timers.
    pub timers: Rc<dyn TimerService>,
    /// Fire-and-forget async work.
    pub spawner: Rc<dyn TaskSpawner>,
}

/// Concrete in-memory adapters behind a [`HostServices`] bundle, kept for test inspection.
#[derive(Clone, Default)]
pub struct MemoryHost {
    /// Session store.
    pub session: MemorySessionStore,
    /// Push channel.
    pub push: MemoryPushService,
    /// Mailbox.
    pub mailbox: MemoryMailboxService,
    /// Native notifications.
    pub notifications: MemoryNotificationService,
    /// Toast surface.
    pub surface: MemoryToastSurface,
    /// Injection target.
    pub injection: MemoryInjectionTarget,
    /// Page location.
    pub page: MemoryPageService,
    /// Virtual clock.
    pub timers: ManualTimerService,
}

impl MemoryHost {
    /// Builds a bundle whose services share state with these adapters.
    pub fn services(&self) -> HostServices {
        HostServices {
            session: Rc::new(self.session.clone()),
            push: Rc::new(self.push.clone()),
            mailbox: Rc::new(self.mailbox.clone()),
            notifications: Rc::new(self.notifications.clone()),
            surface: Rc::new(self.surface.clone()),
            injection: Rc::new(self.injection.clone()),
            page: Rc::new(self.page.clone()),
            timers: Rc::new(self.timers.clone()),
            spawner: Rc::new(ImmediateSpawner::default()),
        }
    }
}
