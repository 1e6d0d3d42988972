//! Runtime context that executes reducer effects against injected host services.
//!
//! [`NotifyRuntime`] is an explicit, cloneable handle owned by the embedding application. Every
//! state transition goes through [`reduce_notify`]; this module only runs the resulting effects,
//! consults hooks, and keeps timer and display handles alongside the toasts they belong to.

mod boot;
mod display;
mod effects;
mod mailbox_effects;
mod navigation;

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use leptos::logging;
use notify_host::{
    HostServices, InjectionTarget, ListenerId, MailboxQuery, MailboxService, NotificationService,
    PageService, PushListener, PushService, SessionStore, TaskSpawner, TimerService, ToastId,
    ToastSurface,
};
use serde_json::Value;

use crate::{
    config::NotifyConfig,
    events::{HookDecision, NoopHooks, NotifyEvent, NotifyHooks, QueueChange, QueueOp},
    injection,
    model::{EntryId, Notification, QueuedNotification},
    normalize::normalize_push_payload,
    persistence,
    push_groups::GroupRegistry,
    reducer::{duplicate_of, reduce_notify, NotifyAction, NotifyEffect, NotifyError, NotifyState},
    toast_stack::ToastSlot,
};

pub use navigation::{strip_query_param, targets_page};

#[derive(Clone)]
/// Host service bundle for notification runtime side effects.
pub struct NotifyHostContext {
    services: HostServices,
}

impl Default for NotifyHostContext {
    fn default() -> Self {
        Self::new(notify_host_web::build_host_services())
    }
}

impl NotifyHostContext {
    /// Wraps an injected host service bundle.
    pub fn new(services: HostServices) -> Self {
        Self { services }
    }

    /// Returns the session mirror store.
    pub fn session_store(&self) -> Rc<dyn SessionStore> {
        self.services.session.clone()
    }

    /// Returns the push channel.
    pub fn push_service(&self) -> Rc<dyn PushService> {
        self.services.push.clone()
    }

    /// Returns the mailbox service.
    pub fn mailbox_service(&self) -> Rc<dyn MailboxService> {
        self.services.mailbox.clone()
    }

    /// Returns the native notification service.
    pub fn notification_service(&self) -> Rc<dyn NotificationService> {
        self.services.notifications.clone()
    }

    /// Returns the toast surface.
    pub fn toast_surface(&self) -> Rc<dyn ToastSurface> {
        self.services.surface.clone()
    }

    /// Returns the page injection target.
    pub fn injection_target(&self) -> Rc<dyn InjectionTarget> {
        self.services.injection.clone()
    }

    /// Returns the page/navigation service.
    pub fn page_service(&self) -> Rc<dyn PageService> {
        self.services.page.clone()
    }

    /// Returns the timer service.
    pub fn timer_service(&self) -> Rc<dyn TimerService> {
        self.services.timers.clone()
    }

    /// Returns the local task spawner.
    pub fn task_spawner(&self) -> Rc<dyn TaskSpawner> {
        self.services.spawner.clone()
    }
}

struct RuntimeInner {
    config: NotifyConfig,
    host: NotifyHostContext,
    hooks: Rc<dyn NotifyHooks>,
    state: RefCell<NotifyState>,
    groups: RefCell<GroupRegistry>,
    displays: RefCell<display::DisplayRegistry>,
    injected: RefCell<Option<Notification>>,
    listener: Cell<Option<ListenerId>>,
    started: Cell<bool>,
}

#[derive(Clone)]
/// Cloneable handle to one notification runtime instance.
pub struct NotifyRuntime {
    inner: Rc<RuntimeInner>,
}

#[derive(Clone)]
pub(crate) struct WeakNotifyRuntime {
    inner: Weak<RuntimeInner>,
}

impl WeakNotifyRuntime {
    pub(crate) fn upgrade(&self) -> Option<NotifyRuntime> {
        self.inner.upgrade().map(|inner| NotifyRuntime { inner })
    }
}

impl NotifyRuntime {
    /// Creates a runtime wired to the browser host adapters.
    pub fn in_browser(config: NotifyConfig) -> Self {
        Self::new(config, notify_host_web::build_host_services())
    }

    /// Creates a runtime with no hooks.
    pub fn new(config: NotifyConfig, services: HostServices) -> Self {
        Self::with_hooks(config, services, Rc::new(NoopHooks))
    }

    /// Creates a runtime whose lifecycle is observed and vetoed by `hooks`.
    pub fn with_hooks(
        config: NotifyConfig,
        services: HostServices,
        hooks: Rc<dyn NotifyHooks>,
    ) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                config,
                host: NotifyHostContext::new(services),
                hooks,
                state: RefCell::new(NotifyState::default()),
                groups: RefCell::new(GroupRegistry::new()),
                displays: RefCell::new(display::DisplayRegistry::default()),
                injected: RefCell::new(None),
                listener: Cell::new(None),
                started: Cell::new(false),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NotifyConfig {
        &self.inner.config
    }

    /// Returns the host service bundle.
    pub fn host(&self) -> &NotifyHostContext {
        &self.inner.host
    }

    pub(crate) fn downgrade(&self) -> WeakNotifyRuntime {
        WeakNotifyRuntime {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Boots the runtime: hydrates the session mirror, injects the stored selection, consumes the
    /// notification query parameter, prepares the toast container, requests native permission,
    /// starts listening, and emits [`NotifyEvent::Initialized`]. Later calls are no-ops.
    pub fn start(&self) {
        if self.inner.started.replace(true) {
            return;
        }
        boot::start(self);
    }

    /// Registers the push listener. Calling it twice keeps a single listener.
    pub fn start_listening(&self) {
        if self.inner.listener.get().is_some() {
            return;
        }
        let weak = self.downgrade();
        let listener: PushListener = Rc::new(move |payload: Value| {
            if let Some(runtime) = weak.upgrade() {
                runtime.handle_push_payload(payload);
            }
        });
        let id = self.inner.host.push_service().add_listener(listener);
        self.inner.listener.set(Some(id));
    }

    /// Removes the push listener.
    pub fn stop_listening(&self) {
        if let Some(id) = self.inner.listener.take() {
            self.inner.host.push_service().remove_listener(id);
        }
    }

    /// Returns whether the push listener is registered.
    pub fn is_listening(&self) -> bool {
        self.inner.listener.get().is_some()
    }

    /// Normalizes and receives a raw push payload. Malformed payloads are logged and dropped.
    pub fn handle_push_payload(&self, payload: Value) -> Option<EntryId> {
        match normalize_push_payload(&payload, &self.inner.config) {
            Ok(mut notification) => {
                if notification.time.is_none() {
                    notification.time = Some(notify_host::unix_time_ms_now());
                }
                self.receive(notification).ok()
            }
            Err(err) => {
                self.report_error(format!("dropped push payload: {err}"));
                None
            }
        }
    }

    /// Queues and displays a live notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Cancelled`] when a hook vetoes the update or the duplicate policy
    /// drops it.
    pub fn receive(&self, notification: Notification) -> Result<EntryId, NotifyError> {
        self.accept(notification, true)
    }

    /// Queues a notification without displaying it.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Cancelled`] when a hook vetoes the update or the duplicate policy
    /// drops it.
    pub fn enqueue(&self, notification: Notification) -> Result<EntryId, NotifyError> {
        self.accept(notification, false)
    }

    fn accept(&self, notification: Notification, display: bool) -> Result<EntryId, NotifyError> {
        let duplicate = duplicate_of(&self.inner.state.borrow(), &notification);
        let op = match duplicate {
            Some(_) if self.inner.config.duplicate_policy.is_ignore() => {
                return Err(NotifyError::Cancelled)
            }
            Some(_) => QueueOp::Replaced,
            None => QueueOp::Added,
        };
        self.confirm_queue_change(op, Some(&notification))?;
        let action = if display {
            NotifyAction::Receive(notification)
        } else {
            NotifyAction::Enqueue(notification)
        };
        let effects = {
            let mut state = self.inner.state.borrow_mut();
            reduce_notify(&mut state, &self.inner.config, action)?
        };
        let accepted = effects.iter().find_map(|effect| match effect {
            NotifyEffect::Accepted(entry) => Some(*entry),
            _ => None,
        });
        for effect in effects {
            effects::run_effect(self, effect);
        }
        accepted.ok_or(NotifyError::Cancelled)
    }

    /// Removes the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::EntryNotFound`] or [`NotifyError::Cancelled`].
    pub fn remove_at(&self, index: usize) -> Result<(), NotifyError> {
        let target = self.inner.state.borrow().queue.get_at(index).cloned();
        self.remove_with(target, NotifyAction::RemoveAt { index })
    }

    /// Removes an entry by reference identity.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::EntryNotFound`] or [`NotifyError::Cancelled`].
    pub fn remove_entry(&self, entry: EntryId) -> Result<(), NotifyError> {
        let target = self.inner.state.borrow().queue.get(entry).cloned();
        self.remove_with(target, NotifyAction::RemoveEntry { entry })
    }

    /// Removes the entry matching `notification` (identifier fallback).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::EntryNotFound`] or [`NotifyError::Cancelled`].
    pub fn remove_matching(&self, notification: &Notification) -> Result<(), NotifyError> {
        let target = self
            .inner
            .state
            .borrow()
            .queue
            .iter()
            .find(|queued| queued.notification.same_identity(notification))
            .cloned();
        self.remove_with(target, NotifyAction::RemoveMatching(notification.clone()))
    }

    /// Removes the selected entry.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::EntryNotFound`] or [`NotifyError::Cancelled`].
    pub fn remove_selected(&self) -> Result<(), NotifyError> {
        let target = self.inner.state.borrow().queue.selected().cloned();
        self.remove_with(target, NotifyAction::RemoveSelected)
    }

    fn remove_with(
        &self,
        target: Option<QueuedNotification>,
        action: NotifyAction,
    ) -> Result<(), NotifyError> {
        let target = target.ok_or(NotifyError::EntryNotFound)?;
        self.confirm_queue_change(QueueOp::Removed, Some(&target.notification))?;
        self.dispatch(action)
    }

    /// Removes every entry.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Cancelled`] when a hook vetoes the update.
    pub fn clear(&self) -> Result<(), NotifyError> {
        self.confirm_queue_change(QueueOp::Cleared, None)?;
        self.dispatch(NotifyAction::Clear)
    }

    /// Selects an entry by reference identity.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::AlreadySelected`] or [`NotifyError::EntryNotFound`].
    pub fn select(&self, entry: EntryId) -> Result<(), NotifyError> {
        self.dispatch(NotifyAction::Select { entry })
    }

    /// Selects the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::AlreadySelected`] or [`NotifyError::EntryNotFound`].
    pub fn select_at(&self, index: usize) -> Result<(), NotifyError> {
        self.dispatch(NotifyAction::SelectAt { index })
    }

    /// Selects the entry matching `notification` (identifier fallback).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::AlreadySelected`] or [`NotifyError::EntryNotFound`].
    pub fn select_matching(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.dispatch(NotifyAction::SelectMatching(notification.clone()))
    }

    /// Moves the selection forward and returns the new selection.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::EntryNotFound`] at the end of the queue.
    pub fn select_next(&self) -> Result<QueuedNotification, NotifyError> {
        self.dispatch(NotifyAction::SelectNext)?;
        self.selected().ok_or(NotifyError::EntryNotFound)
    }

    /// Moves the selection backward and returns the new selection.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::EntryNotFound`] at the start of the queue.
    pub fn select_previous(&self) -> Result<QueuedNotification, NotifyError> {
        self.dispatch(NotifyAction::SelectPrevious)?;
        self.selected().ok_or(NotifyError::EntryNotFound)
    }

    /// Returns the entry at `index`.
    pub fn get_at(&self, index: usize) -> Option<QueuedNotification> {
        self.inner.state.borrow().queue.get_at(index).cloned()
    }

    /// Returns the entry after the selection without moving it.
    pub fn next(&self) -> Option<QueuedNotification> {
        self.inner.state.borrow().queue.next().cloned()
    }

    /// Returns the entry before the selection without moving it.
    pub fn previous(&self) -> Option<QueuedNotification> {
        self.inner.state.borrow().queue.previous().cloned()
    }

    /// Returns the oldest entry.
    pub fn oldest(&self) -> Option<QueuedNotification> {
        self.inner.state.borrow().queue.oldest().cloned()
    }

    /// Returns the newest entry.
    pub fn newest(&self) -> Option<QueuedNotification> {
        self.inner.state.borrow().queue.newest().cloned()
    }

    /// Returns the number of queued notifications.
    pub fn count(&self) -> usize {
        self.inner.state.borrow().queue.len()
    }

    /// Returns the selected entry.
    pub fn selected(&self) -> Option<QueuedNotification> {
        self.inner.state.borrow().queue.selected().cloned()
    }

    /// Returns the selected index.
    pub fn selected_index(&self) -> Option<usize> {
        self.inner.state.borrow().queue.selected_index()
    }

    /// Returns a copy of the queue, oldest first.
    pub fn queue_snapshot(&self) -> Vec<QueuedNotification> {
        self.inner.state.borrow().queue.iter().cloned().collect()
    }

    /// Returns every visible toast slot.
    pub fn visible_toasts(&self) -> Vec<ToastSlot> {
        self.inner.state.borrow().toasts.all_visible()
    }

    /// Returns every pending toast.
    pub fn pending_toasts(&self) -> Vec<ToastId> {
        self.inner.state.borrow().toasts.all_pending()
    }

    /// Hides a toast after `delay_ms` (zero hides immediately). A later call replaces an earlier
    /// pending delay.
    pub fn dismiss_toast(&self, id: ToastId, delay_ms: u32) {
        display::dismiss_toast(self, id, delay_ms);
    }

    /// Fetches mailbox records and merges them into the queue with duplicate suppression.
    pub fn fetch_mailbox(&self, query: MailboxQuery) {
        mailbox_effects::fetch(self, query, None);
    }

    /// Joins a broadcast group, deferring until the push channel is ready.
    pub fn join_group(&self, group: &str) {
        let op = self.inner.groups.borrow_mut().join(group);
        if let Some(op) = op {
            mailbox_effects::run_group_op(self, op);
        }
    }

    /// Leaves a broadcast group, cancelling a deferred join.
    pub fn leave_group(&self, group: &str) {
        let op = self.inner.groups.borrow_mut().leave(group);
        if let Some(op) = op {
            mailbox_effects::run_group_op(self, op);
        }
    }

    /// Marks the push channel ready and runs deferred group operations in order.
    pub fn mark_push_ready(&self) {
        let ops = self.inner.groups.borrow_mut().mark_ready();
        for op in ops {
            mailbox_effects::run_group_op(self, op);
        }
    }

    /// Returns whether `group` is joined.
    pub fn is_group_joined(&self, group: &str) -> bool {
        self.inner.groups.borrow().is_joined(group)
    }

    /// Stores `notification` as the selection to inject on the next page load and navigates to
    /// its URL. Returns `false` when it has no URL.
    pub fn redirect_to_notification(&self, notification: &Notification) -> bool {
        let Some(url) = notification.url.clone() else {
            return false;
        };
        let session = self.inner.host.session_store();
        if let Err(err) = persistence::persist_selected(session.as_ref(), Some(notification)) {
            self.report_error(format!("store redirect notification failed: {err}"));
        }
        self.inner.host.page_service().redirect(&url);
        true
    }

    /// Injects the selected notification into marked page elements.
    pub fn inject_selected(&self) -> bool {
        match self.selected() {
            Some(selected) => {
                self.inject_notification(&selected.notification);
                true
            }
            None => false,
        }
    }

    /// Blanks every element written by the last injection.
    pub fn clear_injected(&self) {
        let previous = self.inner.injected.borrow_mut().take();
        if let Some(previous) = previous {
            injection::clear(self.inner.host.injection_target().as_ref(), &previous);
        }
    }

    /// Returns the notification currently injected into the page.
    pub fn injected(&self) -> Option<Notification> {
        self.inner.injected.borrow().clone()
    }

    pub(crate) fn inject_notification(&self, notification: &Notification) {
        self.clear_injected();
        injection::inject(self.inner.host.injection_target().as_ref(), notification);
        *self.inner.injected.borrow_mut() = Some(notification.clone());
    }

    /// Applies an action and runs its effects after releasing the state borrow.
    ///
    /// # Errors
    ///
    /// Returns the reducer error; no effects run in that case.
    pub fn dispatch(&self, action: NotifyAction) -> Result<(), NotifyError> {
        let effects = {
            let mut state = self.inner.state.borrow_mut();
            reduce_notify(&mut state, &self.inner.config, action)?
        };
        for effect in effects {
            effects::run_effect(self, effect);
        }
        Ok(())
    }

    fn confirm_queue_change(
        &self,
        op: QueueOp,
        notification: Option<&Notification>,
    ) -> Result<(), NotifyError> {
        let change = QueueChange {
            op,
            notification: notification.cloned(),
            queue_len: self.count(),
        };
        match self.inner.hooks.before_queue_update(&change) {
            HookDecision::Proceed => Ok(()),
            HookDecision::Cancel => Err(NotifyError::Cancelled),
        }
    }

    pub(crate) fn hooks(&self) -> Rc<dyn NotifyHooks> {
        self.inner.hooks.clone()
    }

    pub(crate) fn emit(&self, event: NotifyEvent) {
        self.inner.hooks.after_event(&event);
    }

    pub(crate) fn report_error(&self, message: String) {
        logging::warn!("{message}");
        self.emit(NotifyEvent::ErrorMessage { message });
    }

    pub(crate) fn state(&self) -> std::cell::Ref<'_, NotifyState> {
        self.inner.state.borrow()
    }

    pub(crate) fn displays(&self) -> &RefCell<display::DisplayRegistry> {
        &self.inner.displays
    }

    pub(crate) fn groups(&self) -> &RefCell<GroupRegistry> {
        &self.inner.groups
    }
}
