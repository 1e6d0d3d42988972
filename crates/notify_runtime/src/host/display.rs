//! Display path: native notifications, toast mounting, toast timelines, and click handling.

use std::{collections::HashMap, rc::Rc};

use notify_host::{
    NativeCallbacks, NativeHandle, NativeNotificationRequest, NativePermission, SurfaceError,
    TimerHandle, ToastCallbacks, ToastId, ToastPosition, ToastView,
};

use crate::{
    events::{DisplayKind, NotifyEvent},
    host::NotifyRuntime,
    model::{EntryId, Notification, QueuedNotification},
    reducer::NotifyAction,
    toast_stack::{ToastCommand, TOAST_SETTLE_MS},
};

/// Delay before retrying a toast while the page body is unavailable.
pub(crate) const SURFACE_RETRY_MS: u32 = 50;

#[derive(Default)]
struct ToastTimers {
    dismiss: Option<TimerHandle>,
    settle: Option<TimerHandle>,
    auto_hide: Option<TimerHandle>,
}

impl ToastTimers {
    fn take_all(&mut self) -> Vec<TimerHandle> {
        [self.dismiss.take(), self.settle.take(), self.auto_hide.take()]
            .into_iter()
            .flatten()
            .collect()
    }
}

struct ToastRecord {
    owner: EntryId,
    notification: Notification,
    timers: ToastTimers,
}

struct NativeRecord {
    owner: EntryId,
    notification: Notification,
    hide: Option<TimerHandle>,
}

#[derive(Default)]
/// Display handles and their timers, keyed by toast id or native handle.
pub(crate) struct DisplayRegistry {
    next_toast: u64,
    next_native: u64,
    toasts: HashMap<ToastId, ToastRecord>,
    natives: HashMap<NativeHandle, NativeRecord>,
    retries: HashMap<EntryId, TimerHandle>,
}

impl DisplayRegistry {
    fn allocate_toast(&mut self) -> ToastId {
        self.next_toast += 1;
        ToastId(self.next_toast)
    }

    fn allocate_native(&mut self) -> NativeHandle {
        self.next_native += 1;
        NativeHandle(self.next_native)
    }
}

fn arm(
    runtime: &NotifyRuntime,
    delay_ms: u32,
    fire: impl FnOnce(NotifyRuntime) + 'static,
) -> TimerHandle {
    let weak = runtime.downgrade();
    runtime.host().timer_service().set_timeout(
        delay_ms,
        Box::new(move || {
            if let Some(runtime) = weak.upgrade() {
                fire(runtime);
            }
        }),
    )
}

fn clear_timers(runtime: &NotifyRuntime, handles: Vec<TimerHandle>) {
    let timers = runtime.host().timer_service();
    for handle in handles {
        timers.clear_timeout(handle);
    }
}

/// Shows a queued entry through the native service or the toast surface.
pub(super) fn display_entry(runtime: &NotifyRuntime, entry: EntryId) {
    let Some(queued) = runtime.state().queue.get(entry).cloned() else {
        return;
    };
    if runtime.hooks().before_display(&queued).is_cancel() {
        return;
    }

    let config = runtime.config();
    let native_ready = config.native.enabled
        && runtime.host().notification_service().permission() == NativePermission::Granted;
    if native_ready && show_native(runtime, &queued) {
        return;
    }
    if config.toast.enabled {
        show_toast(runtime, queued);
    }
}

fn show_native(runtime: &NotifyRuntime, queued: &QueuedNotification) -> bool {
    let handle = {
        let mut displays = runtime.displays().borrow_mut();
        let handle = displays.allocate_native();
        displays.natives.insert(
            handle,
            NativeRecord {
                owner: queued.entry,
                notification: queued.notification.clone(),
                hide: None,
            },
        );
        handle
    };

    let notification = &queued.notification;
    let request = NativeNotificationRequest {
        title: non_empty(&notification.subject)
            .or_else(|| runtime.config().title().map(str::to_string))
            .unwrap_or_default(),
        body: notification.detail.clone(),
        icon: notification
            .icon
            .clone()
            .or_else(|| runtime.config().icon().map(str::to_string)),
    };
    let callbacks = NativeCallbacks {
        on_click: weak_callback(runtime, move |runtime| native_clicked(&runtime, handle)),
        on_close: weak_callback(runtime, move |runtime| native_closed(&runtime, handle)),
        on_show: weak_callback(runtime, move |runtime| native_shown(&runtime, handle)),
    };

    match runtime
        .host()
        .notification_service()
        .show(handle, &request, callbacks)
    {
        Ok(()) => {
            runtime.emit(NotifyEvent::Displayed {
                entry: queued.entry,
                via: DisplayKind::Native(handle),
            });
            true
        }
        Err(err) => {
            runtime.displays().borrow_mut().natives.remove(&handle);
            runtime.report_error(format!("native notification failed: {err}"));
            false
        }
    }
}

fn show_toast(runtime: &NotifyRuntime, queued: QueuedNotification) {
    let config = runtime.config();
    let position = toast_position(runtime, &queued.notification);
    let view = ToastView {
        title: non_empty(&queued.notification.subject)
            .or_else(|| config.title().map(str::to_string)),
        message: queued.notification.detail.clone(),
        icon: queued.notification.icon.clone(),
        position,
        style: config.toast.style.clone(),
        close_style: config
            .toast
            .close
            .enabled
            .then(|| config.toast.close.style.clone()),
    };
    let id = runtime.displays().borrow_mut().allocate_toast();
    let callbacks = ToastCallbacks {
        on_click: weak_callback(runtime, move |runtime| toast_clicked(&runtime, id)),
        on_close: weak_callback(runtime, move |runtime| close_clicked(&runtime, id)),
    };

    match runtime.host().toast_surface().mount_toast(id, &view, callbacks) {
        Ok(height) => {
            runtime.displays().borrow_mut().toasts.insert(
                id,
                ToastRecord {
                    owner: queued.entry,
                    notification: queued.notification,
                    timers: ToastTimers::default(),
                },
            );
            let _ = runtime.dispatch(NotifyAction::PresentToast {
                id,
                owner: Some(queued.entry),
                height,
                position,
            });
        }
        Err(SurfaceError::NotReady) => {
            let entry = queued.entry;
            let handle = arm(runtime, SURFACE_RETRY_MS, move |runtime| {
                runtime.displays().borrow_mut().retries.remove(&entry);
                let still_queued = runtime.state().queue.get(entry).cloned();
                if let Some(queued) = still_queued {
                    show_toast(&runtime, queued);
                }
            });
            runtime.displays().borrow_mut().retries.insert(entry, handle);
        }
        Err(err) => runtime.report_error(format!("toast mount failed: {err}")),
    }
}

fn toast_position(runtime: &NotifyRuntime, notification: &Notification) -> ToastPosition {
    let toast = &runtime.config().toast;
    if toast.per_notification_position {
        notification.position.unwrap_or(toast.position)
    } else {
        toast.position
    }
}

/// Executes one toast layout command against the surface and the toast timeline.
pub(super) fn apply_toast_command(runtime: &NotifyRuntime, command: ToastCommand) {
    let surface = runtime.host().toast_surface();
    match command {
        ToastCommand::Place { id, y } => surface.place_toast(id, y),
        ToastCommand::FadeOut { id, y } => {
            surface.fade_out_toast(id, y);
            let settle = arm(runtime, TOAST_SETTLE_MS, move |runtime| {
                if let Some(record) = runtime.displays().borrow_mut().toasts.get_mut(&id) {
                    record.timers.settle = None;
                }
                let _ = runtime.dispatch(NotifyAction::FinishHideToast { id });
            });
            let stale = runtime
                .displays()
                .borrow_mut()
                .toasts
                .get_mut(&id)
                .and_then(|record| record.timers.settle.replace(settle));
            clear_timers(runtime, stale.into_iter().collect());
        }
        ToastCommand::Detach { id } => {
            surface.detach_toast(id);
            let record = runtime.displays().borrow_mut().toasts.remove(&id);
            if let Some(mut record) = record {
                clear_timers(runtime, record.timers.take_all());
                runtime.emit(NotifyEvent::Closed {
                    entry: Some(record.owner),
                    via: DisplayKind::Toast(id),
                });
            }
        }
        ToastCommand::Promoted { id, owner } => {
            if let Some(delay) = runtime.config().toast.hide_after_ms.delay_ms() {
                let handle = arm(runtime, delay, move |runtime| {
                    if let Some(record) = runtime.displays().borrow_mut().toasts.get_mut(&id) {
                        record.timers.auto_hide = None;
                    }
                    begin_hide(&runtime, id);
                });
                if let Some(record) = runtime.displays().borrow_mut().toasts.get_mut(&id) {
                    record.timers.auto_hide = Some(handle);
                }
            }
            if let Some(entry) = owner {
                runtime.emit(NotifyEvent::Displayed {
                    entry,
                    via: DisplayKind::Toast(id),
                });
            }
        }
    }
}

/// Hides a toast after `delay_ms`, replacing any earlier pending delay.
pub(super) fn dismiss_toast(runtime: &NotifyRuntime, id: ToastId, delay_ms: u32) {
    if delay_ms == 0 {
        begin_hide(runtime, id);
        return;
    }
    if !runtime.displays().borrow().toasts.contains_key(&id) {
        return;
    }
    let handle = arm(runtime, delay_ms, move |runtime| {
        if let Some(record) = runtime.displays().borrow_mut().toasts.get_mut(&id) {
            record.timers.dismiss = None;
        }
        begin_hide(&runtime, id);
    });
    let stale = runtime
        .displays()
        .borrow_mut()
        .toasts
        .get_mut(&id)
        .and_then(|record| record.timers.dismiss.replace(handle));
    clear_timers(runtime, stale.into_iter().collect());
}

fn begin_hide(runtime: &NotifyRuntime, id: ToastId) {
    let stale: Vec<TimerHandle> = runtime
        .displays()
        .borrow_mut()
        .toasts
        .get_mut(&id)
        .map(|record| {
            [record.timers.dismiss.take(), record.timers.auto_hide.take()]
                .into_iter()
                .flatten()
                .collect()
        })
        .unwrap_or_default();
    clear_timers(runtime, stale);
    let _ = runtime.dispatch(NotifyAction::BeginHideToast { id });
}

/// Hides every toast of a removed entry and cancels its pending retries.
pub(super) fn dismiss_toasts_for(runtime: &NotifyRuntime, entry: EntryId) {
    let retry = runtime.displays().borrow_mut().retries.remove(&entry);
    clear_timers(runtime, retry.into_iter().collect());
    let toasts = runtime.state().toasts.toasts_for(entry);
    for id in toasts {
        begin_hide(runtime, id);
    }
}

/// Closes every native notification of a removed entry.
pub(super) fn close_natives_for(runtime: &NotifyRuntime, entry: EntryId) {
    let handles: Vec<NativeHandle> = runtime
        .displays()
        .borrow()
        .natives
        .iter()
        .filter(|(_, record)| record.owner == entry)
        .map(|(handle, _)| *handle)
        .collect();
    let service = runtime.host().notification_service();
    for handle in handles {
        service.close(handle);
    }
}

fn toast_clicked(runtime: &NotifyRuntime, id: ToastId) {
    let clicked = runtime
        .displays()
        .borrow()
        .toasts
        .get(&id)
        .map(|record| QueuedNotification {
            entry: record.owner,
            notification: record.notification.clone(),
        });
    let Some(clicked) = clicked else {
        return;
    };
    if runtime.hooks().notification_clicked(&clicked).is_cancel() {
        return;
    }
    if runtime.config().hide_after_click {
        begin_hide(runtime, id);
    }
    runtime.redirect_to_notification(&clicked.notification);
}

fn close_clicked(runtime: &NotifyRuntime, id: ToastId) {
    if runtime.hooks().close_clicked(id).is_cancel() {
        return;
    }
    begin_hide(runtime, id);
}

fn native_clicked(runtime: &NotifyRuntime, handle: NativeHandle) {
    let clicked = runtime
        .displays()
        .borrow()
        .natives
        .get(&handle)
        .map(|record| QueuedNotification {
            entry: record.owner,
            notification: record.notification.clone(),
        });
    let Some(clicked) = clicked else {
        return;
    };
    if runtime.hooks().notification_clicked(&clicked).is_cancel() {
        return;
    }
    if runtime.config().hide_after_click {
        runtime.host().notification_service().close(handle);
    }
    runtime.redirect_to_notification(&clicked.notification);
}

fn native_shown(runtime: &NotifyRuntime, handle: NativeHandle) {
    let Some(delay) = runtime.config().native.hide_after_ms.delay_ms() else {
        return;
    };
    let timer = arm(runtime, delay, move |runtime| {
        if let Some(record) = runtime.displays().borrow_mut().natives.get_mut(&handle) {
            record.hide = None;
        }
        runtime.host().notification_service().close(handle);
    });
    let stale = runtime
        .displays()
        .borrow_mut()
        .natives
        .get_mut(&handle)
        .and_then(|record| record.hide.replace(timer));
    clear_timers(runtime, stale.into_iter().collect());
}

fn native_closed(runtime: &NotifyRuntime, handle: NativeHandle) {
    let record = runtime.displays().borrow_mut().natives.remove(&handle);
    let Some(record) = record else {
        return;
    };
    clear_timers(runtime, record.hide.into_iter().collect());
    runtime.emit(NotifyEvent::Closed {
        entry: Some(record.owner),
        via: DisplayKind::Native(handle),
    });
}

fn weak_callback(
    runtime: &NotifyRuntime,
    run: impl Fn(NotifyRuntime) + 'static,
) -> Rc<dyn Fn()> {
    let weak = runtime.downgrade();
    Rc::new(move || {
        if let Some(runtime) = weak.upgrade() {
            run(runtime);
        }
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
