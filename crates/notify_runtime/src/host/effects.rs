//! Runtime-effect dispatch for the notification host boundary.

use crate::{
    events::NotifyEvent,
    host::{display, mailbox_effects, navigation, NotifyRuntime},
    persistence,
    reducer::NotifyEffect,
};

pub(super) fn run_effect(runtime: &NotifyRuntime, effect: NotifyEffect) {
    match effect {
        NotifyEffect::Accepted(_) => {}
        NotifyEffect::PersistQueue => persist_queue(runtime),
        NotifyEffect::PersistSelected => persist_selected(runtime),
        NotifyEffect::DeleteFromMailbox(id) => mailbox_effects::delete(runtime, id),
        NotifyEffect::QueueUpdated(op) => {
            let queue = runtime.state().queue.notifications();
            runtime.emit(NotifyEvent::QueueUpdated { op, queue });
        }
        NotifyEffect::SelectionChanged => {
            let selected = runtime.selected();
            runtime.emit(NotifyEvent::NotificationChanged { selected });
        }
        NotifyEffect::NotificationReceived(notification) => {
            runtime.emit(NotifyEvent::NotificationReceived { notification });
        }
        NotifyEffect::Display(entry) => display::display_entry(runtime, entry),
        NotifyEffect::InjectIfOnPage(entry) => inject_if_on_page(runtime, entry),
        NotifyEffect::Reinject => {
            if runtime.injected().is_some() {
                runtime.inject_selected();
            }
        }
        NotifyEffect::DismissToastsFor(entry) => display::dismiss_toasts_for(runtime, entry),
        NotifyEffect::CloseNativeFor(entry) => display::close_natives_for(runtime, entry),
        NotifyEffect::Toast(command) => display::apply_toast_command(runtime, command),
    }
}

fn persist_queue(runtime: &NotifyRuntime) {
    let queue = runtime.state().queue.notifications();
    let session = runtime.host().session_store();
    if let Err(err) = persistence::persist_queue(session.as_ref(), &queue) {
        runtime.report_error(format!("persist queue failed: {err}"));
    }
}

fn persist_selected(runtime: &NotifyRuntime) {
    let selected = runtime.selected().map(|queued| queued.notification);
    let session = runtime.host().session_store();
    if let Err(err) = persistence::persist_selected(session.as_ref(), selected.as_ref()) {
        runtime.report_error(format!("persist selection failed: {err}"));
    }
}

fn inject_if_on_page(runtime: &NotifyRuntime, entry: crate::model::EntryId) {
    let Some(queued) = runtime.state().queue.get(entry).cloned() else {
        return;
    };
    let Some(target) = queued.notification.url.as_deref() else {
        return;
    };
    let current = runtime.host().page_service().current_url();
    if navigation::targets_page(&current, target) {
        runtime.inject_notification(&queued.notification);
    }
}
