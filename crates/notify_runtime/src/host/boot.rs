//! Boot sequence for a runtime instance.

use leptos::logging;
use notify_host::{MailboxQuery, NativePermission, SurfaceError};

use crate::{
    events::NotifyEvent,
    host::{display::SURFACE_RETRY_MS, mailbox_effects, navigation, NotifyRuntime},
    model::{EntryId, Notification, NotificationId},
    persistence,
    reducer::NotifyAction,
};

/// Runs the boot sequence:
/// 1. hydrate the queue and selection from the session mirror
/// 2. inject the stored selection (it survives redirects even when not queued)
/// 3. consume the notification query parameter and select or fetch that notification
/// 4. prepare the toast container and request native permission
/// 5. start listening and flush deferred group joins when the channel is ready
pub(super) fn start(runtime: &NotifyRuntime) {
    hydrate(runtime);
    consume_query_param(runtime);

    if runtime.config().toast.enabled {
        ensure_container(runtime);
    }
    request_native_permission(runtime);

    runtime.start_listening();
    if runtime.host().push_service().is_ready() {
        runtime.mark_push_ready();
    }
    runtime.emit(NotifyEvent::Initialized);
}

fn hydrate(runtime: &NotifyRuntime) {
    let session = runtime.host().session_store();
    let queue = persistence::load_queue(session.as_ref()).unwrap_or_default();
    let selected = persistence::load_selected(session.as_ref());

    if !queue.is_empty() || selected.is_some() {
        let _ = runtime.dispatch(NotifyAction::Hydrate {
            queue,
            selected: selected.clone(),
        });
    }
    if let Some(selected) = selected {
        runtime.inject_notification(&selected);
    }
}

fn consume_query_param(runtime: &NotifyRuntime) {
    let page = runtime.host().page_service();
    let current = page.current_url();
    let Some((id, stripped)) =
        navigation::strip_query_param(&current, &runtime.config().notification_query_param)
    else {
        return;
    };
    page.replace_url(&stripped);

    let lookup = Notification {
        id: Some(NotificationId::new(id.clone())),
        ..Notification::default()
    };
    let queued = runtime
        .state()
        .queue
        .find_by_id(&NotificationId::new(id.clone()));
    if queued.is_some() {
        select_and_inject(runtime, &lookup);
        return;
    }

    mailbox_effects::fetch(
        runtime,
        MailboxQuery::by_id(id),
        Some(Box::new(move |runtime: &NotifyRuntime, accepted: Vec<EntryId>| {
            if accepted.is_empty() {
                logging::warn!("notification from query parameter was not found");
                return;
            }
            select_and_inject(runtime, &lookup);
        })),
    );
}

fn select_and_inject(runtime: &NotifyRuntime, lookup: &Notification) {
    // Already selected is fine; only the injection matters here.
    let _ = runtime.select_matching(lookup);
    runtime.inject_selected();
}

fn ensure_container(runtime: &NotifyRuntime) {
    match runtime.host().toast_surface().ensure_container() {
        Ok(()) => {}
        Err(SurfaceError::NotReady) => {
            let weak = runtime.downgrade();
            runtime.host().timer_service().set_timeout(
                SURFACE_RETRY_MS,
                Box::new(move || {
                    if let Some(runtime) = weak.upgrade() {
                        ensure_container(&runtime);
                    }
                }),
            );
        }
        Err(err) => runtime.report_error(format!("toast container unavailable: {err}")),
    }
}

fn request_native_permission(runtime: &NotifyRuntime) {
    if !runtime.config().native.enabled {
        return;
    }
    let service = runtime.host().notification_service();
    if service.permission() != NativePermission::Default {
        return;
    }
    let weak = runtime.downgrade();
    runtime.host().task_spawner().spawn_local(Box::pin(async move {
        match service.request_permission().await {
            Ok(permission) => logging::log!("native notification permission: {permission:?}"),
            Err(err) => {
                if let Some(runtime) = weak.upgrade() {
                    runtime.report_error(format!("native permission request failed: {err}"));
                }
            }
        }
    }));
}
