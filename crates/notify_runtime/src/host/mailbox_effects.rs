//! Fire-and-forget mailbox and push-group operations.

use leptos::logging;
use notify_host::{MailboxError, MailboxQuery};

use crate::{
    host::NotifyRuntime,
    model::{EntryId, NotificationId},
    normalize::normalize_mail_record,
    push_groups::GroupOp,
    reducer::NotifyError,
};

/// Completion callback for a mailbox fetch.
pub(super) type FetchDone = Box<dyn FnOnce(&NotifyRuntime, Vec<EntryId>)>;

pub(super) fn delete(runtime: &NotifyRuntime, id: NotificationId) {
    let mailbox = runtime.host().mailbox_service();
    let weak = runtime.downgrade();
    runtime.host().task_spawner().spawn_local(Box::pin(async move {
        let query = MailboxQuery::by_id(id.as_str());
        let result = mailbox.delete(&query).await;
        match result {
            Ok(()) => {}
            Err(MailboxError::NotFound) => {
                logging::log!("mailbox record {id} already deleted");
            }
            Err(err) => {
                if let Some(runtime) = weak.upgrade() {
                    runtime.report_error(format!("mailbox delete of {id} failed: {err}"));
                }
            }
        }
    }));
}

/// Fetches records, merges them into the queue, and reports the accepted entries to `done`.
pub(super) fn fetch(runtime: &NotifyRuntime, query: MailboxQuery, done: Option<FetchDone>) {
    let mailbox = runtime.host().mailbox_service();
    let weak = runtime.downgrade();
    runtime.host().task_spawner().spawn_local(Box::pin(async move {
        let result = mailbox.find(&query).await;
        let Some(runtime) = weak.upgrade() else {
            return;
        };
        let records = match result {
            Ok(records) => records,
            Err(MailboxError::NotFound) => {
                logging::log!("mailbox query matched nothing");
                Vec::new()
            }
            Err(err) => {
                runtime.report_error(format!("mailbox fetch failed: {err}"));
                Vec::new()
            }
        };

        let mut accepted = Vec::new();
        for record in &records {
            match normalize_mail_record(record, runtime.config()) {
                Ok(notification) => match runtime.enqueue(notification) {
                    Ok(entry) => accepted.push(entry),
                    Err(NotifyError::Cancelled) => {}
                    Err(err) => logging::warn!("mailbox record {} not queued: {err}", record.id),
                },
                Err(err) => {
                    runtime.report_error(format!("dropped mailbox record {}: {err}", record.id));
                }
            }
        }
        if let Some(done) = done {
            done(&runtime, accepted);
        }
    }));
}

pub(super) fn run_group_op(runtime: &NotifyRuntime, op: GroupOp) {
    let push = runtime.host().push_service();
    let weak = runtime.downgrade();
    runtime.host().task_spawner().spawn_local(Box::pin(async move {
        let (group, result, joining) = match &op {
            GroupOp::Join(group) => (group.clone(), push.join_group(group).await, true),
            GroupOp::Leave(group) => (group.clone(), push.leave_group(group).await, false),
        };
        let Err(err) = result else {
            return;
        };
        let Some(runtime) = weak.upgrade() else {
            return;
        };
        if joining {
            runtime.groups().borrow_mut().forget(&group);
        }
        let verb = if joining { "join" } else { "leave" };
        runtime.report_error(format!("push group {verb} `{group}` failed: {err}"));
    }));
}
