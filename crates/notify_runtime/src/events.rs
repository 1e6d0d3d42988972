//! Cancelable pre-action hooks and post-action lifecycle events.

use notify_host::{NativeHandle, ToastId};
use serde::{Deserialize, Serialize};

use crate::model::{EntryId, Notification, QueuedNotification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of queue mutation.
pub enum QueueOp {
    /// A notification was appended.
    Added,
    /// A duplicate overwrote a queued record.
    Replaced,
    /// One entry was removed.
    Removed,
    /// Every entry was removed.
    Cleared,
    /// The queue was restored from the session mirror.
    Hydrated,
}

#[derive(Debug, Clone, PartialEq)]
/// A queue mutation about to be committed, passed to [`NotifyHooks::before_queue_update`].
pub struct QueueChange {
    /// Mutation kind.
    pub op: QueueOp,
    /// Affected record, when the mutation targets a single entry.
    pub notification: Option<Notification>,
    /// Queue length before the mutation.
    pub queue_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Answer of a cancelable hook.
pub enum HookDecision {
    /// Run the default action.
    #[default]
    Proceed,
    /// Skip the default action.
    Cancel,
}

impl HookDecision {
    /// Returns whether the default action was vetoed.
    pub fn is_cancel(self) -> bool {
        self == Self::Cancel
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a notification was shown.
pub enum DisplayKind {
    /// In-page toast.
    Toast(ToastId),
    /// Native desktop notification.
    Native(NativeHandle),
}

#[derive(Debug, Clone, PartialEq)]
/// Post-action lifecycle events.
pub enum NotifyEvent {
    /// The queue changed.
    QueueUpdated {
        /// Mutation kind.
        op: QueueOp,
        /// Queue contents after the mutation, oldest first.
        queue: Vec<Notification>,
    },
    /// The selected notification changed.
    NotificationChanged {
        /// New selection.
        selected: Option<QueuedNotification>,
    },
    /// A live notification was accepted.
    NotificationReceived {
        /// Copy of the accepted record.
        notification: Notification,
    },
    /// A toast or native notification was shown.
    Displayed {
        /// Queue entry shown.
        entry: EntryId,
        /// Display channel.
        via: DisplayKind,
    },
    /// A toast or native notification went away.
    Closed {
        /// Queue entry, when the display still belongs to one.
        entry: Option<EntryId>,
        /// Display channel.
        via: DisplayKind,
    },
    /// Boot completed.
    Initialized,
    /// A swallowed failure.
    ErrorMessage {
        /// Human-readable description.
        message: String,
    },
}

/// Application callbacks for the runtime lifecycle.
///
/// Every method has a default. Hooks run after the runtime's state borrow is released, so they
/// may call back into the runtime.
pub trait NotifyHooks {
    /// Called before a queue mutation commits.
    fn before_queue_update(&self, _change: &QueueChange) -> HookDecision {
        HookDecision::Proceed
    }

    /// Called before a notification is shown as a toast or native notification.
    fn before_display(&self, _notification: &QueuedNotification) -> HookDecision {
        HookDecision::Proceed
    }

    /// Called when a toast or native notification body is clicked. Cancel skips the redirect and
    /// hide-after-click.
    fn notification_clicked(&self, _notification: &QueuedNotification) -> HookDecision {
        HookDecision::Proceed
    }

    /// Called when a toast close button is clicked. Cancel keeps the toast.
    fn close_clicked(&self, _toast: ToastId) -> HookDecision {
        HookDecision::Proceed
    }

    /// Called after every lifecycle event.
    fn after_event(&self, _event: &NotifyEvent) {}
}

#[derive(Debug, Clone, Copy, Default)]
/// Hooks that always proceed and ignore events.
pub struct NoopHooks;

impl NotifyHooks for NoopHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hooks_proceed() {
        let hooks = NoopHooks;
        let change = QueueChange {
            op: QueueOp::Added,
            notification: None,
            queue_len: 0,
        };
        assert_eq!(hooks.before_queue_update(&change), HookDecision::Proceed);
        assert!(!hooks.close_clicked(ToastId(1)).is_cancel());
    }
}
