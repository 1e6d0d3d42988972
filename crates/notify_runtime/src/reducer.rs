//! Reducer actions, side-effect intents, and transition logic for the notification runtime.

use notify_host::{ToastId, ToastPosition};
use thiserror::Error;

use crate::config::{DuplicatePolicy, NotifyConfig};
use crate::events::QueueOp;
use crate::model::{EntryId, Notification, NotificationId, NotificationOrigin};
use crate::queue::{NotificationQueue, RemovedEntry};
use crate::toast_stack::{ToastCommand, ToastStack};

#[derive(Debug, Clone, Default, PartialEq)]
/// Queue, selection, and toast layout state owned by one runtime instance.
pub struct NotifyState {
    /// Notifications and the selection.
    pub queue: NotificationQueue,
    /// Toast layout bookkeeping.
    pub toasts: ToastStack,
}

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_notify`] to mutate [`NotifyState`].
pub enum NotifyAction {
    /// A live notification arrived and should be queued and displayed.
    Receive(Notification),
    /// Queue a notification without displaying it.
    Enqueue(Notification),
    /// Remove the entry at an index.
    RemoveAt {
        /// Queue index.
        index: usize,
    },
    /// Remove an entry by reference identity.
    RemoveEntry {
        /// Entry to remove.
        entry: EntryId,
    },
    /// Remove the entry matching a (possibly rebuilt) record.
    RemoveMatching(Notification),
    /// Remove the selected entry.
    RemoveSelected,
    /// Remove every entry.
    Clear,
    /// Select an entry by reference identity.
    Select {
        /// Entry to select.
        entry: EntryId,
    },
    /// Select the entry at an index.
    SelectAt {
        /// Queue index.
        index: usize,
    },
    /// Select the entry matching a (possibly rebuilt) record.
    SelectMatching(Notification),
    /// Move the selection forward.
    SelectNext,
    /// Move the selection backward.
    SelectPrevious,
    /// Restore state from the session mirror.
    Hydrate {
        /// Mirrored queue, oldest first.
        queue: Vec<Notification>,
        /// Mirrored selection.
        selected: Option<Notification>,
    },
    /// Lay out a freshly mounted toast.
    PresentToast {
        /// Toast id.
        id: ToastId,
        /// Entry that produced the toast.
        owner: Option<EntryId>,
        /// Measured height.
        height: i32,
        /// Corner.
        position: ToastPosition,
    },
    /// Start hiding a toast.
    BeginHideToast {
        /// Toast to hide.
        id: ToastId,
    },
    /// Release a toast's slot after its fade-out.
    FinishHideToast {
        /// Toast to release.
        id: ToastId,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_notify`] for the runtime to execute.
pub enum NotifyEffect {
    /// The arrival was stored under this entry.
    Accepted(EntryId),
    /// Mirror the queue to session storage.
    PersistQueue,
    /// Mirror the selection to session storage.
    PersistSelected,
    /// Best-effort delete of a mailbox record.
    DeleteFromMailbox(NotificationId),
    /// Emit a queue-updated event.
    QueueUpdated(QueueOp),
    /// Emit a notification-changed event.
    SelectionChanged,
    /// Emit a notification-received event.
    NotificationReceived(Notification),
    /// Show an entry as a toast or native notification.
    Display(EntryId),
    /// Inject an entry if its URL targets the current page.
    InjectIfOnPage(EntryId),
    /// Re-inject the selection if a notification is currently injected.
    Reinject,
    /// Hide every toast produced by an entry and cancel its timers.
    DismissToastsFor(EntryId),
    /// Close every native notification produced by an entry.
    CloseNativeFor(EntryId),
    /// Apply a toast layout command.
    Toast(ToastCommand),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for actions that cannot apply.
pub enum NotifyError {
    /// The target entry is already selected.
    #[error("notification already selected")]
    AlreadySelected,
    /// The target entry is not queued.
    #[error("notification not found")]
    EntryNotFound,
    /// A hook or the duplicate policy dropped the request.
    #[error("queue update cancelled")]
    Cancelled,
}

/// Applies a [`NotifyAction`] to the runtime state and collects resulting side effects.
///
/// # Errors
///
/// Returns [`NotifyError::EntryNotFound`] when an action references a missing entry and
/// [`NotifyError::AlreadySelected`] when selecting the current selection.
pub fn reduce_notify(
    state: &mut NotifyState,
    config: &NotifyConfig,
    action: NotifyAction,
) -> Result<Vec<NotifyEffect>, NotifyError> {
    let mut effects = Vec::new();
    match action {
        NotifyAction::Receive(notification) => {
            accept(state, config, notification, true, &mut effects);
        }
        NotifyAction::Enqueue(notification) => {
            accept(state, config, notification, false, &mut effects);
        }
        NotifyAction::RemoveAt { index } => {
            let removed = state.queue.remove_at(index).ok_or(NotifyError::EntryNotFound)?;
            after_removal(state, config, removed, &mut effects);
        }
        NotifyAction::RemoveEntry { entry } => {
            let removed = state
                .queue
                .remove_entry(entry)
                .ok_or(NotifyError::EntryNotFound)?;
            after_removal(state, config, removed, &mut effects);
        }
        NotifyAction::RemoveMatching(notification) => {
            let removed = state
                .queue
                .remove_matching(&notification)
                .ok_or(NotifyError::EntryNotFound)?;
            after_removal(state, config, removed, &mut effects);
        }
        NotifyAction::RemoveSelected => {
            let removed = state
                .queue
                .remove_selected()
                .ok_or(NotifyError::EntryNotFound)?;
            after_removal(state, config, removed, &mut effects);
        }
        NotifyAction::Clear => {
            let had_selection = state.queue.selected_entry().is_some();
            let removed = state.queue.clear();
            for record in &removed {
                release_entry(config, &record.notification, record.entry, &mut effects);
            }
            effects.push(NotifyEffect::PersistQueue);
            effects.push(NotifyEffect::QueueUpdated(QueueOp::Cleared));
            if had_selection {
                effects.push(NotifyEffect::PersistSelected);
                effects.push(NotifyEffect::SelectionChanged);
            }
        }
        NotifyAction::Select { entry } => {
            state.queue.select(entry)?;
            selection_changed(&mut effects);
        }
        NotifyAction::SelectAt { index } => {
            state.queue.select_at(index)?;
            selection_changed(&mut effects);
        }
        NotifyAction::SelectMatching(notification) => {
            state.queue.select_matching(&notification)?;
            selection_changed(&mut effects);
        }
        NotifyAction::SelectNext => {
            state.queue.select_next()?;
            selection_changed(&mut effects);
        }
        NotifyAction::SelectPrevious => {
            state.queue.select_previous()?;
            selection_changed(&mut effects);
        }
        NotifyAction::Hydrate { queue, selected } => {
            state.queue.clear();
            for notification in queue {
                state.queue.push(notification);
            }
            if !state.queue.is_empty() {
                effects.push(NotifyEffect::QueueUpdated(QueueOp::Hydrated));
            }
            if let Some(selected) = selected {
                if state.queue.select_matching(&selected).is_ok() {
                    effects.push(NotifyEffect::SelectionChanged);
                }
            }
        }
        NotifyAction::PresentToast {
            id,
            owner,
            height,
            position,
        } => {
            let commands = state
                .toasts
                .present(id, owner, height, position, &config.toast);
            effects.extend(commands.into_iter().map(NotifyEffect::Toast));
        }
        NotifyAction::BeginHideToast { id } => {
            effects.extend(state.toasts.begin_hide(id).into_iter().map(NotifyEffect::Toast));
        }
        NotifyAction::FinishHideToast { id } => {
            let commands = state.toasts.finish_hide(id, &config.toast);
            effects.extend(commands.into_iter().map(NotifyEffect::Toast));
        }
    }
    Ok(effects)
}

/// Returns the entry an arrival would collide with under the configured duplicate policy.
pub fn duplicate_of(state: &NotifyState, notification: &Notification) -> Option<EntryId> {
    notification
        .id
        .as_ref()
        .and_then(|id| state.queue.find_by_id(id))
}

fn accept(
    state: &mut NotifyState,
    config: &NotifyConfig,
    mut notification: Notification,
    display: bool,
    effects: &mut Vec<NotifyEffect>,
) {
    if let Some(existing) = duplicate_of(state, &notification) {
        if config.duplicate_policy == DuplicatePolicy::Ignore {
            return;
        }
        let stored_origin = state
            .queue
            .get(existing)
            .map(|queued| queued.notification.origin);
        if stored_origin == Some(NotificationOrigin::Mailbox) {
            notification.origin = NotificationOrigin::Mailbox;
        }
        state.queue.replace(existing, notification);
        effects.push(NotifyEffect::Accepted(existing));
        effects.push(NotifyEffect::PersistQueue);
        effects.push(NotifyEffect::QueueUpdated(QueueOp::Replaced));
        if state.queue.selected_entry() == Some(existing) {
            effects.push(NotifyEffect::PersistSelected);
            effects.push(NotifyEffect::Reinject);
        }
        return;
    }

    let received = display.then(|| notification.clone());
    let entry = state.queue.push(notification);
    effects.push(NotifyEffect::Accepted(entry));
    effects.push(NotifyEffect::PersistQueue);
    effects.push(NotifyEffect::QueueUpdated(QueueOp::Added));
    if display {
        effects.push(NotifyEffect::Display(entry));
    }
    if state.queue.selected_entry().is_none() && state.queue.select(entry).is_ok() {
        selection_changed(effects);
        if display && config.inject_on_arrival {
            effects.push(NotifyEffect::InjectIfOnPage(entry));
        }
    }
    if let Some(notification) = received {
        effects.push(NotifyEffect::NotificationReceived(notification));
    }
}

fn after_removal(
    state: &mut NotifyState,
    config: &NotifyConfig,
    removed: RemovedEntry,
    effects: &mut Vec<NotifyEffect>,
) {
    release_entry(
        config,
        &removed.record.notification,
        removed.record.entry,
        effects,
    );
    effects.push(NotifyEffect::PersistQueue);
    effects.push(NotifyEffect::QueueUpdated(QueueOp::Removed));
    if removed.was_selected {
        state.queue.apply_auto_select(config.auto_select);
        selection_changed(effects);
    }
}

fn release_entry(
    config: &NotifyConfig,
    notification: &Notification,
    entry: EntryId,
    effects: &mut Vec<NotifyEffect>,
) {
    if config.delete_from_mailbox_on_remove && notification.is_mailbox_backed() {
        if let Some(id) = &notification.id {
            effects.push(NotifyEffect::DeleteFromMailbox(id.clone()));
        }
    }
    effects.push(NotifyEffect::DismissToastsFor(entry));
    effects.push(NotifyEffect::CloseNativeFor(entry));
}

fn selection_changed(effects: &mut Vec<NotifyEffect>) {
    effects.push(NotifyEffect::PersistSelected);
    effects.push(NotifyEffect::SelectionChanged);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::AutoSelect;

    fn reduce(
        state: &mut NotifyState,
        config: &NotifyConfig,
        action: NotifyAction,
    ) -> Vec<NotifyEffect> {
        reduce_notify(state, config, action).expect("reduce")
    }

    fn subjects(state: &NotifyState) -> Vec<String> {
        state
            .queue
            .iter()
            .map(|queued| queued.notification.subject.clone())
            .collect()
    }

    #[test]
    fn first_arrival_is_displayed_selected_and_offered_for_injection() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        let effects = reduce(
            &mut state,
            &config,
            NotifyAction::Receive(Notification::new("a", "b")),
        );
        let entry = state.queue.selected_entry().expect("selected");
        assert_eq!(
            effects,
            vec![
                NotifyEffect::Accepted(entry),
                NotifyEffect::PersistQueue,
                NotifyEffect::QueueUpdated(QueueOp::Added),
                NotifyEffect::Display(entry),
                NotifyEffect::PersistSelected,
                NotifyEffect::SelectionChanged,
                NotifyEffect::InjectIfOnPage(entry),
                NotifyEffect::NotificationReceived(Notification::new("a", "b")),
            ]
        );
    }

    #[test]
    fn later_arrivals_keep_the_existing_selection() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        reduce(&mut state, &config, NotifyAction::Receive(Notification::new("a", "")));
        let first = state.queue.selected_entry();
        let effects = reduce(&mut state, &config, NotifyAction::Receive(Notification::new("b", "")));
        assert_eq!(state.queue.selected_entry(), first);
        assert!(!effects.contains(&NotifyEffect::SelectionChanged));
    }

    #[test]
    fn enqueue_does_not_display() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        let effects = reduce(&mut state, &config, NotifyAction::Enqueue(Notification::new("a", "")));
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, NotifyEffect::Display(_))));
        assert_eq!(state.queue.len(), 1);
    }

    #[test]
    fn duplicate_ids_replace_in_place_by_default() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        reduce(&mut state, &config, NotifyAction::Receive(Notification::new("v1", "").with_id("m")));
        reduce(&mut state, &config, NotifyAction::Receive(Notification::new("x", "")));
        let effects = reduce(
            &mut state,
            &config,
            NotifyAction::Receive(Notification::new("v2", "").with_id("m")),
        );

        assert_eq!(subjects(&state), vec!["v2", "x"]);
        assert!(effects.contains(&NotifyEffect::Reinject));
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, NotifyEffect::Display(_))));
    }

    #[test]
    fn duplicate_ids_are_dropped_under_ignore_policy() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::builder()
            .with_duplicate_policy(DuplicatePolicy::Ignore)
            .build()
            .expect("config");
        reduce(&mut state, &config, NotifyAction::Receive(Notification::new("v1", "").with_id("m")));
        let effects = reduce(
            &mut state,
            &config,
            NotifyAction::Receive(Notification::new("v2", "").with_id("m")),
        );
        assert!(effects.is_empty());
        assert_eq!(subjects(&state), vec!["v1"]);
    }

    #[test]
    fn replacing_a_mailbox_record_keeps_it_mailbox_backed() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        let stored = Notification::new("a", "")
            .with_id("m")
            .with_origin(NotificationOrigin::Mailbox);
        reduce(&mut state, &config, NotifyAction::Enqueue(stored));
        reduce(
            &mut state,
            &config,
            NotifyAction::Receive(Notification::new("b", "").with_id("m")),
        );
        assert!(state
            .queue
            .oldest()
            .map(|queued| queued.notification.is_mailbox_backed())
            .unwrap_or(false));
    }

    #[test]
    fn removing_selected_with_newest_policy_selects_last_remaining() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::builder()
            .with_auto_select(AutoSelect::Newest)
            .build()
            .expect("config");
        for subject in ["a", "b", "c"] {
            reduce(&mut state, &config, NotifyAction::Enqueue(Notification::new(subject, "")));
        }
        assert_eq!(state.queue.selected_index(), Some(0));

        reduce(&mut state, &config, NotifyAction::RemoveSelected);
        assert_eq!(
            state.queue.selected().map(|q| q.notification.subject.as_str()),
            Some("c")
        );

        reduce(&mut state, &config, NotifyAction::RemoveAt { index: 0 });
        reduce(&mut state, &config, NotifyAction::RemoveSelected);
        assert!(state.queue.is_empty());
        assert_eq!(state.queue.selected(), None);
    }

    #[test]
    fn removing_selected_with_auto_select_disabled_clears_selection() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        reduce(&mut state, &config, NotifyAction::Enqueue(Notification::new("a", "")));
        reduce(&mut state, &config, NotifyAction::Enqueue(Notification::new("b", "")));
        reduce(&mut state, &config, NotifyAction::RemoveSelected);
        assert_eq!(state.queue.selected(), None);
        assert_eq!(state.queue.len(), 1);
    }

    #[test]
    fn removing_mailbox_records_requests_delete_and_dismissal() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        let stored = Notification::new("a", "")
            .with_id("m-1")
            .with_origin(NotificationOrigin::Mailbox);
        reduce(&mut state, &config, NotifyAction::Enqueue(stored));
        let entry = state.queue.oldest().expect("entry").entry;

        let effects = reduce(&mut state, &config, NotifyAction::RemoveEntry { entry });
        assert_eq!(
            &effects[..3],
            &[
                NotifyEffect::DeleteFromMailbox(NotificationId::new("m-1")),
                NotifyEffect::DismissToastsFor(entry),
                NotifyEffect::CloseNativeFor(entry),
            ]
        );
    }

    #[test]
    fn local_records_are_never_deleted_from_the_mailbox() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        reduce(&mut state, &config, NotifyAction::Enqueue(Notification::new("a", "").with_id("m")));
        let effects = reduce(&mut state, &config, NotifyAction::Clear);
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, NotifyEffect::DeleteFromMailbox(_))));
        assert!(effects.contains(&NotifyEffect::SelectionChanged));
    }

    #[test]
    fn missing_targets_report_errors() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        assert_eq!(
            reduce_notify(&mut state, &config, NotifyAction::RemoveAt { index: 0 }),
            Err(NotifyError::EntryNotFound)
        );
        assert_eq!(
            reduce_notify(&mut state, &config, NotifyAction::RemoveSelected),
            Err(NotifyError::EntryNotFound)
        );
        reduce(&mut state, &config, NotifyAction::Enqueue(Notification::new("a", "")));
        assert_eq!(
            reduce_notify(&mut state, &config, NotifyAction::SelectAt { index: 0 }),
            Err(NotifyError::AlreadySelected)
        );
    }

    #[test]
    fn hydrate_restores_queue_and_selection() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        let queue = vec![
            Notification::new("a", "").with_id("1"),
            Notification::new("b", "").with_id("2"),
        ];
        let effects = reduce(
            &mut state,
            &config,
            NotifyAction::Hydrate {
                queue,
                selected: Some(Notification::new("", "").with_id("2")),
            },
        );
        assert_eq!(subjects(&state), vec!["a", "b"]);
        assert_eq!(state.queue.selected_index(), Some(1));
        assert_eq!(
            effects,
            vec![
                NotifyEffect::QueueUpdated(QueueOp::Hydrated),
                NotifyEffect::SelectionChanged
            ]
        );
    }

    #[test]
    fn hydrate_keeps_entry_ids_unique_across_restores() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        reduce(&mut state, &config, NotifyAction::Enqueue(Notification::new("live", "")));
        let before = state.queue.newest().map(|queued| queued.entry).expect("entry");
        reduce(
            &mut state,
            &config,
            NotifyAction::Hydrate {
                queue: vec![Notification::new("restored", "")],
                selected: None,
            },
        );
        let restored = state.queue.newest().map(|queued| queued.entry).expect("entry");
        assert_eq!(subjects(&state), vec!["restored"]);
        assert!(restored.0 > before.0);
    }

    #[test]
    fn replacing_a_duplicate_reports_the_existing_entry() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        reduce(&mut state, &config, NotifyAction::Receive(Notification::new("v1", "").with_id("m")));
        let existing = state.queue.newest().map(|queued| queued.entry).expect("entry");
        reduce(&mut state, &config, NotifyAction::Receive(Notification::new("x", "")));
        let effects = reduce(
            &mut state,
            &config,
            NotifyAction::Receive(Notification::new("v2", "").with_id("m")),
        );
        assert_eq!(effects.first(), Some(&NotifyEffect::Accepted(existing)));
    }

    #[test]
    fn toast_actions_forward_layout_commands() {
        let mut state = NotifyState::default();
        let config = NotifyConfig::default();
        let effects = reduce(
            &mut state,
            &config,
            NotifyAction::PresentToast {
                id: ToastId(1),
                owner: None,
                height: 40,
                position: ToastPosition::TopRight,
            },
        );
        assert_eq!(
            effects,
            vec![
                NotifyEffect::Toast(ToastCommand::Place { id: ToastId(1), y: 0 }),
                NotifyEffect::Toast(ToastCommand::Promoted {
                    id: ToastId(1),
                    owner: None
                }),
            ]
        );
        assert_eq!(
            reduce(&mut state, &config, NotifyAction::BeginHideToast { id: ToastId(1) }).len(),
            1
        );
        assert_eq!(
            reduce(&mut state, &config, NotifyAction::FinishHideToast { id: ToastId(1) }),
            vec![NotifyEffect::Toast(ToastCommand::Detach { id: ToastId(1) })]
        );
    }
}
