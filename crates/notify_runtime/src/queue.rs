//! Ordered notification queue with a weak "selected" reference.

use crate::config::AutoSelect;
use crate::model::{EntryId, Notification, NotificationId, QueuedNotification};
use crate::reducer::NotifyError;

#[derive(Debug, Clone, PartialEq)]
/// An entry taken out of the queue.
pub struct RemovedEntry {
    /// The removed record.
    pub record: QueuedNotification,
    /// Index the record occupied before removal.
    pub index: usize,
    /// Whether the record was the selected entry.
    pub was_selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Insertion-ordered notifications (oldest first) plus the current selection.
///
/// The selection is stored as an [`EntryId`], never as a copy of the record, so removing the
/// selected entry always revalidates it.
pub struct NotificationQueue {
    entries: Vec<QueuedNotification>,
    selected: Option<EntryId>,
    next_entry: u64,
}

impl NotificationQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification and returns its entry id.
    pub fn push(&mut self, notification: Notification) -> EntryId {
        self.next_entry += 1;
        let entry = EntryId(self.next_entry);
        self.entries.push(QueuedNotification {
            entry,
            notification,
        });
        entry
    }

    /// Overwrites the record stored for `entry`, keeping its position and identity.
    pub fn replace(&mut self, entry: EntryId, notification: Notification) -> bool {
        match self.entries.iter_mut().find(|queued| queued.entry == entry) {
            Some(queued) => {
                queued.notification = notification;
                true
            }
            None => false,
        }
    }

    /// Removes the entry at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<RemovedEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let record = self.entries.remove(index);
        let was_selected = self.selected == Some(record.entry);
        if was_selected {
            self.selected = None;
        }
        Some(RemovedEntry {
            record,
            index,
            was_selected,
        })
    }

    /// Removes an entry by reference identity.
    pub fn remove_entry(&mut self, entry: EntryId) -> Option<RemovedEntry> {
        let index = self.position(entry)?;
        self.remove_at(index)
    }

    /// Removes the first entry denoting the same notification as `notification`.
    pub fn remove_matching(&mut self, notification: &Notification) -> Option<RemovedEntry> {
        let entry = self.find_matching(notification)?;
        self.remove_entry(entry)
    }

    /// Removes the selected entry.
    pub fn remove_selected(&mut self) -> Option<RemovedEntry> {
        let entry = self.selected?;
        self.remove_entry(entry)
    }

    /// Empties the queue and resets the selection, returning the removed records oldest first.
    pub fn clear(&mut self) -> Vec<QueuedNotification> {
        self.selected = None;
        std::mem::take(&mut self.entries)
    }

    /// Selects an entry by reference identity.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::AlreadySelected`] or [`NotifyError::EntryNotFound`].
    pub fn select(&mut self, entry: EntryId) -> Result<&QueuedNotification, NotifyError> {
        if self.selected == Some(entry) {
            return Err(NotifyError::AlreadySelected);
        }
        let index = self.position(entry).ok_or(NotifyError::EntryNotFound)?;
        self.selected = Some(entry);
        Ok(&self.entries[index])
    }

    /// Selects the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::AlreadySelected`] or [`NotifyError::EntryNotFound`].
    pub fn select_at(&mut self, index: usize) -> Result<&QueuedNotification, NotifyError> {
        let entry = self
            .entries
            .get(index)
            .map(|queued| queued.entry)
            .ok_or(NotifyError::EntryNotFound)?;
        self.select(entry)
    }

    /// Selects the entry denoting the same notification, falling back to an identifier lookup
    /// for records rebuilt from persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::AlreadySelected`] or [`NotifyError::EntryNotFound`].
    pub fn select_matching(
        &mut self,
        notification: &Notification,
    ) -> Result<&QueuedNotification, NotifyError> {
        let entry = self
            .find_matching(notification)
            .ok_or(NotifyError::EntryNotFound)?;
        self.select(entry)
    }

    /// Moves the selection to the next entry.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::EntryNotFound`] at the end of the queue.
    pub fn select_next(&mut self) -> Result<&QueuedNotification, NotifyError> {
        let entry = self.next().map(|queued| queued.entry);
        self.select(entry.ok_or(NotifyError::EntryNotFound)?)
    }

    /// Moves the selection to the previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::EntryNotFound`] at the start of the queue or with no selection.
    pub fn select_previous(&mut self) -> Result<&QueuedNotification, NotifyError> {
        let entry = self.previous().map(|queued| queued.entry);
        self.select(entry.ok_or(NotifyError::EntryNotFound)?)
    }

    /// Clears the selection without touching the entries.
    pub fn deselect(&mut self) -> Option<EntryId> {
        self.selected.take()
    }

    /// Selects the oldest or newest entry when nothing is selected.
    ///
    /// Returns the newly selected entry.
    pub fn apply_auto_select(&mut self, policy: AutoSelect) -> Option<EntryId> {
        if self.selected.is_some() {
            return None;
        }
        let entry = match policy {
            AutoSelect::Disabled => None,
            AutoSelect::Oldest => self.oldest().map(|queued| queued.entry),
            AutoSelect::Newest => self.newest().map(|queued| queued.entry),
        }?;
        self.selected = Some(entry);
        Some(entry)
    }

    /// Returns the entry at `index`.
    pub fn get_at(&self, index: usize) -> Option<&QueuedNotification> {
        self.entries.get(index)
    }

    /// Returns the entry with reference identity `entry`.
    pub fn get(&self, entry: EntryId) -> Option<&QueuedNotification> {
        self.entries.iter().find(|queued| queued.entry == entry)
    }

    /// Returns the entry after the selection, or the oldest entry when nothing is selected.
    pub fn next(&self) -> Option<&QueuedNotification> {
        match self.selected_index() {
            Some(index) => self.entries.get(index + 1),
            None => self.entries.first(),
        }
    }

    /// Returns the entry before the selection.
    pub fn previous(&self) -> Option<&QueuedNotification> {
        let index = self.selected_index()?;
        index.checked_sub(1).and_then(|prev| self.entries.get(prev))
    }

    /// Returns the oldest entry.
    pub fn oldest(&self) -> Option<&QueuedNotification> {
        self.entries.first()
    }

    /// Returns the newest entry.
    pub fn newest(&self) -> Option<&QueuedNotification> {
        self.entries.last()
    }

    /// Returns the selected entry.
    pub fn selected(&self) -> Option<&QueuedNotification> {
        self.get(self.selected?)
    }

    /// Returns the selected entry id.
    pub fn selected_entry(&self) -> Option<EntryId> {
        self.selected
    }

    /// Returns the index of the selected entry.
    pub fn selected_index(&self) -> Option<usize> {
        self.position(self.selected?)
    }

    /// Returns the number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedNotification> {
        self.entries.iter()
    }

    /// Returns the records oldest first, the form mirrored to session storage.
    pub fn notifications(&self) -> Vec<Notification> {
        self.entries
            .iter()
            .map(|queued| queued.notification.clone())
            .collect()
    }

    /// Returns the entry holding `id`.
    pub fn find_by_id(&self, id: &NotificationId) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|queued| queued.notification.id.as_ref() == Some(id))
            .map(|queued| queued.entry)
    }

    /// Returns the index of `entry`.
    pub fn position(&self, entry: EntryId) -> Option<usize> {
        self.entries.iter().position(|queued| queued.entry == entry)
    }

    fn find_matching(&self, notification: &Notification) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|queued| queued.notification.same_identity(notification))
            .map(|queued| queued.entry)
    }
}
