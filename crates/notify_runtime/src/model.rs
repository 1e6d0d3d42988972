//! Notification records and queue entry identities.

use std::fmt;

use notify_host::ToastPosition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Transport-agnostic identifier of a mailbox-backed notification.
pub struct NotificationId(pub String);

impl NotificationId {
    /// Wraps an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Reference identity of one queue entry, unique for the lifetime of a queue.
pub struct EntryId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Where a notification came from.
pub enum NotificationOrigin {
    /// Delivered live by the push channel.
    #[default]
    Push,
    /// Fetched from the persistent mailbox.
    Mailbox,
    /// Created by the embedding application.
    Local,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A normalized notification record.
pub struct Notification {
    /// Mailbox identifier; present only for persisted notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NotificationId>,
    /// Display title.
    #[serde(default)]
    pub subject: String,
    /// Display body.
    #[serde(default)]
    pub detail: String,
    /// Icon or badge URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Redirect target used when the notification is clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Priority or category tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    /// Broadcast group the notification was sent to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Corner override, honored when per-notification positions are enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ToastPosition>,
    /// Source of the record.
    #[serde(default)]
    pub origin: NotificationOrigin,
    /// Application-defined fields available for injection.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Notification {
    /// Creates a local notification with a subject and detail.
    pub fn new(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            detail: detail.into(),
            origin: NotificationOrigin::Local,
            ..Self::default()
        }
    }

    /// Sets the mailbox identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(NotificationId::new(id));
        self
    }

    /// Sets the redirect URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: NotificationOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the corner override.
    #[must_use]
    pub fn with_position(mut self, position: ToastPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Adds an application-defined field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns whether `other` denotes the same notification.
    ///
    /// Identifier-backed records match by id. Records without an id only match an identical record.
    pub fn same_identity(&self, other: &Notification) -> bool {
        match (&self.id, &other.id) {
            (Some(left), Some(right)) => left == right,
            (None, None) => self == other,
            _ => false,
        }
    }

    /// Returns whether removing this record should also delete it from the mailbox.
    pub fn is_mailbox_backed(&self) -> bool {
        self.id.is_some() && self.origin == NotificationOrigin::Mailbox
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A notification together with its queue entry identity.
pub struct QueuedNotification {
    /// Reference identity inside the queue.
    pub entry: EntryId,
    /// The record.
    pub notification: Notification,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn identity_prefers_ids_and_falls_back_to_equality() {
        let a = Notification::new("Build", "passed").with_id("m-1");
        let renamed = Notification::new("Build (edited)", "passed").with_id("m-1");
        assert!(a.same_identity(&renamed));

        let plain = Notification::new("Build", "passed");
        assert!(plain.same_identity(&plain.clone()));
        assert!(!plain.same_identity(&a));
        assert!(!plain.same_identity(&Notification::new("Build", "failed")));
    }

    #[test]
    fn serialized_form_omits_empty_fields() {
        let notification = Notification::new("Hi", "there").with_extra("orderId", json!(7));
        let value = serde_json::to_value(&notification).expect("serialize");
        assert_eq!(
            value,
            json!({
                "subject": "Hi",
                "detail": "there",
                "origin": "local",
                "extra": { "orderId": 7 }
            })
        );
        let back: Notification = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, notification);
    }

    #[test]
    fn only_identified_mailbox_records_are_mailbox_backed() {
        assert!(Notification::new("a", "b")
            .with_id("x")
            .with_origin(NotificationOrigin::Mailbox)
            .is_mailbox_backed());
        assert!(!Notification::new("a", "b").with_id("x").is_mailbox_backed());
        assert!(!Notification::new("a", "b")
            .with_origin(NotificationOrigin::Mailbox)
            .is_mailbox_backed());
    }
}
