//! Conversion of raw push payloads and mailbox records into [`Notification`]s.

use notify_host::{MailRecord, ToastPosition};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::NotifyConfig;
use crate::model::{Notification, NotificationId, NotificationOrigin};

const CONSUMED_METADATA_KEYS: &[&str] = &[
    "desc", "subject", "url", "icon", "priority", "mailId", "id", "position", "time", "group",
    "username",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// A payload that cannot become a [`Notification`].
pub enum NormalizeError {
    /// The payload is not a JSON object.
    #[error("notification payload is not an object")]
    NotAnObject,
    /// The `message` envelope is missing.
    #[error("notification payload has no message")]
    MissingMessage,
    /// `message.metadata.desc` is missing or not a string.
    #[error("notification payload has no description")]
    MissingDescription,
}

/// Normalizes a live push payload.
///
/// Expected shape: `{ message: { payload, metadata }, time, group, username }`.
///
/// # Errors
///
/// Returns a [`NormalizeError`] when required fields are missing.
pub fn normalize_push_payload(
    raw: &Value,
    config: &NotifyConfig,
) -> Result<Notification, NormalizeError> {
    let envelope = raw.as_object().ok_or(NormalizeError::NotAnObject)?;
    let message = envelope
        .get("message")
        .and_then(Value::as_object)
        .ok_or(NormalizeError::MissingMessage)?;
    let mut notification = normalize_message(message, config)?;

    if let Some(time) = envelope.get("time").and_then(Value::as_u64) {
        notification.time = Some(time);
    }
    if let Some(group) = envelope.get("group").and_then(Value::as_str) {
        notification.group = Some(group.to_string());
    }
    if let Some(username) = envelope.get("username").and_then(Value::as_str) {
        notification.username = Some(username.to_string());
    }
    notification.origin = NotificationOrigin::Push;
    Ok(notification)
}

/// Normalizes a record fetched from the mailbox.
///
/// The record payload may be either a full push envelope or a bare `{ payload, metadata }`
/// message. The mailbox id always wins over any id in the metadata.
///
/// # Errors
///
/// Returns a [`NormalizeError`] when required fields are missing.
pub fn normalize_mail_record(
    record: &MailRecord,
    config: &NotifyConfig,
) -> Result<Notification, NormalizeError> {
    let object = record
        .payload
        .as_object()
        .ok_or(NormalizeError::NotAnObject)?;
    let mut notification = if object.contains_key("message") {
        normalize_push_payload(&record.payload, config)?
    } else {
        normalize_message(object, config)?
    };
    notification.id = Some(NotificationId::new(record.id.clone()));
    notification.origin = NotificationOrigin::Mailbox;
    Ok(notification)
}

fn normalize_message(
    message: &Map<String, Value>,
    config: &NotifyConfig,
) -> Result<Notification, NormalizeError> {
    let empty = Map::new();
    let metadata = message
        .get("metadata")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let payload = message
        .get("payload")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let detail = metadata
        .get("desc")
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingDescription)?
        .to_string();
    let subject = string_field(metadata, "subject")
        .or_else(|| string_field(payload, "subject"))
        .or_else(|| config.title().map(str::to_string))
        .unwrap_or_default();
    let icon = string_field(metadata, "icon").or_else(|| config.icon().map(str::to_string));
    let id = string_field(metadata, "mailId")
        .or_else(|| string_field(metadata, "id"))
        .map(NotificationId::new);

    let mut extra = Map::new();
    for (key, value) in metadata {
        if !CONSUMED_METADATA_KEYS.contains(&key.as_str()) {
            extra.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in payload {
        if key != "subject" {
            extra.insert(key.clone(), value.clone());
        }
    }

    Ok(Notification {
        id,
        subject,
        detail,
        icon,
        url: string_field(metadata, "url"),
        priority: string_field(metadata, "priority"),
        time: metadata.get("time").and_then(Value::as_u64),
        group: string_field(metadata, "group"),
        username: string_field(metadata, "username"),
        position: metadata
            .get("position")
            .and_then(Value::as_str)
            .and_then(ToastPosition::parse),
        origin: NotificationOrigin::Push,
        extra,
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn push_payload_maps_metadata_and_envelope() {
        let raw = json!({
            "message": {
                "payload": { "orderId": 42, "subject": "from payload" },
                "metadata": {
                    "desc": "Order shipped",
                    "subject": "Orders",
                    "url": "https://shop.test/orders?id=42",
                    "priority": "high",
                    "carrier": "post"
                }
            },
            "time": 1_700_000_000_000u64,
            "group": "orders",
            "username": "ops"
        });

        let notification = normalize_push_payload(&raw, &NotifyConfig::default()).expect("ok");
        assert_eq!(notification.subject, "Orders");
        assert_eq!(notification.detail, "Order shipped");
        assert_eq!(notification.url.as_deref(), Some("https://shop.test/orders?id=42"));
        assert_eq!(notification.priority.as_deref(), Some("high"));
        assert_eq!(notification.time, Some(1_700_000_000_000));
        assert_eq!(notification.group.as_deref(), Some("orders"));
        assert_eq!(notification.username.as_deref(), Some("ops"));
        assert_eq!(notification.id, None);
        assert_eq!(notification.origin, NotificationOrigin::Push);
        assert_eq!(
            Value::Object(notification.extra),
            json!({ "carrier": "post", "orderId": 42 })
        );
    }

    #[test]
    fn subject_and_icon_fall_back_to_configuration() {
        let config = NotifyConfig::builder()
            .with_title("Alerts")
            .with_icon("/bell.png")
            .build()
            .expect("config");
        let raw = json!({ "message": { "metadata": { "desc": "ping" } } });

        let notification = normalize_push_payload(&raw, &config).expect("ok");
        assert_eq!(notification.subject, "Alerts");
        assert_eq!(notification.icon.as_deref(), Some("/bell.png"));
    }

    #[test]
    fn payload_keys_win_over_metadata_keys_in_extra() {
        let raw = json!({
            "message": {
                "payload": { "status": "payload" },
                "metadata": { "desc": "d", "status": "metadata" }
            }
        });
        let notification = normalize_push_payload(&raw, &NotifyConfig::default()).expect("ok");
        assert_eq!(notification.extra.get("status"), Some(&json!("payload")));
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        let config = NotifyConfig::default();
        assert_eq!(
            normalize_push_payload(&json!("text"), &config),
            Err(NormalizeError::NotAnObject)
        );
        assert_eq!(
            normalize_push_payload(&json!({ "time": 1 }), &config),
            Err(NormalizeError::MissingMessage)
        );
        assert_eq!(
            normalize_push_payload(&json!({ "message": { "metadata": {} } }), &config),
            Err(NormalizeError::MissingDescription)
        );
    }

    #[test]
    fn mail_records_carry_the_mailbox_id() {
        let record = MailRecord {
            id: "mail-7".to_string(),
            payload: json!({ "metadata": { "desc": "stored", "mailId": "ignored" } }),
        };
        let notification = normalize_mail_record(&record, &NotifyConfig::default()).expect("ok");
        assert_eq!(notification.id, Some(NotificationId::new("mail-7")));
        assert_eq!(notification.origin, NotificationOrigin::Mailbox);
        assert!(notification.is_mailbox_backed());
    }

    #[test]
    fn metadata_mail_id_identifies_live_payloads() {
        let raw = json!({ "message": { "metadata": { "desc": "d", "mailId": "m-1" } } });
        let notification = normalize_push_payload(&raw, &NotifyConfig::default()).expect("ok");
        assert_eq!(notification.id, Some(NotificationId::new("m-1")));
    }
}
