//! Copies fields of the selected notification into marked page elements.

use notify_host::{ElementKind, InjectionTarget, RenderedValue};
use serde_json::Value;

use crate::model::Notification;

/// Attribute prefix marking an element as an injection target.
pub const MARKER_PREFIX: &str = "data-selected-";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A flattened notification field.
pub enum FieldValue {
    /// A scalar rendered as text.
    Scalar(String),
    /// A multi-valued field.
    List(Vec<String>),
}

/// Returns the marker attribute for a field path.
pub fn marker_for(path: &str) -> String {
    format!("{MARKER_PREFIX}{path}")
}

/// Flattens a notification into `(field-path, value)` pairs.
///
/// Nested `extra` objects join their keys with `-`. Absent optional fields are skipped.
pub fn field_values(notification: &Notification) -> Vec<(String, FieldValue)> {
    let mut fields = Vec::new();
    let mut scalar = |path: &str, value: Option<String>| {
        if let Some(value) = value {
            fields.push((path.to_string(), FieldValue::Scalar(value)));
        }
    };
    scalar("id", notification.id.as_ref().map(ToString::to_string));
    scalar("subject", Some(notification.subject.clone()));
    scalar("detail", Some(notification.detail.clone()));
    scalar("icon", notification.icon.clone());
    scalar("url", notification.url.clone());
    scalar("priority", notification.priority.clone());
    scalar("time", notification.time.map(|time| time.to_string()));
    scalar("group", notification.group.clone());
    scalar("username", notification.username.clone());

    for (key, value) in &notification.extra {
        flatten(key, value, &mut fields);
    }
    fields
}

fn flatten(path: &str, value: &Value, fields: &mut Vec<(String, FieldValue)>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(&format!("{path}-{key}"), nested, fields);
            }
        }
        Value::Array(items) => {
            fields.push((
                path.to_string(),
                FieldValue::List(items.iter().map(scalar_text).collect()),
            ));
        }
        other => fields.push((path.to_string(), FieldValue::Scalar(scalar_text(other)))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Renders a field for one element kind.
pub fn render(value: &FieldValue, kind: ElementKind) -> RenderedValue {
    match (value, kind) {
        (FieldValue::Scalar(text), ElementKind::Text) => RenderedValue::Text(text.clone()),
        (FieldValue::Scalar(text), ElementKind::Input) => RenderedValue::Value(text.clone()),
        (FieldValue::Scalar(text), ElementKind::Select) => RenderedValue::Options(vec![text.clone()]),
        (FieldValue::List(items), ElementKind::Select) => RenderedValue::Options(items.clone()),
        (FieldValue::List(items), ElementKind::Text) => RenderedValue::Text(items.join(", ")),
        (FieldValue::List(items), ElementKind::Input) => RenderedValue::Value(items.join(", ")),
    }
}

/// Writes every field of `notification` into its marked elements and returns the number of
/// elements written.
pub fn inject(target: &dyn InjectionTarget, notification: &Notification) -> usize {
    let mut written = 0;
    for (path, value) in field_values(notification) {
        for element in target.find_marked(&marker_for(&path)) {
            target.write(&element, &render(&value, element.kind));
            written += 1;
        }
    }
    written
}

/// Blanks every element that [`inject`] would write for `notification`.
pub fn clear(target: &dyn InjectionTarget, notification: &Notification) -> usize {
    let mut written = 0;
    for (path, _) in field_values(notification) {
        for element in target.find_marked(&marker_for(&path)) {
            target.write(&element, &RenderedValue::blank(element.kind));
            written += 1;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use notify_host::MemoryInjectionTarget;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn inject_then_clear_round_trips_subject() {
        let page = MemoryInjectionTarget::default();
        page.add_element("data-selected-subject", ElementKind::Text);
        let notification = Notification::new("Hello", "world");

        assert_eq!(inject(&page, &notification), 1);
        assert_eq!(page.displayed("data-selected-subject").as_deref(), Some("Hello"));

        clear(&page, &notification);
        assert_eq!(page.displayed("data-selected-subject").as_deref(), Some(""));
    }

    #[test]
    fn nested_extra_keys_join_with_dashes() {
        let notification = Notification::new("s", "d")
            .with_extra("order", json!({ "id": 5, "lines": ["a", "b"] }));
        let fields = field_values(&notification);
        assert!(fields.contains(&("order-id".to_string(), FieldValue::Scalar("5".to_string()))));
        assert!(fields.contains(&(
            "order-lines".to_string(),
            FieldValue::List(vec!["a".to_string(), "b".to_string()])
        )));
    }

    #[test]
    fn rendering_depends_on_element_kind() {
        let page = MemoryInjectionTarget::default();
        page.add_element("data-selected-tags", ElementKind::Select);
        page.add_element("data-selected-tags", ElementKind::Text);
        page.add_element("data-selected-detail", ElementKind::Input);
        let notification = Notification::new("s", "body").with_extra("tags", json!(["x", "y"]));

        assert_eq!(inject(&page, &notification), 3);
        assert_eq!(
            page.contents("data-selected-tags"),
            vec![
                RenderedValue::Options(vec!["x".to_string(), "y".to_string()]),
                RenderedValue::Text("x, y".to_string()),
            ]
        );
        assert_eq!(
            page.contents("data-selected-detail"),
            vec![RenderedValue::Value("body".to_string())]
        );
    }

    #[test]
    fn absent_optional_fields_are_not_written() {
        let page = MemoryInjectionTarget::default();
        page.add_element("data-selected-url", ElementKind::Text);
        assert_eq!(inject(&page, &Notification::new("s", "d")), 0);
    }
}
