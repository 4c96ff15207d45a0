// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Snapshot builders: flat host-facing projections of native SDK records.

use std::collections::BTreeMap;

use airship_core::types::{
    ActiveNotification, InboxMessage, MessageSnapshot, NotificationIdentifier,
    NotificationSnapshot, PushMessage,
};
use serde_json::{Map, Value};

/// Push keys consumed by the snapshot itself or owned by the transport.
const RESERVED_KEYS: &[&str] = &[
    PushMessage::ALERT_KEY,
    PushMessage::TITLE_KEY,
    "from",
    "collapse_key",
];

const RESERVED_PREFIXES: &[&str] = &["google.", "gcm.", "android."];

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key) || RESERVED_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// String form of an arbitrary JSON value: strings verbatim, everything else
/// in its JSON text form.
fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_all<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>) -> BTreeMap<String, String> {
    entries.map(|(k, v)| (k.clone(), coerce(v))).collect()
}

pub fn message_snapshot(message: &InboxMessage) -> MessageSnapshot {
    MessageSnapshot {
        id: message.id.clone(),
        title: message.title.clone(),
        sent_date: message.sent_date.timestamp_millis(),
        list_icon_url: message.list_icon_url.clone(),
        is_read: message.is_read,
        is_deleted: message.is_deleted,
        extras: coerce_all(message.extras.iter()),
    }
}

/// Project a push payload, tagging it with the notification it was shown as.
pub fn push_snapshot(
    push: &PushMessage,
    identifier: Option<&NotificationIdentifier>,
) -> NotificationSnapshot {
    NotificationSnapshot {
        alert: push.alert().map(str::to_string),
        title: push.title().map(str::to_string),
        notification_id: identifier.map(ToString::to_string),
        extras: coerce_all(push.data.iter().filter(|(k, _)| !is_reserved(k))),
    }
}

/// Project a platform notification. A notification without an embedded
/// payload still yields a fully-shaped record.
pub fn notification_snapshot(notification: &ActiveNotification) -> NotificationSnapshot {
    let empty = PushMessage::new(Map::new());
    let push = notification.push.as_ref().unwrap_or(&empty);
    push_snapshot(push, Some(&notification.identifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn message_extras_are_all_strings() {
        let message = InboxMessage {
            id: "m1".into(),
            title: "Welcome".into(),
            sent_date: Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("ts"),
            list_icon_url: None,
            is_read: false,
            is_deleted: false,
            extras: object(json!({
                "plain": "text",
                "count": 3,
                "flag": true,
                "nothing": null,
                "nested": { "a": 1 },
            })),
        };

        let snapshot = message_snapshot(&message);

        assert_eq!(snapshot.sent_date, 1_700_000_000_123);
        assert_eq!(snapshot.extras["plain"], "text");
        assert_eq!(snapshot.extras["count"], "3");
        assert_eq!(snapshot.extras["flag"], "true");
        assert_eq!(snapshot.extras["nothing"], "null");
        assert_eq!(snapshot.extras["nested"], r#"{"a":1}"#);
    }

    #[test]
    fn message_snapshot_serialises_camel_case() {
        let message = InboxMessage {
            id: "m1".into(),
            title: "t".into(),
            sent_date: Utc.timestamp_millis_opt(5).single().expect("ts"),
            list_icon_url: Some("https://example.invalid/i.png".into()),
            is_read: true,
            is_deleted: false,
            extras: Map::new(),
        };
        let json = serde_json::to_value(message_snapshot(&message)).expect("serialise");
        assert_eq!(json["sentDate"], 5);
        assert_eq!(json["listIconUrl"], "https://example.invalid/i.png");
        assert_eq!(json["isRead"], true);
    }

    #[test]
    fn push_snapshot_splits_reserved_keys() {
        let push = PushMessage::new(object(json!({
            "com.urbanairship.push.ALERT": "Hello",
            "com.urbanairship.title": "Greeting",
            "google.sent_time": 1,
            "collapse_key": "x",
            "campaign": "spring",
            "score": 9,
        })));
        let id = NotificationIdentifier {
            id: 7,
            tag: Some("promo".into()),
        };

        let snapshot = push_snapshot(&push, Some(&id));

        assert_eq!(snapshot.alert.as_deref(), Some("Hello"));
        assert_eq!(snapshot.title.as_deref(), Some("Greeting"));
        assert_eq!(snapshot.notification_id.as_deref(), Some("7:promo"));
        assert_eq!(snapshot.extras.len(), 2);
        assert_eq!(snapshot.extras["campaign"], "spring");
        assert_eq!(snapshot.extras["score"], "9");
    }

    #[test]
    fn notification_without_payload_has_defined_shape() {
        let notification = ActiveNotification {
            identifier: NotificationIdentifier { id: 3, tag: None },
            push: None,
        };

        let snapshot = notification_snapshot(&notification);

        assert_eq!(snapshot.notification_id.as_deref(), Some("3"));
        assert!(snapshot.alert.is_none());
        assert!(snapshot.extras.is_empty());
        assert_eq!(json!(snapshot), json!({ "notificationId": "3", "extras": {} }));
    }
}
