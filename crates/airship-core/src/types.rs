// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Airship bridge.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::error::AirshipError;

/// Unique identifier for an in-flight host request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identity scopes
// ---------------------------------------------------------------------------

/// Which SDK identity an edit is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// The device/app installation.
    Channel,
    /// The app-assigned user id, possibly spanning several channels.
    NamedUser,
}

/// What an edit batch mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKind {
    TagGroups,
    Attributes,
}

/// Target of one operation batch: an identity paired with an edit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditScope {
    ChannelTagGroups,
    NamedUserTagGroups,
    ChannelAttributes,
    NamedUserAttributes,
}

impl EditScope {
    /// Every scope, in the order used by [`EditScope::index`].
    pub const ALL: [EditScope; 4] = [
        Self::ChannelTagGroups,
        Self::NamedUserTagGroups,
        Self::ChannelAttributes,
        Self::NamedUserAttributes,
    ];

    pub fn new(identity: Identity, kind: EditKind) -> Self {
        match (identity, kind) {
            (Identity::Channel, EditKind::TagGroups) => Self::ChannelTagGroups,
            (Identity::NamedUser, EditKind::TagGroups) => Self::NamedUserTagGroups,
            (Identity::Channel, EditKind::Attributes) => Self::ChannelAttributes,
            (Identity::NamedUser, EditKind::Attributes) => Self::NamedUserAttributes,
        }
    }

    pub fn identity(&self) -> Identity {
        match self {
            Self::ChannelTagGroups | Self::ChannelAttributes => Identity::Channel,
            Self::NamedUserTagGroups | Self::NamedUserAttributes => Identity::NamedUser,
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            Self::ChannelTagGroups | Self::NamedUserTagGroups => EditKind::TagGroups,
            Self::ChannelAttributes | Self::NamedUserAttributes => EditKind::Attributes,
        }
    }

    /// Stable position of this scope within [`EditScope::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::ChannelTagGroups => 0,
            Self::NamedUserTagGroups => 1,
            Self::ChannelAttributes => 2,
            Self::NamedUserAttributes => 3,
        }
    }
}

impl std::fmt::Display for EditScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ChannelTagGroups => "channel tag groups",
            Self::NamedUserTagGroups => "named user tag groups",
            Self::ChannelAttributes => "channel attributes",
            Self::NamedUserAttributes => "named user attributes",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Edit operations
// ---------------------------------------------------------------------------

/// Strongly-typed attribute value.
///
/// Timestamps cross the host boundary as milliseconds since the Unix epoch;
/// no local-time representation is ever involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    String(String),
    Number(f64),
    #[serde(with = "chrono::serde::ts_milliseconds")]
    Timestamp(DateTime<Utc>),
}

impl TypedValue {
    /// Build a timestamp from epoch milliseconds.
    ///
    /// Returns `None` when the value lies outside chrono's representable range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::Timestamp)
    }

    /// Epoch milliseconds for timestamp values, `None` otherwise.
    pub fn epoch_millis(&self) -> Option<i64> {
        match self {
            Self::Timestamp(ts) => Some(ts.timestamp_millis()),
            _ => None,
        }
    }
}

/// Tag-group mutation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagOperationType {
    Add,
    Remove,
    Set,
}

impl TagOperationType {
    /// Parse the host wire keyword. Unknown keywords yield `None`.
    pub fn from_wire(keyword: &str) -> Option<Self> {
        match keyword {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            "set" => Some(Self::Set),
            _ => None,
        }
    }
}

/// One validated tag-group edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroupOperation {
    pub group: String,
    pub operation: TagOperationType,
    /// Deduplicated tag set.
    pub tags: BTreeSet<String>,
}

/// One validated attribute edit.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeOperation {
    Set { key: String, value: TypedValue },
    Remove { key: String },
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Completion status reported by the SDK's action runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    Completed,
    RejectedArguments,
    ActionNotFound,
    ExecutionError,
}

/// Outcome of running an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub status: ActionStatus,
    /// JSON result value; only meaningful when `status` is `Completed`.
    pub value: Value,
    /// Failure detail for `ExecutionError`.
    pub error: Option<String>,
}

impl ActionResult {
    pub fn completed(value: Value) -> Self {
        Self {
            status: ActionStatus::Completed,
            value,
            error: None,
        }
    }

    pub fn failed(status: ActionStatus, error: Option<String>) -> Self {
        Self {
            status,
            value: Value::Null,
            error,
        }
    }
}

// ---------------------------------------------------------------------------
// Native SDK records
// ---------------------------------------------------------------------------

/// A message held in the SDK's inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct InboxMessage {
    pub id: String,
    pub title: String,
    pub sent_date: DateTime<Utc>,
    pub list_icon_url: Option<String>,
    pub is_read: bool,
    pub is_deleted: bool,
    /// Extras as delivered by the SDK; values may be of any JSON type.
    pub extras: Map<String, Value>,
}

/// Push payload bundle embedded in a delivered notification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushMessage {
    pub data: Map<String, Value>,
}

impl PushMessage {
    /// Payload key carrying the alert text.
    pub const ALERT_KEY: &'static str = "com.urbanairship.push.ALERT";
    /// Payload key carrying the notification title.
    pub const TITLE_KEY: &'static str = "com.urbanairship.title";

    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn alert(&self) -> Option<&str> {
        self.data.get(Self::ALERT_KEY).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.data.get(Self::TITLE_KEY).and_then(Value::as_str)
    }
}

/// Platform notification identity: numeric id plus optional tag.
///
/// On the wire this is `"<id>"` or `"<id>:<tag>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationIdentifier {
    pub id: i32,
    pub tag: Option<String>,
}

impl std::fmt::Display for NotificationIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}:{}", self.id, tag),
            None => write!(f, "{}", self.id),
        }
    }
}

impl FromStr for NotificationIdentifier {
    type Err = AirshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id_part, tag) = match s.split_once(':') {
            Some((id, tag)) => (id, Some(tag.to_string())),
            None => (s, None),
        };
        let id = id_part
            .parse::<i32>()
            .map_err(|_| AirshipError::InvalidIdentifier(s.to_string()))?;
        Ok(Self { id, tag })
    }
}

/// A notification currently shown by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveNotification {
    pub identifier: NotificationIdentifier,
    /// Embedded push payload, if the notification carried one.
    pub push: Option<PushMessage>,
}

// ---------------------------------------------------------------------------
// Snapshots handed to the host
// ---------------------------------------------------------------------------

/// Flat, host-facing projection of an inbox message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSnapshot {
    pub id: String,
    pub title: String,
    /// Epoch milliseconds.
    pub sent_date: i64,
    pub list_icon_url: Option<String>,
    pub is_read: bool,
    pub is_deleted: bool,
    pub extras: BTreeMap<String, String>,
}

/// Flat, host-facing projection of a notification or received push.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    pub extras: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Event channel names seen by the host.
pub mod channels {
    pub const PUSH_RECEIVED: &str = "com.urbanairship.push_received";
    pub const NOTIFICATION_OPT_IN_STATUS: &str = "com.urbanairship.notification_opt_in_status";
    pub const REGISTRATION: &str = "com.urbanairship.registration";
    pub const INBOX_UPDATED: &str = "com.urbanairship.inbox_updated";
    pub const DEEP_LINK: &str = "com.urbanairship.deep_link";
}

/// SDK-originated event destined for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    NotificationOptInChanged {
        opt_in: bool,
    },
    PushReceived(NotificationSnapshot),
    RegistrationChanged {
        channel_id: Option<String>,
        registration_token: Option<String>,
    },
    InboxUpdated {
        message_unread_count: usize,
        message_count: usize,
    },
    DeepLink {
        deep_link: String,
    },
}

impl Event {
    /// Channel this event is published on.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::NotificationOptInChanged { .. } => channels::NOTIFICATION_OPT_IN_STATUS,
            Self::PushReceived(_) => channels::PUSH_RECEIVED,
            Self::RegistrationChanged { .. } => channels::REGISTRATION,
            Self::InboxUpdated { .. } => channels::INBOX_UPDATED,
            Self::DeepLink { .. } => channels::DEEP_LINK,
        }
    }

    /// JSON body of this event.
    pub fn payload(&self) -> Value {
        match self {
            Self::NotificationOptInChanged { opt_in } => json!({ "optIn": opt_in }),
            Self::PushReceived(snapshot) => json!(snapshot),
            Self::RegistrationChanged {
                channel_id,
                registration_token,
            } => json!(RegistrationBody {
                channel_id: channel_id.as_deref(),
                registration_token: registration_token.as_deref(),
            }),
            Self::InboxUpdated {
                message_unread_count,
                message_count,
            } => json!({
                "messageUnreadCount": message_unread_count,
                "messageCount": message_count,
            }),
            Self::DeepLink { deep_link } => json!({ "deepLink": deep_link }),
        }
    }

    /// Normalise into the record relayed to the host.
    pub fn into_host_event(self) -> HostEvent {
        HostEvent {
            channel: self.channel().to_string(),
            payload: self.payload(),
        }
    }
}

/// Registration event body; absent identifiers are omitted.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    registration_token: Option<&'a str>,
}

/// Normalised event record as carried by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    pub channel: String,
    pub payload: Value,
}

impl From<Event> for HostEvent {
    fn from(event: Event) -> Self {
        event.into_host_event()
    }
}
