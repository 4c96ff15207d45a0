// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native push SDK.
//
// The SDK owns registration, delivery and storage. These traits are the
// narrow surface the bridge module consumes; each platform (or the desktop
// stub) supplies one implementation of `PlatformBridge`.

use std::collections::BTreeSet;

use airship_core::error::Result;
use airship_core::types::{
    ActionResult, ActiveNotification, InboxMessage, Identity, NotificationIdentifier, TypedValue,
};
use serde_json::Value;

/// Completion callback for an inbox refresh. Receives `true` on success.
pub type FetchCallback = Box<dyn FnOnce(bool) + Send>;

/// Completion callback for an action run.
pub type ActionCallback = Box<dyn FnOnce(ActionResult) + Send>;

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge:
    NativePush
    + NativeChannel
    + NativeNamedUser
    + NativeAudience
    + NativeAnalytics
    + NativeInbox
    + NativeActions
    + NativeNotifications
    + NativeMessageCenter
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "Android 14").
    fn platform_name(&self) -> &str;
}

/// Push manager toggles and status.
pub trait NativePush {
    fn set_user_notifications_enabled(&self, enabled: bool);

    fn user_notifications_enabled(&self) -> bool;

    /// Whether the platform currently allows notifications to be displayed.
    fn is_opted_in(&self) -> bool;

    /// Push provider registration token, once one has been issued.
    fn push_token(&self) -> Option<String>;

    fn set_push_token_registration_enabled(&self, enabled: bool);

    fn push_token_registration_enabled(&self) -> bool;
}

/// The installation's channel identity.
pub trait NativeChannel {
    /// Channel id, or `None` before registration completes.
    fn channel_id(&self) -> Option<String>;

    /// Allow channel creation when the SDK was configured to delay it.
    fn enable_channel_creation(&self);

    fn tags(&self) -> Vec<String>;

    fn add_tag(&self, tag: &str);

    fn remove_tag(&self, tag: &str);
}

/// The app-assigned named user.
pub trait NativeNamedUser {
    fn named_user_id(&self) -> Option<String>;

    /// Associate the channel with `id`, or disassociate when `None`.
    fn set_named_user_id(&self, id: Option<&str>);
}

/// Scoped editors over tag groups and attributes.
///
/// Opening an editor fails with `AirshipError::ScopeUnavailable` when the
/// identity cannot currently accept edits.
pub trait NativeAudience {
    fn edit_tag_groups(&self, identity: Identity) -> Result<Box<dyn TagGroupsEditor + '_>>;

    fn edit_attributes(&self, identity: Identity) -> Result<Box<dyn AttributeEditor + '_>>;
}

/// Accumulates tag-group mutations until `apply` commits them together.
pub trait TagGroupsEditor {
    fn add_tags(&mut self, group: &str, tags: &BTreeSet<String>);

    fn remove_tags(&mut self, group: &str, tags: &BTreeSet<String>);

    /// Replace the group's tags with exactly `tags`.
    fn set_tags(&mut self, group: &str, tags: &BTreeSet<String>);

    /// Commit every recorded mutation, in recording order, or none of them.
    fn apply(self: Box<Self>) -> Result<()>;
}

/// Accumulates attribute mutations until `apply` commits them together.
pub trait AttributeEditor {
    fn set_attribute(&mut self, key: &str, value: &TypedValue);

    fn remove_attribute(&mut self, key: &str);

    /// Commit every recorded mutation, in recording order, or none of them.
    fn apply(self: Box<Self>) -> Result<()>;
}

/// Analytics and data-collection controls.
pub trait NativeAnalytics {
    fn set_analytics_enabled(&self, enabled: bool);

    fn analytics_enabled(&self) -> bool;

    fn set_data_collection_enabled(&self, enabled: bool);

    fn data_collection_enabled(&self) -> bool;

    fn track_screen(&self, screen: &str);

    /// Add an associated identifier, or remove it when `value` is `None`.
    fn associate_identifier(&self, key: &str, value: Option<&str>);
}

/// The message center inbox.
pub trait NativeInbox {
    fn messages(&self) -> Vec<InboxMessage>;

    fn message(&self, id: &str) -> Option<InboxMessage>;

    fn delete_message(&self, id: &str);

    fn mark_message_read(&self, id: &str);

    /// Refresh from the backend. `on_finished` is called exactly once.
    fn fetch_messages(&self, on_finished: FetchCallback);
}

/// The SDK's action runner.
pub trait NativeActions {
    /// Run the named action. `on_finish` is called exactly once.
    fn run_action(&self, name: &str, value: Value, on_finish: ActionCallback);
}

/// Platform notification manager.
pub trait NativeNotifications {
    /// Platform API level (Android `SDK_INT`).
    fn api_level(&self) -> u32;

    fn active_notifications(&self) -> Vec<ActiveNotification>;

    fn cancel_notification(&self, identifier: &NotificationIdentifier);

    fn cancel_all_notifications(&self);
}

/// Message center presentation. Pure side effects.
pub trait NativeMessageCenter {
    /// Launch the message center, optionally opened on one message.
    fn show_message_center(&self, message_id: Option<&str>);

    /// Whether a foreground activity exists to route close requests through.
    fn has_foreground_activity(&self) -> bool;

    fn close_message_center(&self);

    fn close_message(&self);
}

/// Small key/value store scoped to the application installation.
pub trait PreferenceStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    fn put_bool(&self, key: &str, value: bool) -> Result<()>;

    fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store `value`, or delete the key when `None`.
    fn put_string(&self, key: &str, value: Option<&str>) -> Result<()>;
}
