// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Module configuration and persisted preference keys.

use serde::{Deserialize, Serialize};

/// Fixed preference keys, scoped to the application installation.
pub mod keys {
    pub const OPT_IN_STATUS: &str = "com.urbanairship.reactnative.OPT_IN_STATUS";
    pub const NOTIFICATION_ICON: &str = "com.urbanairship.reactnative.NOTIFICATION_ICON";
    pub const NOTIFICATION_LARGE_ICON: &str =
        "com.urbanairship.reactnative.NOTIFICATION_LARGE_ICON";
    pub const NOTIFICATION_ACCENT_COLOR: &str =
        "com.urbanairship.reactnative.NOTIFICATION_ACCENT_COLOR";
    pub const DEFAULT_NOTIFICATION_CHANNEL_ID: &str =
        "com.urbanairship.reactnative.DEFAULT_NOTIFICATION_CHANNEL_ID";
    pub const AUTO_LAUNCH_MESSAGE_CENTER: &str = "com.urbanairship.auto_launch_message_center";
}

/// Bridge module settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Upper bound on events buffered while no host listener is attached.
    /// `None` keeps every event; `Some(n)` drops the oldest once `n` are held.
    pub event_buffer_capacity: Option<usize>,
    /// Lowest platform API level that can enumerate active notifications.
    pub min_active_notifications_api_level: u32,
    /// File name of the SQLite preference store inside the data directory.
    pub preferences_file: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            event_buffer_capacity: None,
            min_active_notifications_api_level: 23,
            preferences_file: "airship_prefs.db".into(),
        }
    }
}

/// Notification presentation settings pushed from the host.
///
/// Every field is optional; an absent field clears the stored preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    pub icon: Option<String>,
    pub large_icon: Option<String>,
    pub accent_color: Option<String>,
    pub default_channel_id: Option<String>,
}
