// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where the native push SDK is unavailable.
//
// State lives in memory behind a single mutex so host calls, editor commits
// and simulated SDK callbacks all see one consistent view. Callbacks are
// invoked after the lock is released.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airship_core::error::{AirshipError, Result};
use airship_core::types::{
    ActionResult, ActionStatus, ActiveNotification, EditKind, EditScope, Identity, InboxMessage,
    NotificationIdentifier, TagOperationType, TypedValue,
};
use serde_json::Value;

use crate::traits::*;

/// Handler standing in for a registered SDK action.
pub type StubAction = Arc<dyn Fn(&Value) -> ActionResult + Send + Sync>;

type TagGroups = BTreeMap<String, BTreeSet<String>>;

struct StubState {
    user_notifications_enabled: bool,
    opted_in: bool,
    push_token: Option<String>,
    push_token_registration_enabled: bool,
    channel_id: Option<String>,
    channel_creation_enabled: bool,
    tags: BTreeSet<String>,
    named_user_id: Option<String>,
    tag_groups: HashMap<Identity, TagGroups>,
    attributes: HashMap<Identity, BTreeMap<String, TypedValue>>,
    unavailable_scopes: HashSet<EditScope>,
    commits: HashMap<EditScope, usize>,
    analytics_enabled: bool,
    data_collection_enabled: bool,
    tracked_screens: Vec<String>,
    associated_identifiers: BTreeMap<String, String>,
    inbox: Vec<InboxMessage>,
    refresh_succeeds: bool,
    actions: HashMap<String, StubAction>,
    api_level: u32,
    active_notifications: Vec<ActiveNotification>,
    foreground_activity: bool,
    message_center_launches: Vec<Option<String>>,
    message_center_closes: usize,
    message_closes: usize,
}

/// In-memory push SDK returned on non-mobile platforms and used by tests.
pub struct StubBridge {
    state: Mutex<StubState>,
}

impl StubBridge {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StubState {
                user_notifications_enabled: false,
                opted_in: false,
                push_token: None,
                push_token_registration_enabled: true,
                channel_id: None,
                channel_creation_enabled: false,
                tags: BTreeSet::new(),
                named_user_id: None,
                tag_groups: HashMap::new(),
                attributes: HashMap::new(),
                unavailable_scopes: HashSet::new(),
                commits: HashMap::new(),
                analytics_enabled: true,
                data_collection_enabled: true,
                tracked_screens: Vec::new(),
                associated_identifiers: BTreeMap::new(),
                inbox: Vec::new(),
                refresh_succeeds: true,
                actions: HashMap::new(),
                api_level: 33,
                active_notifications: Vec::new(),
                foreground_activity: false,
                message_center_launches: Vec::new(),
                message_center_closes: 0,
                message_closes: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Simulation controls -------------------------------------------------

    /// Flip the platform notification permission.
    pub fn set_opted_in(&self, opted_in: bool) {
        self.state().opted_in = opted_in;
    }

    pub fn set_channel_id(&self, channel_id: Option<&str>) {
        self.state().channel_id = channel_id.map(str::to_string);
    }

    pub fn set_push_token(&self, token: Option<&str>) {
        self.state().push_token = token.map(str::to_string);
    }

    /// Make editors for `scope` fail to open.
    pub fn set_scope_available(&self, scope: EditScope, available: bool) {
        let mut state = self.state();
        if available {
            state.unavailable_scopes.remove(&scope);
        } else {
            state.unavailable_scopes.insert(scope);
        }
    }

    pub fn insert_message(&self, message: InboxMessage) {
        self.state().inbox.push(message);
    }

    pub fn set_refresh_succeeds(&self, succeeds: bool) {
        self.state().refresh_succeeds = succeeds;
    }

    pub fn register_action(
        &self,
        name: &str,
        handler: impl Fn(&Value) -> ActionResult + Send + Sync + 'static,
    ) {
        self.state()
            .actions
            .insert(name.to_string(), Arc::new(handler));
    }

    pub fn set_api_level(&self, level: u32) {
        self.state().api_level = level;
    }

    pub fn post_notification(&self, notification: ActiveNotification) {
        self.state().active_notifications.push(notification);
    }

    pub fn set_foreground_activity(&self, present: bool) {
        self.state().foreground_activity = present;
    }

    // -- Inspection ----------------------------------------------------------

    pub fn tag_groups(&self, identity: Identity) -> TagGroups {
        self.state()
            .tag_groups
            .get(&identity)
            .cloned()
            .unwrap_or_default()
    }

    pub fn attributes(&self, identity: Identity) -> BTreeMap<String, TypedValue> {
        self.state()
            .attributes
            .get(&identity)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful editor commits against `scope`.
    pub fn commit_count(&self, scope: EditScope) -> usize {
        self.state().commits.get(&scope).copied().unwrap_or(0)
    }

    pub fn associated_identifiers(&self) -> BTreeMap<String, String> {
        self.state().associated_identifiers.clone()
    }

    pub fn tracked_screens(&self) -> Vec<String> {
        self.state().tracked_screens.clone()
    }

    pub fn channel_creation_enabled(&self) -> bool {
        self.state().channel_creation_enabled
    }

    pub fn message_center_launches(&self) -> Vec<Option<String>> {
        self.state().message_center_launches.clone()
    }

    pub fn message_center_closes(&self) -> usize {
        self.state().message_center_closes
    }

    pub fn message_closes(&self) -> usize {
        self.state().message_closes
    }

    fn open_scope(&self, identity: Identity, kind: EditKind) -> Result<EditScope> {
        let scope = EditScope::new(identity, kind);
        if self.state().unavailable_scopes.contains(&scope) {
            tracing::warn!(%scope, "stub bridge: scope unavailable");
            return Err(AirshipError::ScopeUnavailable(scope.to_string()));
        }
        Ok(scope)
    }
}

impl Default for StubBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativePush for StubBridge {
    fn set_user_notifications_enabled(&self, enabled: bool) {
        self.state().user_notifications_enabled = enabled;
    }

    fn user_notifications_enabled(&self) -> bool {
        self.state().user_notifications_enabled
    }

    fn is_opted_in(&self) -> bool {
        self.state().opted_in
    }

    fn push_token(&self) -> Option<String> {
        self.state().push_token.clone()
    }

    fn set_push_token_registration_enabled(&self, enabled: bool) {
        self.state().push_token_registration_enabled = enabled;
    }

    fn push_token_registration_enabled(&self) -> bool {
        self.state().push_token_registration_enabled
    }
}

impl NativeChannel for StubBridge {
    fn channel_id(&self) -> Option<String> {
        self.state().channel_id.clone()
    }

    fn enable_channel_creation(&self) {
        self.state().channel_creation_enabled = true;
    }

    fn tags(&self) -> Vec<String> {
        self.state().tags.iter().cloned().collect()
    }

    fn add_tag(&self, tag: &str) {
        self.state().tags.insert(tag.to_string());
    }

    fn remove_tag(&self, tag: &str) {
        self.state().tags.remove(tag);
    }
}

impl NativeNamedUser for StubBridge {
    fn named_user_id(&self) -> Option<String> {
        self.state().named_user_id.clone()
    }

    fn set_named_user_id(&self, id: Option<&str>) {
        self.state().named_user_id = id.map(str::to_string);
    }
}

impl NativeAudience for StubBridge {
    fn edit_tag_groups(&self, identity: Identity) -> Result<Box<dyn TagGroupsEditor + '_>> {
        let scope = self.open_scope(identity, EditKind::TagGroups)?;
        Ok(Box::new(StubTagGroupsEditor {
            bridge: self,
            scope,
            pending: Vec::new(),
        }))
    }

    fn edit_attributes(&self, identity: Identity) -> Result<Box<dyn AttributeEditor + '_>> {
        let scope = self.open_scope(identity, EditKind::Attributes)?;
        Ok(Box::new(StubAttributeEditor {
            bridge: self,
            scope,
            pending: Vec::new(),
        }))
    }
}

impl NativeAnalytics for StubBridge {
    fn set_analytics_enabled(&self, enabled: bool) {
        self.state().analytics_enabled = enabled;
    }

    fn analytics_enabled(&self) -> bool {
        self.state().analytics_enabled
    }

    fn set_data_collection_enabled(&self, enabled: bool) {
        self.state().data_collection_enabled = enabled;
    }

    fn data_collection_enabled(&self) -> bool {
        self.state().data_collection_enabled
    }

    fn track_screen(&self, screen: &str) {
        self.state().tracked_screens.push(screen.to_string());
    }

    fn associate_identifier(&self, key: &str, value: Option<&str>) {
        let mut state = self.state();
        match value {
            Some(value) => {
                state
                    .associated_identifiers
                    .insert(key.to_string(), value.to_string());
            }
            None => {
                state.associated_identifiers.remove(key);
            }
        }
    }
}

impl NativeInbox for StubBridge {
    fn messages(&self) -> Vec<InboxMessage> {
        self.state()
            .inbox
            .iter()
            .filter(|m| !m.is_deleted)
            .cloned()
            .collect()
    }

    fn message(&self, id: &str) -> Option<InboxMessage> {
        self.state()
            .inbox
            .iter()
            .find(|m| m.id == id && !m.is_deleted)
            .cloned()
    }

    fn delete_message(&self, id: &str) {
        self.state().inbox.retain(|m| m.id != id);
    }

    fn mark_message_read(&self, id: &str) {
        if let Some(message) = self.state().inbox.iter_mut().find(|m| m.id == id) {
            message.is_read = true;
        }
    }

    fn fetch_messages(&self, on_finished: FetchCallback) {
        let succeeds = self.state().refresh_succeeds;
        on_finished(succeeds);
    }
}

impl NativeActions for StubBridge {
    fn run_action(&self, name: &str, value: Value, on_finish: ActionCallback) {
        let handler = self.state().actions.get(name).cloned();
        let result = match handler {
            Some(handler) => handler(&value),
            None => ActionResult::failed(ActionStatus::ActionNotFound, None),
        };
        on_finish(result);
    }
}

impl NativeNotifications for StubBridge {
    fn api_level(&self) -> u32 {
        self.state().api_level
    }

    fn active_notifications(&self) -> Vec<ActiveNotification> {
        self.state().active_notifications.clone()
    }

    fn cancel_notification(&self, identifier: &NotificationIdentifier) {
        self.state()
            .active_notifications
            .retain(|n| &n.identifier != identifier);
    }

    fn cancel_all_notifications(&self) {
        self.state().active_notifications.clear();
    }
}

impl NativeMessageCenter for StubBridge {
    fn show_message_center(&self, message_id: Option<&str>) {
        self.state()
            .message_center_launches
            .push(message_id.map(str::to_string));
    }

    fn has_foreground_activity(&self) -> bool {
        self.state().foreground_activity
    }

    fn close_message_center(&self) {
        self.state().message_center_closes += 1;
    }

    fn close_message(&self) {
        self.state().message_closes += 1;
    }
}

// ---------------------------------------------------------------------------
// Editors
// ---------------------------------------------------------------------------

struct StubTagGroupsEditor<'a> {
    bridge: &'a StubBridge,
    scope: EditScope,
    pending: Vec<(TagOperationType, String, BTreeSet<String>)>,
}

impl TagGroupsEditor for StubTagGroupsEditor<'_> {
    fn add_tags(&mut self, group: &str, tags: &BTreeSet<String>) {
        self.pending
            .push((TagOperationType::Add, group.to_string(), tags.clone()));
    }

    fn remove_tags(&mut self, group: &str, tags: &BTreeSet<String>) {
        self.pending
            .push((TagOperationType::Remove, group.to_string(), tags.clone()));
    }

    fn set_tags(&mut self, group: &str, tags: &BTreeSet<String>) {
        self.pending
            .push((TagOperationType::Set, group.to_string(), tags.clone()));
    }

    fn apply(self: Box<Self>) -> Result<()> {
        let Self {
            bridge,
            scope,
            pending,
        } = *self;
        let mut state = bridge.state();
        if state.unavailable_scopes.contains(&scope) {
            return Err(AirshipError::ScopeUnavailable(scope.to_string()));
        }

        let groups = state.tag_groups.entry(scope.identity()).or_default();
        for (operation, group, tags) in pending {
            match operation {
                TagOperationType::Add => groups.entry(group).or_default().extend(tags),
                TagOperationType::Remove => {
                    if let Some(existing) = groups.get_mut(&group) {
                        existing.retain(|t| !tags.contains(t));
                        if existing.is_empty() {
                            groups.remove(&group);
                        }
                    }
                }
                TagOperationType::Set => {
                    if tags.is_empty() {
                        groups.remove(&group);
                    } else {
                        groups.insert(group, tags);
                    }
                }
            }
        }

        *state.commits.entry(scope).or_insert(0) += 1;
        Ok(())
    }
}

enum AttributeMutation {
    Set(String, TypedValue),
    Remove(String),
}

struct StubAttributeEditor<'a> {
    bridge: &'a StubBridge,
    scope: EditScope,
    pending: Vec<AttributeMutation>,
}

impl AttributeEditor for StubAttributeEditor<'_> {
    fn set_attribute(&mut self, key: &str, value: &TypedValue) {
        self.pending
            .push(AttributeMutation::Set(key.to_string(), value.clone()));
    }

    fn remove_attribute(&mut self, key: &str) {
        self.pending.push(AttributeMutation::Remove(key.to_string()));
    }

    fn apply(self: Box<Self>) -> Result<()> {
        let Self {
            bridge,
            scope,
            pending,
        } = *self;
        let mut state = bridge.state();
        if state.unavailable_scopes.contains(&scope) {
            return Err(AirshipError::ScopeUnavailable(scope.to_string()));
        }

        let attributes = state.attributes.entry(scope.identity()).or_default();
        for mutation in pending {
            match mutation {
                AttributeMutation::Set(key, value) => {
                    attributes.insert(key, value);
                }
                AttributeMutation::Remove(key) => {
                    attributes.remove(&key);
                }
            }
        }

        *state.commits.entry(scope).or_insert(0) += 1;
        Ok(())
    }
}
