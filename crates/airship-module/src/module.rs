// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-call facade.
//
// `AirshipModule` is the single object the scripting host talks to. It owns
// the event relay, batch engine, opt-in detector and preferences, and holds
// the native SDK behind `PlatformBridge`. Simple getters return plain values
// (they always resolve); calls with failure outcomes return `HostResult` or a
// `PendingRequest`. Setters and batch edits are fire-and-forget: failures are
// logged, never surfaced.

use std::sync::Arc;

use airship_bridge::traits::{PlatformBridge, PreferenceStore};
use airship_core::config::{ModuleConfig, NotificationConfig};
use airship_core::error::AirshipError;
use airship_core::types::{
    ActionResult, ActionStatus, Event, Identity, MessageSnapshot, NotificationIdentifier,
    NotificationSnapshot, PushMessage,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::batch::BatchEngine;
use crate::opt_in::OptInDetector;
use crate::preferences::ModulePreferences;
use crate::promise::{HostResult, PendingRequest, Rejection, request};
use crate::relay::{EventRelay, EventSink};
use crate::snapshot::{message_snapshot, notification_snapshot, push_snapshot};

pub struct AirshipModule {
    sdk: Arc<dyn PlatformBridge>,
    relay: EventRelay,
    batches: BatchEngine,
    opt_in: OptInDetector,
    preferences: ModulePreferences,
    config: ModuleConfig,
}

impl AirshipModule {
    pub fn new(
        sdk: Arc<dyn PlatformBridge>,
        store: Arc<dyn PreferenceStore>,
        sink: Arc<dyn EventSink>,
        config: ModuleConfig,
    ) -> Self {
        let relay = EventRelay::with_capacity(sink, config.event_buffer_capacity);
        let preferences = ModulePreferences::new(store);
        info!(platform = sdk.platform_name(), "airship module initialised");
        Self {
            sdk,
            relay,
            batches: BatchEngine::new(),
            opt_in: OptInDetector::new(preferences.clone()),
            preferences,
            config,
        }
    }

    // -- Push ----------------------------------------------------------------

    pub fn set_user_notifications_enabled(&self, enabled: bool) {
        self.sdk.set_user_notifications_enabled(enabled);
    }

    pub fn is_user_notifications_enabled(&self) -> bool {
        self.sdk.user_notifications_enabled()
    }

    /// Turn user notifications on. Always resolves `true`.
    pub fn enable_user_push_notifications(&self) -> bool {
        self.sdk.set_user_notifications_enabled(true);
        true
    }

    pub fn is_user_notifications_opted_in(&self) -> bool {
        self.sdk.is_opted_in()
    }

    pub fn set_push_token_registration_enabled(&self, enabled: bool) {
        self.sdk.set_push_token_registration_enabled(enabled);
    }

    pub fn is_push_token_registration_enabled(&self) -> bool {
        self.sdk.push_token_registration_enabled()
    }

    pub fn get_registration_token(&self) -> Option<String> {
        self.sdk.push_token()
    }

    // -- Channel -------------------------------------------------------------

    pub fn get_channel_id(&self) -> Option<String> {
        self.sdk.channel_id()
    }

    pub fn enable_channel_creation(&self) {
        self.sdk.enable_channel_creation();
    }

    pub fn add_tag(&self, tag: Option<&str>) {
        if let Some(tag) = tag {
            self.sdk.add_tag(tag);
        }
    }

    pub fn remove_tag(&self, tag: Option<&str>) {
        if let Some(tag) = tag {
            self.sdk.remove_tag(tag);
        }
    }

    pub fn get_tags(&self) -> Vec<String> {
        self.sdk.tags()
    }

    // -- Named user ----------------------------------------------------------

    /// Whitespace is trimmed; an empty or absent id clears the named user.
    pub fn set_named_user(&self, named_user: Option<&str>) {
        let id = named_user.map(str::trim).filter(|id| !id.is_empty());
        self.sdk.set_named_user_id(id);
    }

    pub fn get_named_user(&self) -> Option<String> {
        self.sdk.named_user_id()
    }

    // -- Batch edits ---------------------------------------------------------

    pub fn edit_channel_tag_groups(&self, operations: &[Value]) {
        self.tag_group_batch(Identity::Channel, operations);
    }

    pub fn edit_named_user_tag_groups(&self, operations: &[Value]) {
        self.tag_group_batch(Identity::NamedUser, operations);
    }

    pub fn edit_channel_attributes(&self, operations: &[Value]) {
        self.attribute_batch(Identity::Channel, operations);
    }

    pub fn edit_named_user_attributes(&self, operations: &[Value]) {
        self.attribute_batch(Identity::NamedUser, operations);
    }

    fn tag_group_batch(&self, identity: Identity, operations: &[Value]) {
        if let Err(e) = self
            .batches
            .apply_tag_group_batch(self.sdk.as_ref(), identity, operations)
        {
            error!(?identity, error = %e, "tag group batch not committed");
        }
    }

    fn attribute_batch(&self, identity: Identity, operations: &[Value]) {
        if let Err(e) = self
            .batches
            .apply_attribute_batch(self.sdk.as_ref(), identity, operations)
        {
            error!(?identity, error = %e, "attribute batch not committed");
        }
    }

    // -- Analytics -----------------------------------------------------------

    pub fn set_analytics_enabled(&self, enabled: bool) {
        self.sdk.set_analytics_enabled(enabled);
    }

    pub fn is_analytics_enabled(&self) -> bool {
        self.sdk.analytics_enabled()
    }

    pub fn set_data_collection_enabled(&self, enabled: bool) {
        self.sdk.set_data_collection_enabled(enabled);
    }

    pub fn is_data_collection_enabled(&self) -> bool {
        self.sdk.data_collection_enabled()
    }

    pub fn track_screen(&self, screen: &str) {
        self.sdk.track_screen(screen);
    }

    /// Add an associated identifier, or remove it when `value` is absent.
    pub fn associate_identifier(&self, key: &str, value: Option<&str>) {
        self.sdk.associate_identifier(key, value);
    }

    // -- Actions -------------------------------------------------------------

    /// Run a named SDK action. Resolves with the action's result value.
    #[instrument(skip(self, value))]
    pub fn run_action(&self, name: &str, value: Value) -> PendingRequest<Value> {
        let (resolver, pending) = request();
        let action = name.to_string();
        debug!(request = %resolver.id(), "running action");
        self.sdk.run_action(
            name,
            value,
            Box::new(move |result| resolver.settle(action_outcome(&action, result))),
        );
        pending
    }

    // -- Inbox ---------------------------------------------------------------

    pub fn get_inbox_messages(&self) -> Vec<MessageSnapshot> {
        self.sdk.messages().iter().map(message_snapshot).collect()
    }

    pub fn delete_inbox_message(&self, id: &str) -> HostResult<bool> {
        self.known_message(id)?;
        self.sdk.delete_message(id);
        Ok(true)
    }

    pub fn mark_inbox_message_read(&self, id: &str) -> HostResult<bool> {
        self.known_message(id)?;
        self.sdk.mark_message_read(id);
        Ok(true)
    }

    fn known_message(&self, id: &str) -> HostResult<()> {
        match self.sdk.message(id) {
            Some(_) => Ok(()),
            None => Err(AirshipError::MessageNotFound(id.to_string()).into()),
        }
    }

    /// Refresh the inbox from the backend. Resolves `true`, or rejects with
    /// `STATUS_DID_NOT_REFRESH`.
    pub fn refresh_inbox(&self) -> PendingRequest<bool> {
        let (resolver, pending) = request();
        self.sdk.fetch_messages(Box::new(move |succeeded| {
            if succeeded {
                resolver.resolve(true);
            } else {
                resolver.reject(AirshipError::DidNotRefresh);
            }
        }));
        pending
    }

    // -- Message center ------------------------------------------------------

    pub fn display_message_center(&self) {
        self.sdk.show_message_center(None);
    }

    pub fn display_message(&self, message_id: &str) -> bool {
        self.sdk.show_message_center(Some(message_id));
        true
    }

    /// No-op when there is no foreground activity to close it through.
    pub fn dismiss_message_center(&self) {
        if self.sdk.has_foreground_activity() {
            self.sdk.close_message_center();
        }
    }

    pub fn dismiss_message(&self) {
        if self.sdk.has_foreground_activity() {
            self.sdk.close_message();
        }
    }

    pub fn set_auto_launch_default_message_center(&self, enabled: bool) {
        if let Err(e) = self.preferences.set_auto_launch_message_center(enabled) {
            error!(error = %e, "failed to persist auto-launch flag");
        }
    }

    // -- Notifications -------------------------------------------------------

    pub fn get_badge_number(&self) -> u32 {
        0
    }

    /// Store notification presentation strings; absent fields are cleared.
    pub fn set_notification_config(&self, config: &NotificationConfig) {
        if let Err(e) = self.preferences.set_notification_config(config) {
            error!(error = %e, "failed to persist notification config");
        }
    }

    /// Presentation strings for the native notification factory.
    pub fn notification_config(&self) -> HostResult<NotificationConfig> {
        self.preferences.notification_config().map_err(Rejection::from)
    }

    pub fn get_active_notifications(&self) -> HostResult<Vec<NotificationSnapshot>> {
        let level = self.sdk.api_level();
        let minimum = self.config.min_active_notifications_api_level;
        if level < minimum {
            return Err(AirshipError::Unsupported(format!(
                "active notifications need API level {minimum}, running {level}"
            ))
            .into());
        }
        Ok(self
            .sdk
            .active_notifications()
            .iter()
            .map(notification_snapshot)
            .collect())
    }

    /// Cancel one notification by its `"<id>[:<tag>]"` identifier.
    pub fn clear_notification(&self, identifier: &str) {
        if identifier.is_empty() {
            return;
        }
        match identifier.parse::<NotificationIdentifier>() {
            Ok(parsed) => self.sdk.cancel_notification(&parsed),
            Err(e) => warn!(error = %e, "ignoring notification identifier"),
        }
    }

    pub fn clear_notifications(&self) {
        self.sdk.cancel_all_notifications();
    }

    // -- Listener lifecycle --------------------------------------------------

    pub fn add_listener(&self, channel: &str) {
        self.relay.attach(channel);
    }

    pub fn remove_listeners(&self, channel: &str, count: usize) {
        self.relay.detach(channel, count);
    }

    pub fn remove_all_listeners(&self) {
        self.relay.detach_all();
    }

    // -- Native hooks --------------------------------------------------------

    /// Host came to the foreground: re-check notification opt-in.
    pub fn on_host_resume(&self) {
        if let Err(e) = self.opt_in.check(self.sdk.as_ref(), &self.relay) {
            error!(error = %e, "opt-in check failed");
        }
    }

    pub fn on_push_received(&self, push: &PushMessage, identifier: Option<&NotificationIdentifier>) {
        self.relay
            .emit(Event::PushReceived(push_snapshot(push, identifier)));
    }

    pub fn on_channel_registration(&self) {
        self.relay.emit(Event::RegistrationChanged {
            channel_id: self.sdk.channel_id(),
            registration_token: self.sdk.push_token(),
        });
    }

    pub fn on_inbox_updated(&self) {
        let messages = self.sdk.messages();
        let unread = messages.iter().filter(|m| !m.is_read).count();
        self.relay.emit(Event::InboxUpdated {
            message_unread_count: unread,
            message_count: messages.len(),
        });
    }

    pub fn on_deep_link(&self, deep_link: &str) {
        self.relay.emit(Event::DeepLink {
            deep_link: deep_link.to_string(),
        });
    }

    /// The SDK wants to show the message center. Returns `true` if the
    /// default message center was launched.
    pub fn on_message_center_requested(&self, message_id: Option<&str>) -> bool {
        let auto_launch = self.preferences.auto_launch_message_center().unwrap_or_else(|e| {
            warn!(error = %e, "auto-launch flag unreadable, assuming enabled");
            true
        });
        if auto_launch {
            self.sdk.show_message_center(message_id);
        } else {
            debug!("auto-launch disabled, leaving message center to the host");
        }
        auto_launch
    }
}

fn action_outcome(name: &str, result: ActionResult) -> HostResult<Value> {
    let err = match result.status {
        ActionStatus::Completed => return Ok(result.value),
        ActionStatus::RejectedArguments => AirshipError::ActionRejectedArguments,
        ActionStatus::ActionNotFound => AirshipError::ActionNotFound(name.to_string()),
        ActionStatus::ExecutionError => AirshipError::ActionExecution(
            result.error.unwrap_or_else(|| "unknown error".to_string()),
        ),
    };
    Err(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{MemoryPreferences, SqlitePreferences};
    use airship_bridge::StubBridge;
    use airship_core::types::{ActiveNotification, EditScope, HostEvent, InboxMessage, channels};
    use chrono::Utc;
    use serde_json::{Map, json};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    struct Harness {
        module: AirshipModule,
        sdk: Arc<StubBridge>,
        rx: UnboundedReceiver<HostEvent>,
    }

    fn harness() -> Harness {
        harness_with(ModuleConfig::default(), Arc::new(MemoryPreferences::new()))
    }

    fn harness_with(config: ModuleConfig, store: Arc<dyn PreferenceStore>) -> Harness {
        let sdk = Arc::new(StubBridge::new());
        let (tx, rx) = unbounded_channel();
        let module = AirshipModule::new(sdk.clone(), store, Arc::new(tx), config);
        Harness { module, sdk, rx }
    }

    fn drain(rx: &mut UnboundedReceiver<HostEvent>) -> Vec<HostEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn message(id: &str, is_read: bool) -> InboxMessage {
        InboxMessage {
            id: id.into(),
            title: format!("title {id}"),
            sent_date: Utc::now(),
            list_icon_url: None,
            is_read,
            is_deleted: false,
            extras: Map::new(),
        }
    }

    #[test]
    fn mixed_batch_commits_only_valid_records() {
        let h = harness();
        h.module.edit_channel_tag_groups(&[
            json!({ "group": "a", "operationType": "add", "tags": ["x"] }),
            json!({ "group": null, "operationType": "add", "tags": ["y"] }),
            json!({ "group": "b", "operationType": "explode", "tags": ["z"] }),
            json!({ "group": "c", "operationType": "set", "tags": ["w"] }),
        ]);

        let groups = h.sdk.tag_groups(Identity::Channel);
        assert_eq!(groups.len(), 2);
        assert!(groups.contains_key("a"));
        assert!(groups.contains_key("c"));
        assert_eq!(h.sdk.commit_count(EditScope::ChannelTagGroups), 1);
    }

    #[test]
    fn named_user_attribute_batch_reaches_named_user_scope() {
        let h = harness();
        h.module.edit_named_user_attributes(&[
            json!({ "action": "set", "key": "joined", "type": "date", "value": 1_700_000_000_000_i64 }),
        ]);
        assert!(h.sdk.attributes(Identity::Channel).is_empty());
        assert_eq!(
            h.sdk
                .attributes(Identity::NamedUser)
                .get("joined")
                .and_then(|v| v.epoch_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn enable_channel_creation_lifts_delayed_creation() {
        let h = harness();
        assert!(!h.sdk.channel_creation_enabled());
        h.module.enable_channel_creation();
        assert!(h.sdk.channel_creation_enabled());
    }

    #[test]
    fn unavailable_scope_is_absorbed() {
        let h = harness();
        h.sdk.set_scope_available(EditScope::NamedUserTagGroups, false);
        h.module.edit_named_user_tag_groups(&[
            json!({ "group": "g", "operationType": "add", "tags": ["t"] }),
        ]);
        assert!(h.sdk.tag_groups(Identity::NamedUser).is_empty());
    }

    #[test]
    fn cold_start_events_flush_on_first_listener() {
        let mut h = harness();
        h.sdk.set_channel_id(Some("chan-1"));
        h.module.on_channel_registration();
        h.module.on_deep_link("app://home");
        assert!(drain(&mut h.rx).is_empty());

        h.module.add_listener(channels::DEEP_LINK);

        let events = drain(&mut h.rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].channel, channels::REGISTRATION);
        assert_eq!(events[0].payload, json!({ "channelId": "chan-1" }));
        assert_eq!(events[1].payload, json!({ "deepLink": "app://home" }));
    }

    #[test]
    fn removing_last_listener_buffers_without_duplicates() {
        let mut h = harness();
        h.module.on_deep_link("one");
        h.module.add_listener(channels::DEEP_LINK);
        assert_eq!(drain(&mut h.rx).len(), 1);

        h.module.remove_listeners(channels::DEEP_LINK, 1);
        h.module.on_deep_link("two");
        assert!(drain(&mut h.rx).is_empty());

        h.module.add_listener(channels::DEEP_LINK);
        let events = drain(&mut h.rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["deepLink"], "two");
    }

    #[test]
    fn bounded_buffer_from_config() {
        let config = ModuleConfig {
            event_buffer_capacity: Some(1),
            ..Default::default()
        };
        let mut h = harness_with(config, Arc::new(MemoryPreferences::new()));
        h.module.on_deep_link("old");
        h.module.on_deep_link("new");
        h.module.add_listener(channels::DEEP_LINK);

        let events = drain(&mut h.rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["deepLink"], "new");
    }

    #[test]
    fn resume_emits_opt_in_change_once() {
        let mut h = harness();
        h.module.add_listener(channels::NOTIFICATION_OPT_IN_STATUS);

        h.module.on_host_resume();
        h.module.on_host_resume();
        assert!(drain(&mut h.rx).is_empty());

        h.sdk.set_opted_in(true);
        h.module.on_host_resume();
        h.module.on_host_resume();

        let events = drain(&mut h.rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload, json!({ "optIn": true }));
    }

    #[test]
    fn opt_in_status_survives_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.db");

        {
            let store = Arc::new(SqlitePreferences::open(&path).expect("open"));
            let mut h = harness_with(ModuleConfig::default(), store);
            h.module.add_listener(channels::NOTIFICATION_OPT_IN_STATUS);
            h.sdk.set_opted_in(true);
            h.module.on_host_resume();
            assert_eq!(drain(&mut h.rx).len(), 1);
        }

        let store = Arc::new(SqlitePreferences::open(&path).expect("reopen"));
        let mut h = harness_with(ModuleConfig::default(), store);
        h.module.add_listener(channels::NOTIFICATION_OPT_IN_STATUS);
        h.sdk.set_opted_in(true);
        h.module.on_host_resume();
        assert!(drain(&mut h.rx).is_empty());
    }

    #[test]
    fn push_received_payload_mirrors_snapshot() {
        let mut h = harness();
        h.module.add_listener(channels::PUSH_RECEIVED);
        let push = PushMessage::new(
            json!({ "com.urbanairship.push.ALERT": "hi", "campaign": "spring" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );
        let id = NotificationIdentifier {
            id: 4,
            tag: Some("t".into()),
        };

        h.module.on_push_received(&push, Some(&id));

        let events = drain(&mut h.rx);
        assert_eq!(
            events[0].payload,
            json!({ "alert": "hi", "notificationId": "4:t", "extras": { "campaign": "spring" } })
        );
    }

    #[test]
    fn delete_unknown_message_rejects_not_found() {
        let h = harness();
        let rejection = h
            .module
            .delete_inbox_message("unknown-id")
            .expect_err("rejected");
        assert_eq!(rejection.code, "STATUS_MESSAGE_NOT_FOUND");
    }

    #[test]
    fn delete_existing_message_removes_it() {
        let h = harness();
        h.sdk.insert_message(message("m1", false));
        h.sdk.insert_message(message("m2", false));

        assert_eq!(h.module.delete_inbox_message("m1"), Ok(true));

        let ids: Vec<_> = h
            .module
            .get_inbox_messages()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["m2"]);
    }

    #[test]
    fn mark_read_then_inbox_counts() {
        let mut h = harness();
        h.sdk.insert_message(message("m1", false));
        h.sdk.insert_message(message("m2", false));
        assert_eq!(h.module.mark_inbox_message_read("m2"), Ok(true));
        assert!(h.module.mark_inbox_message_read("nope").is_err());

        h.module.add_listener(channels::INBOX_UPDATED);
        h.module.on_inbox_updated();

        let events = drain(&mut h.rx);
        assert_eq!(
            events[0].payload,
            json!({ "messageUnreadCount": 1, "messageCount": 2 })
        );
    }

    #[tokio::test]
    async fn unknown_action_rejects_not_found() {
        let h = harness();
        let rejection = h
            .module
            .run_action("missing_action", json!(null))
            .await
            .expect_err("rejected");
        assert_eq!(rejection.code, "STATUS_ACTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn action_statuses_map_to_rejections() {
        let h = harness();
        h.sdk
            .register_action("echo", |value| ActionResult::completed(value.clone()));
        h.sdk.register_action("picky", |_| {
            ActionResult::failed(ActionStatus::RejectedArguments, None)
        });
        h.sdk.register_action("broken", |_| {
            ActionResult::failed(ActionStatus::ExecutionError, Some("boom".into()))
        });

        assert_eq!(
            h.module.run_action("echo", json!({ "a": 1 })).await,
            Ok(json!({ "a": 1 }))
        );
        let picky = h.module.run_action("picky", json!(1)).await;
        assert_eq!(picky.expect_err("rejected").code, "STATUS_REJECTED_ARGUMENTS");
        let broken = h
            .module
            .run_action("broken", json!(1))
            .await
            .expect_err("rejected");
        assert_eq!(broken.code, "STATUS_EXECUTION_ERROR");
        assert!(broken.message.contains("boom"));
    }

    #[tokio::test]
    async fn refresh_failure_rejects() {
        let h = harness();
        assert_eq!(h.module.refresh_inbox().await, Ok(true));
        h.sdk.set_refresh_succeeds(false);
        let rejection = h.module.refresh_inbox().await.expect_err("rejected");
        assert_eq!(rejection.code, "STATUS_DID_NOT_REFRESH");
    }

    #[test]
    fn active_notifications_gated_by_api_level() {
        let h = harness();
        h.sdk.post_notification(ActiveNotification {
            identifier: NotificationIdentifier { id: 1, tag: None },
            push: None,
        });

        assert_eq!(h.module.get_active_notifications().expect("list").len(), 1);

        h.sdk.set_api_level(22);
        let rejection = h.module.get_active_notifications().expect_err("rejected");
        assert_eq!(rejection.code, "UNSUPPORTED");
    }

    #[test]
    fn clear_notification_parses_identifier() {
        let h = harness();
        for (id, tag) in [(1, None), (2, Some("promo")), (3, None)] {
            h.sdk.post_notification(ActiveNotification {
                identifier: NotificationIdentifier {
                    id,
                    tag: tag.map(str::to_string),
                },
                push: None,
            });
        }

        h.module.clear_notification("2:promo");
        h.module.clear_notification("not-a-number");
        h.module.clear_notification("");

        let ids: Vec<_> = h
            .module
            .get_active_notifications()
            .expect("list")
            .into_iter()
            .filter_map(|n| n.notification_id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);

        h.module.clear_notifications();
        assert!(h.module.get_active_notifications().expect("list").is_empty());
    }

    #[test]
    fn named_user_is_trimmed_and_cleared() {
        let h = harness();
        h.module.set_named_user(Some("  user-42 "));
        assert_eq!(h.module.get_named_user().as_deref(), Some("user-42"));
        h.module.set_named_user(Some("   "));
        assert_eq!(h.module.get_named_user(), None);
        h.module.set_named_user(Some("x"));
        h.module.set_named_user(None);
        assert_eq!(h.module.get_named_user(), None);
    }

    #[test]
    fn tags_ignore_absent_values() {
        let h = harness();
        h.module.add_tag(Some("vip"));
        h.module.add_tag(None);
        h.module.add_tag(Some("beta"));
        h.module.remove_tag(Some("beta"));
        h.module.remove_tag(None);
        assert_eq!(h.module.get_tags(), vec!["vip".to_string()]);
    }

    #[test]
    fn dismiss_without_foreground_activity_is_noop() {
        let h = harness();
        h.module.dismiss_message_center();
        h.module.dismiss_message();
        assert_eq!(h.sdk.message_center_closes(), 0);
        assert_eq!(h.sdk.message_closes(), 0);

        h.sdk.set_foreground_activity(true);
        h.module.dismiss_message_center();
        h.module.dismiss_message();
        assert_eq!(h.sdk.message_center_closes(), 1);
        assert_eq!(h.sdk.message_closes(), 1);
    }

    #[test]
    fn message_center_request_honours_auto_launch() {
        let h = harness();
        assert!(h.module.display_message("m1"));
        assert!(h.module.on_message_center_requested(None));

        h.module.set_auto_launch_default_message_center(false);
        assert!(!h.module.on_message_center_requested(Some("m2")));

        assert_eq!(
            h.sdk.message_center_launches(),
            vec![Some("m1".to_string()), None]
        );
    }

    #[test]
    fn notification_config_round_trips_through_preferences() {
        let h = harness();
        h.module.set_notification_config(&NotificationConfig {
            icon: Some("ic_notification".into()),
            accent_color: Some("#336699".into()),
            ..Default::default()
        });
        let config = h.module.notification_config().expect("config");
        assert_eq!(config.icon.as_deref(), Some("ic_notification"));
        assert_eq!(config.accent_color.as_deref(), Some("#336699"));
        assert!(config.large_icon.is_none());
    }

    #[test]
    fn analytics_passthroughs() {
        let h = harness();
        h.module.set_analytics_enabled(false);
        h.module.set_data_collection_enabled(false);
        h.module.track_screen("home");
        h.module.associate_identifier("crm", Some("abc"));
        h.module.associate_identifier("ad", Some("x"));
        h.module.associate_identifier("ad", None);

        assert!(!h.module.is_analytics_enabled());
        assert!(!h.module.is_data_collection_enabled());
        assert_eq!(h.sdk.tracked_screens(), vec!["home".to_string()]);
        let ids = h.sdk.associated_identifiers();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.get("crm").map(String::as_str), Some("abc"));
    }

    #[test]
    fn push_toggles_and_badge() {
        let h = harness();
        assert!(!h.module.is_user_notifications_enabled());
        assert!(h.module.enable_user_push_notifications());
        assert!(h.module.is_user_notifications_enabled());

        h.module.set_push_token_registration_enabled(false);
        assert!(!h.module.is_push_token_registration_enabled());
        assert_eq!(h.module.get_badge_number(), 0);
        assert_eq!(h.module.get_registration_token(), None);
    }
}
