// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-call dispatch.
//
// One JSON object per input line: `{ "id": .., "method": "getTags", "args": [] }`.
// Arguments are positional, in the order the scripting API declares them.
// Methods prefixed `sdk.` drive the stub SDK so a script can simulate
// pushes, permission flips and inbox contents.

use airship_core::config::NotificationConfig;
use airship_core::types::{
    ActionResult, ActiveNotification, InboxMessage, NotificationIdentifier, PushMessage,
};
use airship_module::{HostResult, Rejection};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::services::host_services::HostServices;

/// Rejection code for calls whose arguments do not match the method.
pub const INVALID_ARGUMENTS: &str = "INVALID_ARGUMENTS";

/// Rejection code for unknown method names.
pub const UNKNOWN_METHOD: &str = "UNKNOWN_METHOD";

#[derive(Debug, Deserialize)]
pub struct HostCall {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// One line written to stdout.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    Resolved { id: Value, result: Value },
    Rejected { id: Value, error: Rejection },
    Event { event: String, body: Value },
}

impl Outbound {
    pub fn from_outcome(id: Value, outcome: HostResult<Value>) -> Self {
        match outcome {
            Ok(result) => Self::Resolved { id, result },
            Err(error) => Self::Rejected { id, error },
        }
    }

    /// Rejection for an input line that is not a valid host call. The `id`
    /// is recovered when the line is at least a JSON object, otherwise null.
    pub fn unparseable(line: &str, error: &serde_json::Error) -> Self {
        let id = serde_json::from_str::<Value>(line)
            .ok()
            .and_then(|value| value.get("id").cloned())
            .unwrap_or(Value::Null);
        Self::Rejected {
            id,
            error: Rejection::new(INVALID_ARGUMENTS, format!("malformed host call: {error}")),
        }
    }
}

// -- Argument access ---------------------------------------------------------

fn invalid(index: usize, expected: &str) -> Rejection {
    Rejection::new(
        INVALID_ARGUMENTS,
        format!("argument {index} must be {expected}"),
    )
}

fn bool_arg(args: &[Value], index: usize) -> HostResult<bool> {
    args.get(index)
        .and_then(Value::as_bool)
        .ok_or_else(|| invalid(index, "a boolean"))
}

fn str_arg(args: &[Value], index: usize) -> HostResult<&str> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(index, "a string"))
}

/// Absent and `null` both read as `None`.
fn opt_str_arg(args: &[Value], index: usize) -> HostResult<Option<&str>> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(invalid(index, "a string or null")),
    }
}

fn array_arg(args: &[Value], index: usize) -> HostResult<&[Value]> {
    args.get(index)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| invalid(index, "an array"))
}

fn object_arg(args: &[Value], index: usize) -> HostResult<Map<String, Value>> {
    args.get(index)
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| invalid(index, "an object"))
}

fn int_arg(args: &[Value], index: usize) -> HostResult<i64> {
    args.get(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid(index, "an integer"))
}

fn to_value<T: Serialize>(value: T) -> HostResult<Value> {
    serde_json::to_value(value).map_err(|e| Rejection::from(airship_core::AirshipError::from(e)))
}

// -- Dispatch ----------------------------------------------------------------

/// Execute one host call. Fire-and-forget methods resolve `null`.
pub async fn dispatch(services: &HostServices, call: &HostCall) -> HostResult<Value> {
    let module = services.module();
    let args = call.args.as_slice();
    debug!(method = %call.method, "dispatching host call");

    let result = match call.method.as_str() {
        // Listener lifecycle
        "addListener" => {
            module.add_listener(str_arg(args, 0)?);
            Value::Null
        }
        "removeListeners" => {
            let count = usize::try_from(int_arg(args, 1)?).map_err(|_| invalid(1, "a count"))?;
            module.remove_listeners(str_arg(args, 0)?, count);
            Value::Null
        }
        "removeAllListeners" => {
            module.remove_all_listeners();
            Value::Null
        }

        // Push
        "setUserNotificationsEnabled" => {
            module.set_user_notifications_enabled(bool_arg(args, 0)?);
            Value::Null
        }
        "isUserNotificationsEnabled" => json!(module.is_user_notifications_enabled()),
        "enableUserPushNotifications" => json!(module.enable_user_push_notifications()),
        "isUserNotificationsOptedIn" => json!(module.is_user_notifications_opted_in()),
        "setPushTokenRegistrationEnabled" => {
            module.set_push_token_registration_enabled(bool_arg(args, 0)?);
            Value::Null
        }
        "isPushTokenRegistrationEnabled" => json!(module.is_push_token_registration_enabled()),
        "getRegistrationToken" => json!(module.get_registration_token()),

        // Channel and named user
        "getChannelId" => json!(module.get_channel_id()),
        "enableChannelCreation" => {
            module.enable_channel_creation();
            Value::Null
        }
        "addTag" => {
            module.add_tag(opt_str_arg(args, 0)?);
            Value::Null
        }
        "removeTag" => {
            module.remove_tag(opt_str_arg(args, 0)?);
            Value::Null
        }
        "getTags" => json!(module.get_tags()),
        "setNamedUser" => {
            module.set_named_user(opt_str_arg(args, 0)?);
            Value::Null
        }
        "getNamedUser" => json!(module.get_named_user()),

        // Batches
        "editChannelTagGroups" => {
            module.edit_channel_tag_groups(array_arg(args, 0)?);
            Value::Null
        }
        "editNamedUserTagGroups" => {
            module.edit_named_user_tag_groups(array_arg(args, 0)?);
            Value::Null
        }
        "editChannelAttributes" => {
            module.edit_channel_attributes(array_arg(args, 0)?);
            Value::Null
        }
        "editNamedUserAttributes" => {
            module.edit_named_user_attributes(array_arg(args, 0)?);
            Value::Null
        }

        // Analytics
        "setAnalyticsEnabled" => {
            module.set_analytics_enabled(bool_arg(args, 0)?);
            Value::Null
        }
        "isAnalyticsEnabled" => json!(module.is_analytics_enabled()),
        "setDataCollectionEnabled" => {
            module.set_data_collection_enabled(bool_arg(args, 0)?);
            Value::Null
        }
        "isDataCollectionEnabled" => json!(module.is_data_collection_enabled()),
        "trackScreen" => {
            module.track_screen(str_arg(args, 0)?);
            Value::Null
        }
        "associateIdentifier" => {
            module.associate_identifier(str_arg(args, 0)?, opt_str_arg(args, 1)?);
            Value::Null
        }

        // Actions and inbox
        "runAction" => {
            let value = args.get(1).cloned().unwrap_or(Value::Null);
            module.run_action(str_arg(args, 0)?, value).await?
        }
        "getInboxMessages" => to_value(module.get_inbox_messages())?,
        "deleteInboxMessage" => json!(module.delete_inbox_message(str_arg(args, 0)?)?),
        "markInboxMessageRead" => json!(module.mark_inbox_message_read(str_arg(args, 0)?)?),
        "refreshInbox" => json!(module.refresh_inbox().await?),

        // Message center
        "displayMessageCenter" => {
            module.display_message_center();
            Value::Null
        }
        "displayMessage" => json!(module.display_message(str_arg(args, 0)?)),
        "dismissMessageCenter" => {
            module.dismiss_message_center();
            Value::Null
        }
        "dismissMessage" => {
            module.dismiss_message();
            Value::Null
        }
        "setAutoLaunchDefaultMessageCenter" => {
            module.set_auto_launch_default_message_center(bool_arg(args, 0)?);
            Value::Null
        }

        // Notifications
        "getBadgeNumber" => json!(module.get_badge_number()),
        "setNotificationConfig" => {
            let config: NotificationConfig = serde_json::from_value(Value::Object(
                object_arg(args, 0)?,
            ))
            .map_err(|_| invalid(0, "a notification config"))?;
            module.set_notification_config(&config);
            Value::Null
        }
        "getActiveNotifications" => {
            let snapshots = module.get_active_notifications()?;
            json!(snapshots)
        }
        "clearNotification" => {
            module.clear_notification(str_arg(args, 0)?);
            Value::Null
        }
        "clearNotifications" => {
            module.clear_notifications();
            Value::Null
        }

        other => match other.strip_prefix("sdk.") {
            Some(command) => simulate(services, command, args)?,
            None => {
                return Err(Rejection::new(
                    UNKNOWN_METHOD,
                    format!("unknown method {other}"),
                ));
            }
        },
    };
    Ok(result)
}

/// SDK-side simulation commands. Each one plays the part of a native
/// callback or platform state change.
fn simulate(services: &HostServices, command: &str, args: &[Value]) -> HostResult<Value> {
    let module = services.module();
    let sdk = services.sdk();

    match command {
        "resume" => module.on_host_resume(),
        "setOptedIn" => sdk.set_opted_in(bool_arg(args, 0)?),
        "register" => {
            sdk.set_channel_id(opt_str_arg(args, 0)?);
            sdk.set_push_token(opt_str_arg(args, 1)?);
            module.on_channel_registration();
        }
        "receivePush" => {
            let push = PushMessage::new(object_arg(args, 0)?);
            let identifier = opt_str_arg(args, 1)?
                .map(str::parse::<NotificationIdentifier>)
                .transpose()
                .map_err(|_| invalid(1, "a notification identifier"))?;
            if let Some(identifier) = &identifier {
                sdk.post_notification(ActiveNotification {
                    identifier: identifier.clone(),
                    push: Some(push.clone()),
                });
            }
            module.on_push_received(&push, identifier.as_ref());
        }
        "deepLink" => module.on_deep_link(str_arg(args, 0)?),
        "addMessage" => {
            let record = object_arg(args, 0)?;
            sdk.insert_message(inbox_message(&record).ok_or_else(|| invalid(0, "a message"))?);
            module.on_inbox_updated();
        }
        "setRefreshSucceeds" => sdk.set_refresh_succeeds(bool_arg(args, 0)?),
        "registerEchoAction" => {
            sdk.register_action(str_arg(args, 0)?, |value| {
                ActionResult::completed(value.clone())
            });
        }
        "setApiLevel" => {
            let level = u32::try_from(int_arg(args, 0)?).map_err(|_| invalid(0, "an API level"))?;
            sdk.set_api_level(level);
        }
        "setForegroundActivity" => sdk.set_foreground_activity(bool_arg(args, 0)?),
        "requestMessageCenter" => {
            return Ok(json!(module.on_message_center_requested(opt_str_arg(args, 0)?)));
        }
        other => {
            return Err(Rejection::new(
                UNKNOWN_METHOD,
                format!("unknown sdk command {other}"),
            ));
        }
    }
    Ok(Value::Null)
}

/// Build an inbox message from `{ id, title, sentDate?, listIconUrl?, isRead?, extras? }`.
fn inbox_message(record: &Map<String, Value>) -> Option<InboxMessage> {
    let sent_date = match record.get("sentDate").and_then(Value::as_i64) {
        Some(millis) => Utc.timestamp_millis_opt(millis).single()?,
        None => Utc::now(),
    };
    Some(InboxMessage {
        id: record.get("id")?.as_str()?.to_string(),
        title: record.get("title")?.as_str()?.to_string(),
        sent_date,
        list_icon_url: record
            .get("listIconUrl")
            .and_then(Value::as_str)
            .map(str::to_string),
        is_read: record.get("isRead").and_then(Value::as_bool).unwrap_or(false),
        is_deleted: false,
        extras: record
            .get("extras")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use airship_core::config::ModuleConfig;
    use airship_core::types::{HostEvent, channels};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn services() -> (HostServices, UnboundedReceiver<HostEvent>) {
        let (tx, rx) = unbounded_channel();
        (HostServices::fallback(ModuleConfig::default(), tx), rx)
    }

    async fn call(services: &HostServices, method: &str, args: Value) -> HostResult<Value> {
        let call = HostCall {
            id: json!(1),
            method: method.into(),
            args: args.as_array().cloned().unwrap_or_default(),
        };
        dispatch(services, &call).await
    }

    fn rejection_for(line: &str) -> Value {
        let error = serde_json::from_str::<HostCall>(line).expect_err("malformed");
        serde_json::to_value(Outbound::unparseable(line, &error)).expect("serialize")
    }

    #[test]
    fn garbage_line_is_rejected_with_null_id() {
        let out = rejection_for("not json at all");
        assert!(out["id"].is_null());
        assert_eq!(out["error"]["code"], INVALID_ARGUMENTS);
    }

    #[test]
    fn call_without_method_keeps_its_id() {
        let out = rejection_for(r#"{ "id": 9, "args": [] }"#);
        assert_eq!(out["id"], json!(9));
        assert_eq!(out["error"]["code"], INVALID_ARGUMENTS);
    }

    #[test]
    fn host_call_line_parses_with_defaults() {
        let call: HostCall = serde_json::from_str(r#"{ "method": "getTags" }"#).expect("parse");
        assert_eq!(call.method, "getTags");
        assert!(call.args.is_empty());
        assert!(call.id.is_null());
    }

    #[test]
    fn outbound_lines_have_flat_shape() {
        let ok = Outbound::from_outcome(json!(3), Ok(json!(true)));
        assert_eq!(
            serde_json::to_value(&ok).expect("serialise"),
            json!({ "id": 3, "result": true })
        );

        let err = Outbound::from_outcome(json!(4), Err(Rejection::new("X", "y")));
        assert_eq!(
            serde_json::to_value(&err).expect("serialise"),
            json!({ "id": 4, "error": { "code": "X", "message": "y" } })
        );
    }

    #[tokio::test]
    async fn batch_then_tags_round_trip() {
        let (services, _rx) = services();
        call(&services, "addTag", json!(["vip"])).await.expect("addTag");
        call(
            &services,
            "editChannelTagGroups",
            json!([[{ "group": "g", "operationType": "add", "tags": ["t"] }, { "bogus": 1 }]]),
        )
        .await
        .expect("edit");

        assert_eq!(call(&services, "getTags", json!([])).await, Ok(json!(["vip"])));
        assert_eq!(
            services
                .sdk()
                .tag_groups(airship_core::types::Identity::Channel)
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn wrong_argument_type_rejects() {
        let (services, _rx) = services();
        let rejection = call(&services, "setAnalyticsEnabled", json!(["yes"]))
            .await
            .expect_err("rejected");
        assert_eq!(rejection.code, INVALID_ARGUMENTS);
    }

    #[tokio::test]
    async fn unknown_method_rejects() {
        let (services, _rx) = services();
        let rejection = call(&services, "launchRocket", json!([]))
            .await
            .expect_err("rejected");
        assert_eq!(rejection.code, UNKNOWN_METHOD);
    }

    #[tokio::test]
    async fn simulated_push_reaches_listener() {
        let (services, mut rx) = services();
        call(
            &services,
            "sdk.receivePush",
            json!([{ "com.urbanairship.push.ALERT": "hello", "k": "v" }, "12:promo"]),
        )
        .await
        .expect("push");
        assert!(rx.try_recv().is_err());

        call(&services, "addListener", json!([channels::PUSH_RECEIVED]))
            .await
            .expect("listen");
        let event = rx.try_recv().expect("flushed");
        assert_eq!(event.payload["notificationId"], "12:promo");

        let active = call(&services, "getActiveNotifications", json!([]))
            .await
            .expect("active");
        assert_eq!(active[0]["alert"], "hello");
    }

    #[tokio::test]
    async fn inbox_flow_through_dispatch() {
        let (services, _rx) = services();
        call(
            &services,
            "sdk.addMessage",
            json!([{ "id": "m1", "title": "Hi", "sentDate": 1_700_000_000_000_i64, "extras": { "n": 1 } }]),
        )
        .await
        .expect("add");

        let messages = call(&services, "getInboxMessages", json!([])).await.expect("list");
        assert_eq!(messages[0]["sentDate"], 1_700_000_000_000_i64);
        assert_eq!(messages[0]["extras"]["n"], "1");

        let missing = call(&services, "deleteInboxMessage", json!(["m9"]))
            .await
            .expect_err("rejected");
        assert_eq!(missing.code, "STATUS_MESSAGE_NOT_FOUND");
        assert_eq!(
            call(&services, "deleteInboxMessage", json!(["m1"])).await,
            Ok(json!(true))
        );
    }

    #[tokio::test]
    async fn echo_action_resolves_value() {
        let (services, _rx) = services();
        call(&services, "sdk.registerEchoAction", json!(["echo"]))
            .await
            .expect("register");
        assert_eq!(
            call(&services, "runAction", json!(["echo", { "x": 1 }])).await,
            Ok(json!({ "x": 1 }))
        );
        let missing = call(&services, "runAction", json!(["nope"]))
            .await
            .expect_err("rejected");
        assert_eq!(missing.code, "STATUS_ACTION_NOT_FOUND");
    }
}
