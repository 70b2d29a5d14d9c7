// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification and coercion of inbound JSON.
//!
//! The transport hands every decoded line here. [`classify`] sorts it into
//! a command response or a state notification and validates the shape
//! strictly; anything else yields `None` and the caller drops it. The
//! functions are pure so they never panic on hostile input.

use serde_json::Value;

use super::message::{CommandResponse, InboundMessage, NotificationMessage, ResponseOutcome};
use crate::state::{DeviceProperty, PropertyName};

/// Sorts a decoded JSON payload into one of the two inbound message kinds.
///
/// A payload carrying an `id` key is validated as a response: integer id,
/// and exactly one of `result` (list of strings) or `error` (integer
/// `code`, string `message`). A payload with `method == "props"` and an
/// object `params` is a notification. Everything else is unrecognized.
#[must_use]
pub fn classify(payload: &Value) -> Option<InboundMessage> {
    let object = payload.as_object()?;
    if object.contains_key("id") {
        return classify_response(payload).map(InboundMessage::Response);
    }
    if object.get("method").and_then(Value::as_str) == Some("props") {
        return classify_notification(payload).map(InboundMessage::Notification);
    }
    None
}

fn classify_response(payload: &Value) -> Option<CommandResponse> {
    let id = payload.get("id")?.as_i64()?;
    let result = payload.get("result");
    let error = payload.get("error");

    let outcome = match (result, error) {
        (Some(result), None) => ResponseOutcome::Result(string_list(result)?),
        (None, Some(error)) => ResponseOutcome::Error {
            code: error.get("code")?.as_i64()?,
            message: error.get("message")?.as_str()?.to_string(),
        },
        _ => return None,
    };
    Some(CommandResponse { id, outcome })
}

fn classify_notification(payload: &Value) -> Option<NotificationMessage> {
    let params = payload.get("params")?.as_object()?;

    let mut record = DeviceProperty::default();
    let mut touches_power = false;
    for (key, value) in params {
        let Ok(name) = key.parse::<PropertyName>() else {
            continue;
        };
        if is_power_key(name) {
            touches_power = true;
        }
        record.set_raw(name, value);
    }
    Some(NotificationMessage {
        record,
        touches_power,
    })
}

/// Re-associates positional `get_prop` result strings with the names they
/// were requested under. Empty strings mean the device does not know the
/// value and leave the field unset.
#[must_use]
pub fn coerce_get_prop(names: &[PropertyName], values: &[String]) -> DeviceProperty {
    let mut record = DeviceProperty::default();
    for (name, value) in names.iter().zip(values) {
        if value.is_empty() {
            continue;
        }
        record.set_raw(*name, &Value::String(value.clone()));
    }
    record
}

const fn is_power_key(name: PropertyName) -> bool {
    matches!(
        name,
        PropertyName::Power | PropertyName::MainPower | PropertyName::BgPower
    )
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(item.as_str()?.to_string());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Power;
    use serde_json::json;

    fn expect_response(payload: &Value) -> CommandResponse {
        match classify(payload) {
            Some(InboundMessage::Response(response)) => response,
            other => panic!("expected response, got {other:?}"),
        }
    }

    fn expect_notification(payload: &Value) -> NotificationMessage {
        match classify(payload) {
            Some(InboundMessage::Notification(notification)) => notification,
            other => panic!("expected notification, got {other:?}"),
        }
    }

    #[test]
    fn classifies_result_response() {
        let response = expect_response(&json!({"id": 2, "result": ["ok"]}));
        assert_eq!(response.id, 2);
        assert_eq!(response.outcome, ResponseOutcome::Result(vec!["ok".to_string()]));
    }

    #[test]
    fn classifies_error_response() {
        let response =
            expect_response(&json!({"id": 3, "error": {"code": -1, "message": "invalid command"}}));
        assert_eq!(response.id, 3);
        assert_eq!(
            response.outcome,
            ResponseOutcome::Error {
                code: -1,
                message: "invalid command".to_string(),
            }
        );
    }

    #[test]
    fn untracked_id_is_still_a_valid_response() {
        let response = expect_response(&json!({"id": -1, "result": ["ok"]}));
        assert_eq!(response.id, -1);
    }

    #[test]
    fn rejects_malformed_responses() {
        // Non-integer id.
        assert!(classify(&json!({"id": "2", "result": ["ok"]})).is_none());
        assert!(classify(&json!({"id": 2.5, "result": ["ok"]})).is_none());
        // Non-string result element.
        assert!(classify(&json!({"id": 2, "result": ["ok", 1]})).is_none());
        // Both or neither of result/error.
        assert!(classify(&json!({"id": 2})).is_none());
        assert!(
            classify(&json!({"id": 2, "result": [], "error": {"code": 1, "message": "x"}}))
                .is_none()
        );
        // Error object missing fields.
        assert!(classify(&json!({"id": 2, "error": {"code": 1}})).is_none());
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(classify(&json!(["props"])).is_none());
        assert!(classify(&json!("props")).is_none());
        assert!(classify(&json!(42)).is_none());
    }

    #[test]
    fn classifies_notification_and_ignores_unknown_keys() {
        let notification = expect_notification(&json!({
            "method": "props",
            "params": {"power": "on", "bright": 80, "hyperdrive": 1},
        }));
        assert_eq!(notification.record.power, Some(Power::On));
        assert_eq!(notification.record.bright.map(|b| b.value()), Some(80));
        assert!(notification.touches_power);
    }

    #[test]
    fn notification_skips_uncoercible_values() {
        let notification = expect_notification(&json!({
            "method": "props",
            "params": {"bright": "loud", "ct": 3000},
        }));
        assert_eq!(notification.record.bright, None);
        assert_eq!(
            notification.record.ct.map(|ct| ct.kelvin()),
            Some(3000)
        );
        assert!(!notification.touches_power);
    }

    #[test]
    fn garbage_power_value_still_marks_power_touched() {
        let notification = expect_notification(&json!({
            "method": "props",
            "params": {"bg_power": 12},
        }));
        assert!(notification.record.is_empty());
        assert!(notification.touches_power);
    }

    #[test]
    fn rejects_foreign_methods_and_malformed_params() {
        assert!(classify(&json!({"method": "sos", "params": {}})).is_none());
        assert!(classify(&json!({"method": "props", "params": [1, 2]})).is_none());
        assert!(classify(&json!({"method": "props"})).is_none());
    }

    #[test]
    fn get_prop_coercion_skips_empty_positions() {
        let names = [PropertyName::Power, PropertyName::Bright, PropertyName::Ct];
        let values = vec![String::from("on"), String::new(), String::from("4000")];

        let record = coerce_get_prop(&names, &values);
        assert_eq!(record.power, Some(Power::On));
        assert_eq!(record.bright, None);
        assert_eq!(record.ct.map(|ct| ct.kelvin()), Some(4000));
    }
}
