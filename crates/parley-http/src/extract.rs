// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning an API's JSON response into an [`ApiResponse`].

use parley_core::flow::ApiFetchConfig;
use parley_core::types::{ApiResponse, Button};
use parley_template::{format_value, lookup};
use serde_json::{Map, Value};
use tracing::debug;

/// Applies the fetch config's response mapping, message path and buttons
/// path to a parsed response body.
///
/// Paths that do not resolve are skipped.
pub fn extract_response(body: &Value, config: &ApiFetchConfig) -> ApiResponse {
    let mut mapped_data = Map::new();
    for (path, key) in &config.response_mapping {
        match lookup(body, path) {
            Some(value) => {
                mapped_data.insert(key.clone(), value.clone());
            }
            None => debug!(path = %path, "response path not found"),
        }
    }

    let message = config
        .message_path
        .as_deref()
        .and_then(|path| lookup(body, path))
        .map(format_value)
        .filter(|m| !m.trim().is_empty());

    let buttons = config
        .buttons_path
        .as_deref()
        .and_then(|path| lookup(body, path))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(button_from_value).collect())
        .unwrap_or_default();

    ApiResponse {
        message,
        buttons,
        mapped_data,
    }
}

/// A reply button from a string title or an `{id, title}` object.
fn button_from_value(value: &Value) -> Option<Button> {
    match value {
        Value::String(title) if !title.trim().is_empty() => Some(Button::reply("", title.clone())),
        Value::Object(obj) => {
            let title = obj
                .get("title")
                .map(format_value)
                .filter(|t| !t.trim().is_empty())?;
            let id = obj.get("id").map(format_value).unwrap_or_default();
            Some(Button::reply(id, title))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    fn config() -> ApiFetchConfig {
        ApiFetchConfig {
            response_mapping: BTreeMap::from([
                ("data.customer.name".to_string(), "name".to_string()),
                ("data.orders[0].id".to_string(), "last_order".to_string()),
                ("data.missing".to_string(), "missing".to_string()),
            ]),
            message_path: Some("data.greeting".into()),
            buttons_path: Some("data.options".into()),
            ..ApiFetchConfig::get("https://api.example.com")
        }
    }

    #[test]
    fn maps_paths_into_session_keys() {
        let body = json!({
            "data": {
                "customer": {"name": "Ada"},
                "orders": [{"id": 17}, {"id": 12}],
                "greeting": "Hello {{name}}",
                "options": ["Track", {"id": "cancel", "title": "Cancel"}, {"id": "x"}, 5]
            }
        });
        let response = extract_response(&body, &config());

        assert_eq!(response.mapped_data.get("name"), Some(&json!("Ada")));
        assert_eq!(response.mapped_data.get("last_order"), Some(&json!(17)));
        assert!(!response.mapped_data.contains_key("missing"));
        assert_eq!(response.message.as_deref(), Some("Hello {{name}}"));
        assert_eq!(
            response.buttons,
            vec![Button::reply("", "Track"), Button::reply("cancel", "Cancel")]
        );
    }

    #[test]
    fn empty_body_yields_empty_response() {
        let response = extract_response(&json!({}), &config());
        assert_eq!(response, ApiResponse::default());
    }
}
