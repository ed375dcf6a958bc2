// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session data: the flow's working memory.
//!
//! Values are JSON-like (`serde_json::Value`). Coercion policy:
//!
//! - **Truthiness** ([`is_truthy`]): null is false, booleans are themselves,
//!   numbers are true when non-zero, strings are true when non-empty and not
//!   `"false"` or `"0"`, lists and maps are true when non-empty.
//! - **Numeric form** ([`as_number`]): numbers as-is, strings parsed as `f64`
//!   after trimming. Booleans and collections have no numeric form.
//! - **Textual form**: see `parley_template::format_value`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered string-keyed store of session variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData(Map<String, Value>);

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copies every entry of `other` into this store, overwriting existing keys.
    pub fn merge(&mut self, other: Map<String, Value>) {
        for (k, v) in other {
            self.0.insert(k, v);
        }
    }

    /// Borrows the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts the store into a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for SessionData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for SessionData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Truthiness of a value under the session-data coercion policy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Numeric form of a value under the session-data coercion policy.
///
/// Strings spelling NaN or an infinity are not numeric.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn set_get_has_remove() {
        let mut data = SessionData::new();
        assert!(!data.has("name"));
        data.set("name", "Ada");
        assert_eq!(data.get("name"), Some(&json!("Ada")));
        assert_eq!(data.set("name", "Grace"), Some(json!("Ada")));
        assert_eq!(data.remove("name"), Some(json!("Grace")));
        assert!(data.is_empty());
    }

    #[test]
    fn merge_overwrites_existing_keys() {
        let mut data = SessionData::new();
        data.set("a", 1);
        data.set("b", 2);
        let incoming = json!({"b": 3, "c": 4});
        let Value::Object(map) = incoming else {
            unreachable!()
        };
        data.merge(map);
        assert_eq!(data.get("b"), Some(&json!(3)));
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn truthiness_policy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!("false")));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!(2.5)));
        assert!(is_truthy(&json!([1])));
        assert!(is_truthy(&json!({"k": 1})));
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(as_number(&json!(20)), Some(20.0));
        assert_eq!(as_number(&json!(" 20.5 ")), Some(20.5));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!(true)), None);
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!("inf")), None);
        assert_eq!(as_number(&json!("-Infinity")), None);
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut data = SessionData::new();
        data.set("x", 1);
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"x":1}"#);
    }
}
