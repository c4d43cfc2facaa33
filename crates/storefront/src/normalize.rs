//! Best-effort extraction of entity lists from API responses.
//!
//! The backend does not wrap its list endpoints consistently: some return
//! `{ data: [...] }`, others `{ data: { docs: [...] } }`, `{ products: [...] }`
//! and so on. Everything here works on `serde_json::Value` and never fails;
//! finding no list at all is a valid, empty result.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Conventional envelope keys, tried in this order.
pub const LIST_KEYS: [&str; 10] = [
    "docs",
    "items",
    "results",
    "products",
    "categories",
    "list",
    "rows",
    "payload",
    "records",
    "data",
];

/// Extract the list of records from an API response.
///
/// Attempts, first match wins:
/// 1. `response.data` is an array
/// 2. `response.data.<key>` is an array, for each of [`LIST_KEYS`]
/// 3. the first array among `response.data`'s values, in the order the keys
///    appear in the response body
/// 4. `response.<key>` is an array, for each of [`LIST_KEYS`]
/// 5. otherwise, empty
#[must_use]
pub fn extract_list(response: &Value) -> Vec<Value> {
    let data = response.get("data");

    if let Some(Value::Array(items)) = data {
        return items.clone();
    }

    if let Some(Value::Object(map)) = data {
        if let Some((key, items)) = find_known_key(map) {
            tracing::warn!(path = %format!("data.{key}"), "Using array from nested response field");
            return items.clone();
        }

        if let Some(items) = map.values().find_map(Value::as_array) {
            tracing::warn!("Using first array found inside response data");
            return items.clone();
        }
    }

    if let Some((key, items)) = response.as_object().and_then(find_known_key) {
        tracing::warn!(path = %key, "Using array from top-level response field");
        return items.clone();
    }

    tracing::debug!("No list found in response");
    Vec::new()
}

fn find_known_key(map: &Map<String, Value>) -> Option<(&'static str, &Vec<Value>)> {
    LIST_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array).map(|v| (*key, v)))
}

/// Extract and deserialize records, skipping any that do not parse.
#[must_use]
pub fn extract_records<T: DeserializeOwned>(response: &Value) -> Vec<T> {
    extract_list(response)
        .into_iter()
        .filter_map(parse_record)
        .collect()
}

/// Extract a single record from a detail/create/update response.
///
/// Reads `response.data` when it is an object, otherwise the response
/// itself. Returns `None` if the record does not parse.
#[must_use]
pub fn extract_record<T: DeserializeOwned>(response: &Value) -> Option<T> {
    let raw = match response.get("data") {
        Some(data @ Value::Object(_)) => data.clone(),
        _ => response.clone(),
    };
    parse_record(raw)
}

/// Deserialize one raw record, logging and returning `None` on a mismatch.
pub fn parse_record<T: DeserializeOwned>(raw: Value) -> Option<T> {
    match serde_json::from_value(canonical_id(raw)) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping record that does not match the expected shape");
            None
        }
    }
}

/// Collapse Mongo-style `_id` into `id` so records carrying both parse.
/// Nested `subcategories` get the same treatment.
fn canonical_id(mut raw: Value) -> Value {
    if let Value::Object(map) = &mut raw {
        if let Some(mongo_id) = map.remove("_id") {
            map.insert("id".to_owned(), mongo_id);
        }
        if let Some(Value::Array(children)) = map.get_mut("subcategories") {
            for child in children.iter_mut() {
                *child = canonical_id(child.take());
            }
        }
    }
    raw
}
