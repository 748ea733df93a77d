//! Response envelope handling.
//!
//! Endpoints wrap their payload under `data` or `result` inconsistently.
//! This is the only place that knows about it; callers receive the payload.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::sanitize::truncate_body;

/// Extracts the payload from `{ "data": .. }` or `{ "result": .. }`.
///
/// `data` wins when both are present and non-null.
pub fn unwrap_envelope<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let Value::Object(mut map) = body else {
        return Err(ApiError::MissingEnvelope);
    };

    let payload = ["data", "result"]
        .into_iter()
        .filter_map(|key| map.remove(key))
        .find(|v| !v.is_null())
        .ok_or(ApiError::MissingEnvelope)?;

    serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Builds a user-facing message for a non-2xx response.
///
/// Looks for `detail`, `error` or `message` in a JSON body and falls back
/// to `HTTP <status>`.
pub fn error_message(status: u16, body: &str) -> String {
    let fallback = format!("HTTP {}", status);

    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return fallback;
    };

    ["detail", "error", "message"]
        .iter()
        .filter_map(|key| json.get(*key))
        .find_map(describe)
        .map(|msg| truncate_body(&msg))
        .unwrap_or(fallback)
}

fn describe(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        // Validation errors: [{ "loc": [..], "msg": ".." }, ..]
        Value::Array(items) => {
            let msgs: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => other.get("msg").and_then(Value::as_str).map(str::to_string),
                })
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        Value::Object(obj) => obj
            .get("message")
            .or_else(|| obj.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
