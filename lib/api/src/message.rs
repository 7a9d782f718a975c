//! Translation of error response bodies into display text.
//!
//! Priority: a structured `errors` field (array, or object of field to
//! message), then a string `error`, then a string `message`, then
//! `HTTP <status>`.

use serde_json::Value;

/// Derives the message for a non-2xx response.
#[must_use]
pub fn error_message(status: u16, body: Option<&Value>) -> String {
    body.and_then(|b| {
        b.get("errors")
            .and_then(structured_errors)
            .or_else(|| b.get("error").and_then(non_empty_str))
            .or_else(|| b.get("message").and_then(non_empty_str))
    })
    .unwrap_or_else(|| format!("HTTP {status}"))
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn structured_errors(errors: &Value) -> Option<String> {
    let parts: Vec<String> = match errors {
        Value::Array(items) => items.iter().filter_map(item_text).collect(),
        Value::Object(fields) => fields
            .iter()
            .filter_map(|(field, v)| field_text(v).map(|m| format!("{field}: {m}")))
            .collect(),
        _ => return None,
    };
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn item_text(item: &Value) -> Option<String> {
    match item {
        Value::String(_) => non_empty_str(item),
        Value::Object(obj) => obj
            .get("message")
            .or_else(|| obj.get("msg"))
            .and_then(non_empty_str)
            .or_else(|| Some(item.to_string())),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let msgs: Vec<String> = items.iter().filter_map(item_text).collect();
            (!msgs.is_empty()).then(|| msgs.join(", "))
        }
        other => item_text(other),
    }
}
