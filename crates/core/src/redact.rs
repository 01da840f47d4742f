// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redaction of sensitive fields before logging.
//!
//! Log records must never carry credentials. [`redact_value`] replaces the
//! value of every sensitive field name, at any nesting depth, with
//! `"[REDACTED]"`. Matching is exact and case-sensitive; both spellings of
//! the authorization header are listed.

use serde::Serialize;
use serde_json::Value;

/// Replacement written over sensitive values.
pub const REDACTED: &str = "[REDACTED]";

/// Field names whose values are replaced.
const SENSITIVE_KEYS: &[&str] = &[
    "botToken",
    "appToken",
    "token",
    "password",
    "secret",
    "apiKey",
    "api_key",
    "authorization",
    "Authorization",
];

/// Redact sensitive fields in place, recursing through objects and arrays.
pub fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    *entry = Value::String(REDACTED.to_string());
                } else {
                    redact_value(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_value(item);
            }
        }
        _ => {}
    }
}

/// Serialize a value to JSON with sensitive fields redacted.
///
/// Intended for log output; serialization failures degrade to a placeholder
/// rather than erroring.
pub fn redacted_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(mut json) => {
            redact_value(&mut json);
            json.to_string()
        }
        Err(_) => "<unserializable>".to_string(),
    }
}

#[cfg(test)]
#[path = "redact_tests.rs"]
mod tests;
