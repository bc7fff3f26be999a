//! Config redaction: mask secrets before a config is printed or logged.

use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "token",
    "accessToken",
    "access_token",
    "secret",
    "password",
];

/// Replace every sensitive string field with a masked hint
/// (`"AIza***"`; short values become `"***"`).
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    if s.chars().count() > 8 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_api_key() {
        let v = json!({"recognition": {"apiKey": "AIzaSyD-very-secret"}});
        let out = redact(&v);
        let key = out["recognition"]["apiKey"].as_str().unwrap();
        assert_eq!(key, "AIza***");
    }

    #[test]
    fn short_secret_fully_masked() {
        let out = redact(&json!({"apiKey": "abc"}));
        assert_eq!(out["apiKey"], "***");
    }

    #[test]
    fn leaves_other_fields() {
        let v = json!({"recognition": {"model": "gemini-2.5-flash"}, "camera": {"jpegQuality": 85}});
        assert_eq!(redact(&v), v);
    }
}
