//! Log Redaction Layer
//!
//! Scrubs API keys and bearer tokens from strings prior to logging. Error
//! strings from HTTP clients can carry the request URL, and with it the key.

use regex::Regex;
use std::sync::LazyLock;

static GOOGLE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AIza[0-9A-Za-z\-_]{20,}").unwrap());
static KEY_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([?&](?:key|api_key|apikey)=)[^&\s)]+").unwrap());
static KEY_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(x-goog-api-key:\s*)\S+").unwrap());
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = KEY_PARAM_RE.replace_all(input, "${1}[REDACTED]");
    let redacted = KEY_HEADER_RE.replace_all(&redacted, "${1}[REDACTED]");
    let redacted = GOOGLE_KEY_RE.replace_all(&redacted, "[REDACTED_KEY]");
    BEARER_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_key_query_param() {
        let raw = "error sending request for url (https://host/v1beta/models/m:generateContent?key=secret123)";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("secret123"));
        assert!(clean.contains("?key=[REDACTED]"));
    }

    #[test]
    fn redacts_google_key_anywhere() {
        let clean = redact_sensitive_data("key AIzaSyA1234567890abcdefghijklmnop used");
        assert!(!clean.contains("AIzaSy"));
    }

    #[test]
    fn redacts_header_and_bearer() {
        let clean = redact_sensitive_data("x-goog-api-key: abc123 Bearer eyJhbGciOiJIUzI1NiJ9");
        assert!(!clean.contains("abc123"));
        assert!(!clean.contains("eyJhbGci"));
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(redact_sensitive_data("connection refused"), "connection refused");
    }
}
