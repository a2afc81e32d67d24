//! Redaction of secrets before they reach the logs.
//!
//! Stream keys travel inside publish URLs (`.../app/<key>`,
//! `.../live2/<key>`) and OAuth tokens can appear in collaborator error
//! payloads. Anything logged with a URL or a structured context goes
//! through here first.

use std::fmt;

use serde_json::{Map, Value};

/// Replacement text for redacted values.
pub const REDACTED: &str = "[REDACTED]";

const KEY_MARKERS: [&str; 2] = ["/live2/", "app/"];

const SENSITIVE_KEYS: [&str; 5] = ["key", "apikey", "clientid", "idtoken", "accesstoken"];

/// Strings at least this long are checked for token shapes.
const TOKEN_MIN_LEN: usize = 50;

/// Hide the stream key segment of a publish URL.
///
/// Only the first key segment is replaced. A key is a non-empty run of ASCII
/// alphanumerics, `_` and `-` right after a marker; markers with nothing
/// after them are skipped.
pub fn redact_stream_url(url: &str) -> String {
    let mut candidates: Vec<usize> = KEY_MARKERS
        .iter()
        .flat_map(|marker| url.match_indices(marker).map(|(at, m)| at + m.len()))
        .collect();
    candidates.sort_unstable();

    for start in candidates {
        let len = url[start..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
            .count();

        if len > 0 {
            return format!("{}{}{}", &url[..start], REDACTED, &url[start + len..]);
        }
    }

    url.to_string()
}

/// Redact sensitive values in a structured log context.
pub fn redact_context(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if is_sensitive_key(&k) {
                        (k, Value::String(REDACTED.to_string()))
                    } else {
                        (k, redact_context(v))
                    }
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_context).collect()),
        Value::String(s) => Value::String(redact_string(s)),
        other => other,
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|k| key.contains(k))
}

fn redact_string(s: String) -> String {
    if s.len() <= TOKEN_MIN_LEN {
        return s;
    }
    if s.starts_with("ya29.") || s.starts_with("ey") {
        return REDACTED.to_string();
    }
    if s.starts_with("rtmp") {
        return redact_stream_url(&s);
    }
    s
}

/// Display wrapper for publish URLs in tracing fields.
pub struct RedactedUrl<'a>(pub &'a str);

impl fmt::Display for RedactedUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact_stream_url(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_stream_url() {
        assert_eq!(
            redact_stream_url("rtmps://ingest.twitch.tv/app/live_123-abc"),
            "rtmps://ingest.twitch.tv/app/[REDACTED]"
        );
        assert_eq!(
            redact_stream_url("rtmp://a.rtmp.youtube.com/live2/abcd-efgh-ijkl"),
            "rtmp://a.rtmp.youtube.com/live2/[REDACTED]"
        );
        assert_eq!(
            redact_stream_url("rtmp://host/app/key?x=1"),
            "rtmp://host/app/[REDACTED]?x=1"
        );
    }

    #[test]
    fn test_url_without_key_is_unchanged() {
        assert_eq!(
            redact_stream_url("rtmps://ingest.twitch.tv/app/"),
            "rtmps://ingest.twitch.tv/app/"
        );
        assert_eq!(redact_stream_url("srt://host:9000"), "srt://host:9000");
    }

    #[test]
    fn test_skips_markers_without_key() {
        assert_eq!(
            redact_stream_url("rtmp://host/app/?next=/live2/abc123"),
            "rtmp://host/app/?next=/live2/[REDACTED]"
        );
        assert_eq!(
            redact_stream_url("rtmp://host/app//app/key-2"),
            "rtmp://host/app//app/[REDACTED]"
        );
    }

    #[test]
    fn test_key_segment_is_ascii_only() {
        assert_eq!(
            redact_stream_url("rtmp://host/app/abcé"),
            "rtmp://host/app/[REDACTED]é"
        );
        assert_eq!(redact_stream_url("rtmp://host/app/ékey"), "rtmp://host/app/ékey");
    }

    #[test]
    fn test_redact_context_keys() {
        let context = json!({
            "name": "Twitch",
            "key": "abc",
            "nested": { "accessToken": "secret", "count": 3 },
            "apiKey": "xyz",
        });

        let redacted = redact_context(context);
        assert_eq!(redacted["name"], "Twitch");
        assert_eq!(redacted["key"], REDACTED);
        assert_eq!(redacted["apiKey"], REDACTED);
        assert_eq!(redacted["nested"]["accessToken"], REDACTED);
        assert_eq!(redacted["nested"]["count"], 3);
    }

    #[test]
    fn test_redact_context_token_shapes() {
        let token = format!("ya29.{}", "a".repeat(60));
        let url = format!("rtmp://a.rtmp.youtube.com/live2/{}", "k".repeat(40));
        let redacted = redact_context(json!({ "detail": token, "target": url, "short": "ey" }));

        assert_eq!(redacted["detail"], REDACTED);
        assert_eq!(
            redacted["target"],
            "rtmp://a.rtmp.youtube.com/live2/[REDACTED]"
        );
        assert_eq!(redacted["short"], "ey");
    }

    #[test]
    fn test_redacted_url_display() {
        let shown = format!("{}", RedactedUrl("rtmps://ingest.twitch.tv/app/abc"));
        assert!(!shown.contains("abc"));
    }
}
