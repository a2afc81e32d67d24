//! Encoder status signal classification.
//!
//! The encoder reports a code string plus a free-form payload. Known codes
//! are connection transitions; anything else may carry a JSON telemetry
//! object, or may be an implementation-specific diagnostic string that is
//! silently ignored.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use scorecast_encoder::codes;
use scorecast_ipc::TelemetrySample;

/// Connection status a status code moves the session to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionTransition {
    Connected,
    Failed,
    Closed,
}

/// A classified encoder status signal.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// The connection moved to a new status.
    Connection(ConnectionTransition),

    /// Telemetry payload. At least one of the fields is set.
    Telemetry {
        /// Bitrate sample, when the payload had a positive `bitrate`.
        sample: Option<TelemetrySample>,

        /// Rounded rendering fps, when the payload had a positive `fps`.
        fps: Option<u32>,
    },

    /// Unknown code with no usable payload.
    Ignored,
}

/// Classify a status signal, stamping telemetry with the current time.
pub fn parse(code: &str, payload: &str) -> StatusEvent {
    parse_at(code, payload, now_ms())
}

/// Classify a status signal, stamping telemetry with `now_ms`.
pub fn parse_at(code: &str, payload: &str, now_ms: u64) -> StatusEvent {
    if let Some(transition) = transition_for(code) {
        return StatusEvent::Connection(transition);
    }

    let Ok(Value::Object(data)) = serde_json::from_str::<Value>(payload) else {
        return StatusEvent::Ignored;
    };

    let sample = positive(data.get("bitrate")).map(|bitrate| TelemetrySample {
        timestamp_ms: now_ms,
        bitrate_kbps: bitrate / 1024.0,
    });
    let fps = positive(data.get("fps")).map(|fps| fps.round() as u32);

    if sample.is_none() && fps.is_none() {
        return StatusEvent::Ignored;
    }

    StatusEvent::Telemetry { sample, fps }
}

fn transition_for(code: &str) -> Option<ConnectionTransition> {
    match code {
        codes::CONNECT_SUCCESS | codes::PUBLISH_START => Some(ConnectionTransition::Connected),
        codes::CONNECT_FAILED | codes::CONNECT_REJECTED => Some(ConnectionTransition::Failed),
        codes::CONNECT_CLOSED | codes::PLAY_STOP => Some(ConnectionTransition::Closed),
        _ => None,
    }
}

fn positive(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Wall-clock milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_codes() {
        let cases = [
            ("NetStream.Connect.Success", ConnectionTransition::Connected),
            ("NetStream.Publish.Start", ConnectionTransition::Connected),
            ("NetStream.Connect.Failed", ConnectionTransition::Failed),
            ("NetStream.Connect.Rejected", ConnectionTransition::Failed),
            ("NetStream.Connect.Closed", ConnectionTransition::Closed),
            ("NetStream.Play.Stop", ConnectionTransition::Closed),
        ];

        for (code, expected) in cases {
            assert_eq!(parse(code, ""), StatusEvent::Connection(expected), "{code}");
        }
    }

    #[test]
    fn test_failed_ignores_payload() {
        for payload in ["", "garbage", "{\"bitrate\": 5000}", "null"] {
            assert_eq!(
                parse("NetStream.Connect.Failed", payload),
                StatusEvent::Connection(ConnectionTransition::Failed)
            );
        }
    }

    #[test]
    fn test_bitrate_sample() {
        let event = parse_at("NetStream.Info", r#"{"bitrate": 2048000}"#, 42);
        assert_eq!(
            event,
            StatusEvent::Telemetry {
                sample: Some(TelemetrySample {
                    timestamp_ms: 42,
                    bitrate_kbps: 2000.0,
                }),
                fps: None,
            }
        );
    }

    #[test]
    fn test_fps_rounds() {
        let event = parse_at("stats", r#"{"fps": 29.6}"#, 0);
        assert_eq!(
            event,
            StatusEvent::Telemetry {
                sample: None,
                fps: Some(30),
            }
        );
    }

    #[test]
    fn test_bitrate_and_fps_together() {
        match parse_at("stats", r#"{"bitrate": 1024, "fps": 30}"#, 7) {
            StatusEvent::Telemetry { sample, fps } => {
                assert_eq!(sample.map(|s| s.bitrate_kbps), Some(1.0));
                assert_eq!(fps, Some(30));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unusable_payloads_are_ignored() {
        let payloads = [
            "",
            "not json",
            "{",
            "[1, 2, 3]",
            "\"text\"",
            "{}",
            r#"{"bitrate": 0, "fps": -1}"#,
            r#"{"bitrate": "2048"}"#,
            r#"{"other": 1}"#,
        ];

        for payload in payloads {
            assert_eq!(parse("stats", payload), StatusEvent::Ignored, "{payload}");
        }
    }
}
