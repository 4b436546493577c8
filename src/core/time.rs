//! Shared timestamp/event helpers for headers and command envelopes.

use chrono::SecondsFormat;
use serde_json::{Map, Value as JsonValue};
use ulid::Ulid;

/// Format used in the `Generated:` line of file headers.
pub const HEADER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time formatted for a file header (e.g. `2026-10-19 14:03:22`).
pub fn header_timestamp() -> String {
    chrono::Local::now().format(HEADER_TIMESTAMP_FORMAT).to_string()
}

/// UTC timestamp for JSON envelopes (e.g. `2026-10-19T12:03:22Z`).
pub fn envelope_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Identifier for one generator run or command invocation.
pub fn new_run_id() -> String {
    Ulid::new().to_string()
}

/// JSON document printed by `--format json`: `cmd`, `status`, `ts` and
/// `event_id`, followed by the fields of `body` when it is an object.
pub fn command_envelope(cmd: &str, status: &str, body: JsonValue) -> JsonValue {
    let mut envelope = Map::new();
    envelope.insert("cmd".into(), cmd.into());
    envelope.insert("status".into(), status.into());
    envelope.insert("ts".into(), envelope_timestamp().into());
    envelope.insert("event_id".into(), new_run_id().into());
    if let JsonValue::Object(fields) = body {
        envelope.extend(fields);
    }
    JsonValue::Object(envelope)
}
