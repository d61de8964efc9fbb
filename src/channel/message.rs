// Inbound wire message decoding

use serde::de::Error as _;
use serde_json::Value;

use crate::models::SnapshotUpdate;

/// What a single inbound payload turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Snapshot(SnapshotUpdate),
    /// `{"error": "..."}` from the far end.
    RemoteError(String),
}

/// Decode one payload. Anything that is not a JSON object is a parse error.
pub fn decode_message(payload: &str) -> Result<Inbound, serde_json::Error> {
    let value: Value = serde_json::from_str(payload)?;
    let Value::Object(map) = value else {
        return Err(serde_json::Error::custom("expected a JSON object"));
    };
    if let Some(Value::String(message)) = map.get("error") {
        return Ok(Inbound::RemoteError(message.clone()));
    }
    let update: SnapshotUpdate = serde_json::from_value(Value::Object(map))?;
    Ok(Inbound::Snapshot(update))
}
