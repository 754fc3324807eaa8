//! Client and server message types

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::Employee;
use crate::store::Page;

/// Number of records added when `addRecords` carries no count
pub const DEFAULT_ADD_COUNT: i64 = 5;

/// Message sent by a viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Ask for one page of the current store
    RequestPage(i64),
    /// Ask for up to `n` generated records to be inserted
    AddRecords(i64),
    /// Ask for a record to be removed
    DeleteRecord(String),
}

/// Error decoding a client frame
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Frame is not a JSON envelope
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Envelope names an event the server does not handle
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Event payload has the wrong shape
    #[error("invalid payload for {event}: {reason}")]
    InvalidPayload { event: &'static str, reason: String },
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl ClientMessage {
    /// Decode a client text frame
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;

        match envelope.event.as_str() {
            // Always answered, so anything unusable asks for the empty page 0
            "requestPage" => Ok(ClientMessage::RequestPage(
                integer(&envelope.data).unwrap_or(0),
            )),
            "addRecords" => {
                let count = if envelope.data.is_null() {
                    DEFAULT_ADD_COUNT
                } else {
                    integer(&envelope.data).unwrap_or(0)
                };
                Ok(ClientMessage::AddRecords(count))
            }
            "deleteRecord" => match envelope.data {
                serde_json::Value::String(id) => Ok(ClientMessage::DeleteRecord(id)),
                other => Err(ProtocolError::InvalidPayload {
                    event: "deleteRecord",
                    reason: format!("expected string id, got {}", other),
                }),
            },
            _ => Err(ProtocolError::UnknownEvent(envelope.event)),
        }
    }

    /// Event name on the wire
    pub fn event(&self) -> &'static str {
        match self {
            ClientMessage::RequestPage(_) => "requestPage",
            ClientMessage::AddRecords(_) => "addRecords",
            ClientMessage::DeleteRecord(_) => "deleteRecord",
        }
    }
}

/// Integral JSON number, saturated to the `i64` range
///
/// Browsers happily send `2.0` for `2`, and `1e20` is still an integer.
fn integer(value: &serde_json::Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if value.is_u64() {
        return Some(i64::MAX);
    }
    match value.as_f64() {
        // `as` saturates at the i64 bounds
        Some(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

/// Count-only sync payload sent right after the connect snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCount {
    pub total: usize,
    pub total_pages: usize,
}

/// Result of an `addRecords` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsAdded {
    /// Records actually inserted, zero when the store was full
    pub added: usize,
    pub total: usize,
    pub total_pages: usize,
    pub message: String,
}

/// A record was removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDeleted {
    pub id: String,
    pub total: usize,
    pub total_pages: usize,
    pub message: String,
}

/// The periodic inserter added a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInserted {
    pub record: Employee,
    pub total: usize,
    pub total_pages: usize,
}

/// Message sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Page 1, sent once per connect
    InitialSnapshot(Page),
    /// Totals, sent once per connect after the snapshot
    SyncCount(SyncCount),
    /// Reply to `requestPage`
    PageData(Page),
    RecordsAdded(RecordsAdded),
    RecordDeleted(RecordDeleted),
    RecordInserted(RecordInserted),
}

impl ServerMessage {
    /// Event name on the wire
    pub fn event(&self) -> &'static str {
        match self {
            ServerMessage::InitialSnapshot(_) => "initialSnapshot",
            ServerMessage::SyncCount(_) => "syncCount",
            ServerMessage::PageData(_) => "pageData",
            ServerMessage::RecordsAdded(_) => "recordsAdded",
            ServerMessage::RecordDeleted(_) => "recordDeleted",
            ServerMessage::RecordInserted(_) => "recordInserted",
        }
    }

    /// Serialize into a frame payload
    ///
    /// Encoded once per message; the reference-counted `Bytes` is shared by
    /// every recipient queue.
    pub fn encode(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}
