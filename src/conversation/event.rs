use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

/// One tool call as returned by the extraction capability. The argument
/// blob is an unparsed JSON string; the validator decides what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub function_name: String,
    pub arguments: String,
}

/// Normalized representation of one calendar event, as confirmed by the
/// validator. Field values are trimmed; `recurrence` is passed through
/// verbatim to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub title: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// 24-hour `HH:MM`.
    pub start_time: String,
    /// 24-hour `HH:MM`. Not checked against `start_time`; the backend is
    /// the authority on temporal sanity.
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
    /// Minutes before start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<u32>,
}

/// Who a reported chat message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    System,
    User,
}
