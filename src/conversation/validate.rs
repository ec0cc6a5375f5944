use serde::Deserialize;
use thiserror::Error;

use super::event::{EventDescriptor, RawPayload};

/// Why a raw payload did not become an event descriptor. One reason per
/// payload; the first problem found wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("payload arguments are not valid JSON: {0}")]
    Malformed(String),
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("reminder must be a non-negative number of minutes, got {0}")]
    InvalidReminder(String),
}

/// Shape of the argument blob before any checks. Everything optional so
/// that presence is our decision, not serde's.
#[derive(Debug, Deserialize)]
struct RawEventFields {
    title: Option<String>,
    date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    recurrence: Option<String>,
    reminder: Option<serde_json::Value>,
}

/// Pure function: RawPayload -> EventDescriptor or a rejection.
/// Deterministic; re-validating the same payload yields the same result.
pub fn validate(payload: &RawPayload) -> Result<EventDescriptor, RejectionReason> {
    let fields: RawEventFields = serde_json::from_str(&payload.arguments)
        .map_err(|e| RejectionReason::Malformed(e.to_string()))?;

    let title = required(fields.title, "title")?;
    let date = required(fields.date, "date")?;
    let start_time = required(fields.start_time, "start_time")?;
    let end_time = required(fields.end_time, "end_time")?;

    let reminder = match fields.reminder {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(parse_reminder(&value)?),
    };

    let recurrence = fields.recurrence.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());

    Ok(EventDescriptor {
        title,
        date,
        start_time,
        end_time,
        recurrence,
        reminder,
    })
}

fn required(value: Option<String>, name: &str) -> Result<String, RejectionReason> {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(RejectionReason::MissingField(name.to_string()))
            } else {
                Ok(trimmed.to_string())
            }
        }
        None => Err(RejectionReason::MissingField(name.to_string())),
    }
}

// The capability is inconsistent about numbers: sometimes `15`,
// sometimes `"15"`. Accept both, reject everything else.
fn parse_reminder(value: &serde_json::Value) -> Result<u32, RejectionReason> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|m| u32::try_from(m).ok())
            .ok_or_else(|| RejectionReason::InvalidReminder(n.to_string())),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| RejectionReason::InvalidReminder(s.clone())),
        other => Err(RejectionReason::InvalidReminder(other.to_string())),
    }
}
