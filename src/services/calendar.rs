use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::conversation::event::EventDescriptor;

const DEFAULT_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_CALENDAR_ID: &str = "primary";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("network error: {0}")]
    Network(String),

    #[error("calendar API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

/// Wire body for event insertion. Optional keys are omitted entirely when
/// absent; the backend fills its own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBody {
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
}

impl EventBody {
    /// Maps a descriptor to the backend's combined date-time form:
    /// `date + start_time` / `date + end_time`, seconds zeroed, UTC.
    pub fn from_descriptor(descriptor: &EventDescriptor) -> Self {
        Self {
            summary: descriptor.title.clone(),
            start: EventDateTime {
                date_time: format!("{}T{}:00", descriptor.date, descriptor.start_time),
                time_zone: "UTC".to_string(),
            },
            end: EventDateTime {
                date_time: format!("{}T{}:00", descriptor.date, descriptor.end_time),
                time_zone: "UTC".to_string(),
            },
            recurrence: descriptor.recurrence.clone().map(|rule| vec![rule]),
            reminders: descriptor.reminder.map(|minutes| Reminders {
                use_default: false,
                overrides: vec![ReminderOverride { method: "popup".to_string(), minutes }],
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default, rename = "htmlLink")]
    pub html_link: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Seam for the calendar-creation collaborator. One call per descriptor;
/// any error is a per-item failure for the dispatcher, never a batch abort.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    async fn create_event(&self, body: &EventBody) -> Result<CreatedEvent, CalendarError>;
}

/// Google Calendar `events.insert` client. Token acquisition/refresh happens
/// elsewhere; this client is handed a ready bearer token.
pub struct GoogleCalendarClient {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
    calendar_id: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_url: DEFAULT_API_URL.to_string(),
            access_token,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    fn insert_url(&self) -> String {
        format!("{}/calendars/{}/events", self.api_url, self.calendar_id)
    }
}

#[async_trait]
impl CalendarBackend for GoogleCalendarClient {
    async fn create_event(&self, body: &EventBody) -> Result<CreatedEvent, CalendarError> {
        let response = self
            .client
            .post(self.insert_url())
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| CalendarError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), summary = %body.summary, "calendar insert response");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(CalendarError::Api { status: status.as_u16(), message });
        }

        response.json::<CreatedEvent>().await.map_err(|e| CalendarError::Network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn descriptor() -> EventDescriptor {
        EventDescriptor {
            title: "Team sync".to_string(),
            date: "2025-03-12".to_string(),
            start_time: "10:00".to_string(),
            end_time: "11:30".to_string(),
            recurrence: None,
            reminder: None,
        }
    }

    #[test]
    fn maps_date_and_times_to_combined_datetime() {
        let body = EventBody::from_descriptor(&descriptor());

        assert_eq!(body.summary, "Team sync");
        assert_eq!(body.start.date_time, "2025-03-12T10:00:00");
        assert_eq!(body.end.date_time, "2025-03-12T11:30:00");
        assert_eq!(body.start.time_zone, "UTC");
    }

    #[test]
    fn omits_recurrence_and_reminders_when_absent() {
        let body = EventBody::from_descriptor(&descriptor());
        let json = serde_json::to_value(&body).unwrap();

        assert!(json.get("recurrence").is_none());
        assert!(json.get("reminders").is_none());
    }

    #[test]
    fn wraps_recurrence_in_a_single_element_list() {
        let mut d = descriptor();
        d.recurrence = Some("RRULE:FREQ=DAILY;COUNT=5".to_string());

        let body = EventBody::from_descriptor(&d);
        assert_eq!(body.recurrence, Some(vec!["RRULE:FREQ=DAILY;COUNT=5".to_string()]));
    }

    #[test]
    fn reminder_becomes_non_default_popup_override() {
        let mut d = descriptor();
        d.reminder = Some(15);

        let body = EventBody::from_descriptor(&d);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["reminders"]["useDefault"], false);
        assert_eq!(json["reminders"]["overrides"][0]["method"], "popup");
        assert_eq!(json["reminders"]["overrides"][0]["minutes"], 15);
    }

    #[tokio::test]
    async fn inserts_event_against_backend() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "summary": "Team sync",
                "start": { "dateTime": "2025-03-12T10:00:00", "timeZone": "UTC" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "evt_1",
                "htmlLink": "https://calendar.example/evt_1",
                "summary": "Team sync"
            })))
            .mount(&mock_server)
            .await;

        let client =
            GoogleCalendarClient::new("test-token".to_string()).with_api_url(mock_server.uri());

        let created = client
            .create_event(&EventBody::from_descriptor(&descriptor()))
            .await
            .expect("should create");

        assert_eq!(created.id, "evt_1");
    }

    #[tokio::test]
    async fn surfaces_api_rejection_with_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(403).set_body_string("insufficient scope"))
            .mount(&mock_server)
            .await;

        let client =
            GoogleCalendarClient::new("test-token".to_string()).with_api_url(mock_server.uri());

        let result = client.create_event(&EventBody::from_descriptor(&descriptor())).await;

        match result {
            Err(CalendarError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert!(message.contains("insufficient scope"));
            }
            other => panic!("expected Api error, got {:?}", other.map(|c| c.id)),
        }
    }
}
