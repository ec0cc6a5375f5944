use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::conversation::event::RawPayload;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const EXTRACTION_FUNCTION: &str = "create_calendar_event";

const SYSTEM_PROMPT: &str = "You are EventElf, a calendar assistant. Extract every calendar \
event the user describes by calling the provided function, once per event. If the message \
describes no calendar event, call nothing. Dates must be resolved to YYYY-MM-DD using the \
stated current date; times are 24-hour HH:MM.";

/// The extraction capability could not be reached or gave an unusable
/// answer. Every variant surfaces to the user the same way; the split
/// exists for logging.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("extraction API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid extraction response: {0}")]
    InvalidResponse(String),
}

/// Seam for the text-to-structured-data capability. Returns zero or more
/// candidate payloads; an empty Vec is the normal "no event detected"
/// outcome, not an error.
#[async_trait]
pub trait EventExtractor: Send + Sync {
    async fn extract(
        &self,
        utterance: &str,
        reference_date: NaiveDate,
    ) -> Result<Vec<RawPayload>, ExtractionError>;
}

/// OpenAI chat-completions adapter in tool-calling mode, constrained to
/// one declared function with a fixed argument schema.
pub struct OpenAiExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAiExtractor {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn event_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Event title" },
                "date": { "type": "string", "description": "Event date, YYYY-MM-DD" },
                "start_time": { "type": "string", "description": "Start time, 24-hour HH:MM" },
                "end_time": { "type": "string", "description": "End time, 24-hour HH:MM" },
                "recurrence": {
                    "type": "string",
                    "description": "Recurrence rule, e.g. RRULE:FREQ=WEEKLY;BYDAY=MO"
                },
                "reminder": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Reminder, minutes before start"
                }
            },
            "required": ["title", "date", "start_time", "end_time"]
        })
    }

    fn build_request(&self, utterance: &str, reference_date: NaiveDate) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
                ChatMessage {
                    role: "user".to_string(),
                    // Reference date first, so "next Friday" has an anchor.
                    content: format!("Today's date is {}. {}", reference_date, utterance),
                },
            ],
            tools: vec![Tool {
                tool_type: "function".to_string(),
                function: FunctionDef {
                    name: EXTRACTION_FUNCTION.to_string(),
                    description: "Create one calendar event from the user's message".to_string(),
                    parameters: Self::event_schema(),
                },
            }],
            tool_choice: "auto".to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    async fn handle_error_status(&self, status: u16, response: reqwest::Response) -> ExtractionError {
        let message = response.text().await.unwrap_or_else(|_| "unknown error".to_string());

        match status {
            401 | 403 => ExtractionError::Authentication(format!("status {}: {}", status, message)),
            _ => ExtractionError::Api { status, message },
        }
    }
}

#[async_trait]
impl EventExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        utterance: &str,
        reference_date: NaiveDate,
    ) -> Result<Vec<RawPayload>, ExtractionError> {
        let request = self.build_request(utterance, reference_date);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "extraction response");

        if !status.is_success() {
            return Err(self.handle_error_status(status.as_u16(), response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::InvalidResponse(e.to_string()))?;

        let choice = match completion.choices.into_iter().next() {
            Some(c) => c,
            // No choices at all: treat as "nothing detected".
            None => return Ok(Vec::new()),
        };

        let payloads = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| RawPayload {
                function_name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(payloads)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    tools: Vec<Tool>,
    tool_choice: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "type")]
    tool_type: String,
    function: FunctionDef,
}

#[derive(Debug, Serialize)]
struct FunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}
