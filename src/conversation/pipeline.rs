use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::dispatch::{dispatch, BatchSummary};
use super::event::{ConversationId, EventDescriptor, Sender};
use super::state::{ConversationState, SessionStore};
use super::validate::{validate, RejectionReason};
use crate::outputs::reporter::Reporter;
use crate::services::calendar::CalendarBackend;
use crate::services::extraction::EventExtractor;

const MSG_NO_EVENT: &str =
    "I couldn't find any event details in that message. Tell me what to schedule, with a date and a time.";
const MSG_UNAVAILABLE: &str =
    "Sorry, I couldn't process your request right now. Please try again in a moment.";
const MSG_CANCELLED: &str = "Okay, I won't add anything to your calendar.";

/// Turn driver for the extraction & confirmation flow. Owns the
/// collaborators and the per-conversation state; one `handle_turn` call
/// advances exactly one conversation by exactly one turn.
pub struct Pipeline {
    extractor: Arc<dyn EventExtractor>,
    backend: Arc<dyn CalendarBackend>,
    reporter: Arc<dyn Reporter>,
    sessions: SessionStore,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn EventExtractor>,
        backend: Arc<dyn CalendarBackend>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self { extractor, backend, reporter, sessions: SessionStore::new() }
    }

    pub fn state(&self, conversation: &ConversationId) -> &ConversationState {
        self.sessions.state(conversation)
    }

    /// Single entrypoint for surrounding collaborators. Awaited to
    /// completion per user turn; no two turns run concurrently for the
    /// same conversation.
    pub async fn handle_turn(&mut self, conversation: &ConversationId, utterance: &str) {
        match self.sessions.take(conversation) {
            ConversationState::Idle => self.start_batch(conversation, utterance).await,
            ConversationState::PendingConfirmation { batch } => {
                // While pending, ALL input is a yes/no answer, even text
                // that looks like a new event description.
                self.resolve_confirmation(utterance, batch).await;
            }
        }
    }

    async fn start_batch(&mut self, conversation: &ConversationId, utterance: &str) {
        let today = Utc::now().date_naive();

        let payloads = match self.extractor.extract(utterance, today).await {
            Ok(payloads) => payloads,
            Err(e) => {
                warn!(error = %e, "extraction unavailable");
                self.say(MSG_UNAVAILABLE);
                return; // state stays Idle
            }
        };

        let mut batch: Vec<EventDescriptor> = Vec::new();
        for payload in &payloads {
            match validate(payload) {
                Ok(descriptor) => batch.push(descriptor),
                Err(reason @ RejectionReason::Malformed(_)) => {
                    warn!(function = %payload.function_name, %reason, "unparseable payload dropped");
                }
                Err(reason) => {
                    warn!(function = %payload.function_name, %reason, "payload rejected");
                }
            }
        }

        if batch.is_empty() {
            self.say(MSG_NO_EVENT);
            return;
        }

        info!(count = batch.len(), "events pending confirmation");
        let prompt = confirmation_prompt(&batch);
        self.sessions.set(*conversation, ConversationState::PendingConfirmation { batch });
        self.say(&prompt);
    }

    async fn resolve_confirmation(&mut self, answer: &str, batch: Vec<EventDescriptor>) {
        if is_affirmative(answer) {
            let summary = dispatch(self.backend.as_ref(), batch).await;
            self.say(&summary_message(&summary));
        } else {
            info!("pending batch cancelled");
            self.say(MSG_CANCELLED);
        }
        // Either way the conversation ends the turn Idle; take() already
        // cleared the entry.
    }

    fn say(&self, text: &str) {
        self.reporter.on_message(Sender::System, text);
    }
}

/// Binary classification of a confirmation answer. Anything that is not an
/// explicit yes counts as no; there is no re-prompt loop.
pub fn is_affirmative(utterance: &str) -> bool {
    matches!(utterance.trim().to_ascii_lowercase().as_str(), "yes" | "y")
}

pub fn confirmation_prompt(batch: &[EventDescriptor]) -> String {
    let mut text = format!("I found {} event(s) in your message:\n", batch.len());
    for (i, descriptor) in batch.iter().enumerate() {
        text.push_str(&format!("  {}\n", describe(i, descriptor)));
    }
    text.push_str("Should I add them to your calendar? (yes/no)");
    text
}

fn describe(index: usize, d: &EventDescriptor) -> String {
    let mut line = format!(
        "Event {}: \"{}\" on {} from {} to {}",
        index + 1,
        d.title,
        d.date,
        d.start_time,
        d.end_time
    );
    if let Some(rule) = &d.recurrence {
        line.push_str(&format!(", repeats {}", rule));
    }
    if let Some(minutes) = d.reminder {
        line.push_str(&format!(", reminder {} min before", minutes));
    }
    line
}

pub fn summary_message(summary: &BatchSummary) -> String {
    if summary.all_succeeded() {
        return format!("Successfully created {} event(s).", summary.created());
    }

    let mut text = format!(
        "Created {} of {} event(s). These failed:\n",
        summary.created(),
        summary.outcomes.len()
    );
    for outcome in summary.outcomes.iter().filter(|o| !o.succeeded) {
        text.push_str(&format!(
            "  - \"{}\" on {}: {}\n",
            outcome.descriptor.title,
            outcome.descriptor.date,
            outcome.error.as_deref().unwrap_or("unknown error")
        ));
    }
    text.trim_end().to_string()
}
