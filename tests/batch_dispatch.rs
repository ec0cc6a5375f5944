use std::sync::Mutex;

use async_trait::async_trait;

use eventelf::conversation::{dispatch, EventDescriptor};
use eventelf::services::calendar::{CalendarBackend, CalendarError, CreatedEvent, EventBody};

struct ScriptedBackend {
    fail_summaries: Vec<String>,
    requests: Mutex<Vec<EventBody>>,
}

impl ScriptedBackend {
    fn failing_on(summaries: &[&str]) -> Self {
        Self {
            fail_summaries: summaries.iter().map(|s| s.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn recorded(&self) -> Vec<EventBody> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarBackend for ScriptedBackend {
    async fn create_event(&self, body: &EventBody) -> Result<CreatedEvent, CalendarError> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(body.clone());
            requests.len()
        };
        if self.fail_summaries.iter().any(|s| s == &body.summary) {
            return Err(CalendarError::Api { status: 503, message: "quota exceeded".to_string() });
        }
        Ok(CreatedEvent { id: format!("evt_{}", n), html_link: None, summary: Some(body.summary.clone()) })
    }
}

fn descriptor(title: &str, date: &str) -> EventDescriptor {
    EventDescriptor {
        title: title.to_string(),
        date: date.to_string(),
        start_time: "09:00".to_string(),
        end_time: "10:00".to_string(),
        recurrence: None,
        reminder: None,
    }
}

#[tokio::test]
async fn one_failure_does_not_abort_the_batch() {
    let backend = ScriptedBackend::failing_on(&["B"]);
    let batch = vec![
        descriptor("A", "2025-03-12"),
        descriptor("B", "2025-03-13"),
        descriptor("C", "2025-03-14"),
    ];

    let summary = dispatch(&backend, batch).await;

    assert_eq!(summary.created(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(!summary.all_succeeded());

    // Outcome order = input order, failure in the middle.
    let titles: Vec<&str> =
        summary.outcomes.iter().map(|o| o.descriptor.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert!(summary.outcomes[0].succeeded);
    assert!(!summary.outcomes[1].succeeded);
    assert!(summary.outcomes[2].succeeded, "C must still be attempted after B fails");

    let error = summary.outcomes[1].error.as_deref().expect("failed outcome carries the error");
    assert!(error.contains("503"));
    assert!(error.contains("quota exceeded"));
}

#[tokio::test]
async fn every_descriptor_gets_exactly_one_creation_call() {
    let backend = ScriptedBackend::failing_on(&[]);
    let batch = vec![descriptor("A", "2025-03-12"), descriptor("B", "2025-03-13")];

    let summary = dispatch(&backend, batch).await;

    assert!(summary.all_succeeded());
    let recorded = backend.recorded();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].start.date_time, "2025-03-12T09:00:00");
    assert_eq!(recorded[1].start.date_time, "2025-03-13T09:00:00");
}

#[tokio::test]
async fn optional_fields_travel_to_the_backend() {
    let backend = ScriptedBackend::failing_on(&[]);
    let mut d = descriptor("Gym", "2025-01-06");
    d.recurrence = Some("RRULE:FREQ=WEEKLY;BYDAY=MO".to_string());
    d.reminder = Some(20);

    dispatch(&backend, vec![d]).await;

    let recorded = backend.recorded();
    assert_eq!(recorded[0].recurrence, Some(vec!["RRULE:FREQ=WEEKLY;BYDAY=MO".to_string()]));
    let reminders = recorded[0].reminders.as_ref().expect("reminder override present");
    assert!(!reminders.use_default);
    assert_eq!(reminders.overrides[0].minutes, 20);
    assert_eq!(reminders.overrides[0].method, "popup");
}

#[tokio::test]
async fn empty_batch_yields_an_empty_summary() {
    let backend = ScriptedBackend::failing_on(&[]);

    let summary = dispatch(&backend, Vec::new()).await;

    assert!(summary.outcomes.is_empty());
    assert_eq!(summary.created(), 0);
    assert!(summary.all_succeeded());
    assert!(backend.recorded().is_empty());
}
