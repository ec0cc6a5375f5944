pub mod dispatch;
pub mod event;
pub mod pipeline;
pub mod state;
pub mod validate;

pub use dispatch::{dispatch, BatchSummary, CreationOutcome};
pub use event::{ConversationId, EventDescriptor, RawPayload, Sender};
pub use pipeline::Pipeline;
pub use state::{ConversationState, SessionStore};
pub use validate::{validate, RejectionReason};
