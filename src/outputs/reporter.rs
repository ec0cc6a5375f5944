use crate::conversation::event::Sender;

/// Boundary to whatever surface renders the conversation. Called once per
/// pipeline-generated message; the presentation layer owns rendering.
pub trait Reporter: Send + Sync {
    fn on_message(&self, sender: Sender, text: &str);
}

/// Prints messages to stdout with a chat-style prefix. Reference consumer
/// used by the console binary.
pub struct ConsoleReporter {
    assistant_name: String,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { assistant_name: "EventElf".to_string() }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn on_message(&self, sender: Sender, text: &str) {
        match sender {
            Sender::System => println!("{}: {}", self.assistant_name, text),
            Sender::User => println!("You: {}", text),
        }
    }
}
