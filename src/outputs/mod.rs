pub mod reporter;

pub use reporter::{ConsoleReporter, Reporter};
