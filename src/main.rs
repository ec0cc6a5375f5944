use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use eventelf::config::Config;
use eventelf::conversation::{ConversationId, Pipeline};
use eventelf::outputs::ConsoleReporter;
use eventelf::services::calendar::GoogleCalendarClient;
use eventelf::services::extraction::OpenAiExtractor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    tracing::info!("EventElf booting...");

    let config = Config::from_env()?;

    let mut extractor = OpenAiExtractor::new(config.openai_api_key);
    if let Some(model) = config.openai_model {
        extractor = extractor.with_model(model);
    }
    if let Some(url) = config.openai_api_url {
        extractor = extractor.with_api_url(url);
    }

    let mut backend = GoogleCalendarClient::new(config.calendar_access_token);
    if let Some(url) = config.calendar_api_url {
        backend = backend.with_api_url(url);
    }
    if let Some(id) = config.calendar_id {
        backend = backend.with_calendar_id(id);
    }

    let mut pipeline = Pipeline::new(
        Arc::new(extractor),
        Arc::new(backend),
        Arc::new(ConsoleReporter::new()),
    );

    // One console session = one conversation.
    let conversation = ConversationId::new();

    println!("EventElf: Hi! Describe an event and I'll add it to your calendar. (Ctrl-D to quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        // Each turn is awaited to completion before the next line is read.
        pipeline.handle_turn(&conversation, utterance).await;
    }

    println!("EventElf: Bye!");
    Ok(())
}
