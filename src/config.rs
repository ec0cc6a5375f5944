use anyhow::{Context, Result};

/// Runtime configuration, read from the process environment. `.env`
/// seeding is the binary's job (dotenvy); library users bring their own
/// environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: Option<String>,
    pub openai_api_url: Option<String>,
    pub calendar_access_token: String,
    pub calendar_api_url: Option<String>,
    pub calendar_id: Option<String>,
}

impl Config {
    /// Fails fast on missing required keys so a misconfigured process
    /// never reaches the chat loop.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: optional("OPENAI_MODEL"),
            openai_api_url: optional("OPENAI_API_URL"),
            calendar_access_token: required("CALENDAR_ACCESS_TOKEN")?,
            calendar_api_url: optional("CALENDAR_API_URL"),
            calendar_id: optional("CALENDAR_ID"),
        })
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("environment variable {} must be set", key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
