pub mod email;
pub mod error;
pub mod github;
pub mod mailer;
pub mod pipeline;
pub mod render;
pub mod utils;
pub mod webhook;

use lettre::message::Mailbox;
use std::env;
use std::sync::Arc;

use crate::error::{NotifierError, Result};

const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_NOTIFY_ADDRESS: &str = "general-git-commit@hotwax.co";
const DEFAULT_LISTEN_PORT: u16 = 5000;

/// Mail transport settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: Mailbox,
    pub to_email: Mailbox,
}

/// Full notifier configuration, passed by reference into the components.
/// There is no ambient lookup inside core logic.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub smtp: SmtpConfig,
    pub github_token: Option<String>,
    /// Unset skips webhook signature verification.
    pub webhook_secret: Option<String>,
    pub listen_port: u16,
}

impl NotifierConfig {
    /// Load and validate the configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let server = env_or("SMTP_SERVER", DEFAULT_SMTP_SERVER);
        let port = env_parsed("SMTP_PORT", DEFAULT_SMTP_PORT)?;
        let username = env_required("SMTP_USERNAME")?;
        let password = env_required("SMTP_PASSWORD")?;
        let from_email = parse_mailbox("FROM_EMAIL", &env_or("FROM_EMAIL", DEFAULT_NOTIFY_ADDRESS))?;
        let to_email = parse_mailbox("TO_EMAIL", &env_or("TO_EMAIL", DEFAULT_NOTIFY_ADDRESS))?;

        Ok(Self {
            smtp: SmtpConfig {
                server,
                port,
                username,
                password,
                from_email,
                to_email,
            },
            github_token: env_opt("GITHUB_TOKEN"),
            webhook_secret: env_opt("WEBHOOK_SECRET"),
            listen_port: env_parsed("PORT", DEFAULT_LISTEN_PORT)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| NotifierError::Config(format!("{key} is not set")))
}

fn env_parsed(key: &str, default: u16) -> Result<u16> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| NotifierError::Config(format!("{key} is not a valid port: '{value}'"))),
        Err(_) => Ok(default),
    }
}

fn parse_mailbox(key: &str, value: &str) -> Result<Mailbox> {
    value
        .parse()
        .map_err(|e| NotifierError::Config(format!("{key} is not a valid address: {e}")))
}

pub struct AppState {
    pub config: NotifierConfig,
    pub http: reqwest::Client,
}

pub type SharedState = Arc<AppState>;
