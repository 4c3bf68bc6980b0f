use serde::Deserialize;
use std::path::PathBuf;

/// Default Telegram Bot API host.
pub const DEFAULT_TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_api_base_url: String,
    /// Directory uploaded and content files are stored under.
    pub media_root: PathBuf,
    /// Serve `media_root` at `/media` from this process.
    pub serve_media: bool,
    pub notification_workers: usize,
    pub notification_queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            db_max_connections: parse_positive("DB_MAX_CONNECTIONS", 10)?,
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .map_err(|_| anyhow::anyhow!("TELEGRAM_BOT_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("TELEGRAM_BOT_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID")
                .map_err(|_| anyhow::anyhow!("TELEGRAM_CHAT_ID environment variable required"))
                .and_then(|chat| {
                    if chat.trim().is_empty() {
                        anyhow::bail!("TELEGRAM_CHAT_ID cannot be empty");
                    }
                    Ok(chat)
                })?,
            telegram_api_base_url: std::env::var("TELEGRAM_API_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map_or_else(
                    || Ok(DEFAULT_TELEGRAM_API_BASE_URL.to_string()),
                    |url| {
                        if !url.starts_with("http://") && !url.starts_with("https://") {
                            anyhow::bail!(
                                "TELEGRAM_API_BASE_URL must start with http:// or https://"
                            );
                        }
                        Ok(url)
                    },
                )?,
            media_root: std::env::var("MEDIA_ROOT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("media")),
            serve_media: match std::env::var("SERVE_MEDIA") {
                Ok(value) => parse_bool(&value).ok_or_else(|| {
                    anyhow::anyhow!("SERVE_MEDIA must be true/false, got '{}'", value)
                })?,
                Err(_) => true,
            },
            notification_workers: parse_positive("NOTIFICATION_WORKERS", 2)?,
            notification_queue_capacity: parse_positive("NOTIFICATION_QUEUE_CAPACITY", 256)?,
        };

        // Secrets (bot token, database credentials) stay out of the logs
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Telegram API: {}", config.telegram_api_base_url);
        tracing::debug!("Telegram chat: {}", config.telegram_chat_id);
        tracing::debug!(
            "Media root: {} (served: {})",
            config.media_root.display(),
            config.serve_media
        );
        tracing::debug!(
            "Notification workers: {}, queue capacity: {}",
            config.notification_workers,
            config.notification_queue_capacity
        );

        Ok(config)
    }
}

fn parse_positive<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => anyhow::bail!("{} must be a positive number, got '{}'", name, raw),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
