use reqwest::multipart::{Form, Part};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Why a notification could not be delivered.
#[derive(Debug)]
pub enum DeliveryError {
    /// The HTTP client could not be constructed.
    Client(String),
    /// The request never got a response (DNS, connect, timeout...).
    /// `source` has its URL stripped, since the URL carries the bot token.
    Transport {
        method: &'static str,
        source: reqwest::Error,
    },
    /// Telegram answered with a non-2xx status.
    Rejected {
        method: &'static str,
        status: u16,
        body: String,
    },
    /// The attachment could not be read from the media root.
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Client(msg) => write!(f, "Failed to create Telegram client: {}", msg),
            DeliveryError::Transport { method, source } => {
                write!(f, "Telegram {} request failed: {}", method, source)
            }
            DeliveryError::Rejected {
                method,
                status,
                body,
            } => write!(f, "Telegram {} returned {}: {}", method, status, body),
            DeliveryError::Attachment { path, source } => {
                write!(f, "Cannot read attachment {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Minimal Telegram Bot API client posting into one chat.
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Creates a new `TelegramClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Bot API host, normally `https://api.telegram.org`.
    /// * `bot_token` - Bot credential.
    /// * `chat_id` - Destination channel or chat.
    pub fn new(base_url: String, bot_token: String, chat_id: String) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    /// Posts a plain-text message to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        const METHOD: &str = "sendMessage";

        let response = self
            .client
            .post(self.method_url(METHOD))
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await
            .map_err(|source| DeliveryError::Transport {
                method: METHOD,
                source: source.without_url(),
            })?;

        ensure_success(METHOD, response).await?;
        tracing::info!("Telegram message delivered to chat {}", self.chat_id);
        Ok(())
    }

    /// Uploads a file from disk to the configured chat.
    pub async fn send_document(&self, path: &Path) -> Result<(), DeliveryError> {
        const METHOD: &str = "sendDocument";

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DeliveryError::Attachment {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let size = bytes.len();

        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part("document", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(self.method_url(METHOD))
            .multipart(form)
            .send()
            .await
            .map_err(|source| DeliveryError::Transport {
                method: METHOD,
                source: source.without_url(),
            })?;

        ensure_success(METHOD, response).await?;
        tracing::info!(
            "Telegram document delivered to chat {} ({} bytes)",
            self.chat_id,
            size
        );
        Ok(())
    }
}

async fn ensure_success(
    method: &'static str,
    response: reqwest::Response,
) -> Result<(), DeliveryError> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(DeliveryError::Rejected {
        method,
        status,
        body,
    })
}
