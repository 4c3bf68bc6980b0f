//! Out-of-band delivery of new leads to the Telegram channel.
//!
//! Request handlers hand a [`NotificationJob`] to the [`NotificationQueue`]
//! and return immediately. A small pool of worker tasks drains the queue and
//! talks to Telegram. Delivery is best-effort: a job that fails is logged and
//! dropped, there is no retry, and jobs that do not fit into a full queue are
//! dropped at enqueue time.

use crate::leads::{Lead, LeadDetails};
use crate::telegram_client::{DeliveryError, TelegramClient};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MESSAGE_MAX_CHARS: usize = 4096;

/// One notification: the text, then optionally a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationJob {
    pub lead_id: i64,
    pub text: String,
    /// Absolute path of the attachment in the media root.
    pub attachment: Option<PathBuf>,
}

impl NotificationJob {
    pub fn for_lead(lead: &Lead, attachment: Option<PathBuf>) -> Self {
        Self {
            lead_id: lead.id,
            text: format_lead_message(lead),
            attachment,
        }
    }
}

/// Render the operator-facing summary of a lead.
pub fn format_lead_message(lead: &Lead) -> String {
    let created = lead.created_at.format("%Y-%m-%d %H:%M:%S UTC");

    let text = match &lead.details {
        LeadDetails::Contact { message } => format!(
            "Новая заявка на консультацию! 🎉\n\
             Имя: {} 😊\n\
             Email: {} 📧\n\
             Сообщение: {} 💬\n\
             Телефон: {} 📞\n\
             Дата: {} 🕒",
            lead.name, lead.email, message, lead.phone, created
        ),
        LeadDetails::VacancyApplication { link } => format!(
            "Новая заявка на вакансию! 🚀\n\
             Имя: {} 😊\n\
             Email: {} 📧\n\
             Ссылка на соцсеть: {} 🔗\n\
             Телефон: {} 📞\n\
             Дата: {} 🕒",
            lead.name, lead.email, link, lead.phone, created
        ),
    };

    // Truncate if needed (UTF-8 safe)
    if text.chars().count() > TELEGRAM_MESSAGE_MAX_CHARS {
        tracing::warn!(
            "⚠️  Notification for lead {} truncated to {} chars",
            lead.id,
            TELEGRAM_MESSAGE_MAX_CHARS
        );
        text.chars().take(TELEGRAM_MESSAGE_MAX_CHARS).collect()
    } else {
        text
    }
}

/// Sending half of the notification queue; cheap to clone.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<NotificationJob>,
}

impl NotificationQueue {
    /// Creates a bounded queue, returning the receiver for [`spawn_workers`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NotificationJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Hand a job to the workers without waiting.
    ///
    /// Returns `false` when the job was dropped because the queue is full or
    /// no workers are left.
    pub fn enqueue(&self, job: NotificationJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                tracing::error!(
                    "Notification queue full, dropping notification for lead {}",
                    job.lead_id
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                tracing::error!(
                    "Notification workers stopped, dropping notification for lead {}",
                    job.lead_id
                );
                false
            }
        }
    }
}

/// Send one job: the text first, then the attachment if there is one.
pub async fn deliver(client: &TelegramClient, job: &NotificationJob) -> Result<(), DeliveryError> {
    client.send_message(&job.text).await?;

    if let Some(path) = &job.attachment {
        client.send_document(path).await?;
    }

    Ok(())
}

/// Start `workers` tasks draining `rx`.
///
/// Workers exit once every [`NotificationQueue`] handle is dropped and the
/// queue is empty, so awaiting the returned handles drains pending jobs.
pub fn spawn_workers(
    rx: mpsc::Receiver<NotificationJob>,
    client: TelegramClient,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));

    (0..workers.max(1))
        .map(|worker_id| {
            let rx = Arc::clone(&rx);
            let client = client.clone();
            tokio::spawn(async move {
                tracing::debug!("Notification worker {} started", worker_id);
                loop {
                    // Lock is released before delivery so other workers can pick up jobs
                    let next = rx.lock().await.recv().await;
                    let Some(job) = next else { break };

                    tracing::info!(
                        "Worker {} delivering notification for lead {}",
                        worker_id,
                        job.lead_id
                    );
                    match deliver(&client, &job).await {
                        Ok(()) => {
                            tracing::info!("✅ Notification for lead {} delivered", job.lead_id)
                        }
                        Err(e) => tracing::error!(
                            "❌ Notification for lead {} failed: {}",
                            job.lead_id,
                            e
                        ),
                    }
                }
                tracing::debug!("Notification worker {} stopped", worker_id);
            })
        })
        .collect()
}
