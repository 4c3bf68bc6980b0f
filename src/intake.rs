use crate::db_storage::LeadStore;
use crate::errors::AppError;
use crate::leads::{Lead, LeadForm, LeadKind, NewLead};
use crate::notifications::{NotificationJob, NotificationQueue};
use crate::uploads::MediaStore;

/// Validate-then-commit pipeline shared by both lead forms.
///
/// 1. Validate every field (phone canonicalized, attachment checked).
/// 2. Store the attachment in the media root.
/// 3. Insert the row; on failure the stored attachment is removed.
/// 4. Enqueue exactly one notification.
///
/// Any validation error returns before step 2, so a rejected submission
/// leaves no row, no file and no job behind.
#[derive(Debug, Clone)]
pub struct LeadIntake<S> {
    store: S,
    media: MediaStore,
    queue: NotificationQueue,
}

impl<S: LeadStore> LeadIntake<S> {
    pub fn new(store: S, media: MediaStore, queue: NotificationQueue) -> Self {
        Self {
            store,
            media,
            queue,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn submit(&self, kind: LeadKind, form: LeadForm) -> Result<Lead, AppError> {
        let validated = form.validate(kind)?;

        let stored_file = match &validated.file {
            Some(file) => Some(self.media.save(kind.upload_dir(), file).await?),
            None => None,
        };

        let new_lead = NewLead {
            name: validated.name,
            email: validated.email,
            phone: validated.phone,
            details: validated.details,
            file: stored_file,
        };

        let lead = match self.store.insert_lead(&new_lead).await {
            Ok(lead) => lead,
            Err(e) => {
                if let Some(relative) = &new_lead.file {
                    if let Err(cleanup) = self.media.remove(relative).await {
                        tracing::warn!("Failed to remove orphaned upload {}: {}", relative, cleanup);
                    }
                }
                return Err(e);
            }
        };

        tracing::info!("Created {:?} lead {} from {} 🌟", kind, lead.id, lead.name);

        let attachment = lead.file.as_deref().map(|relative| self.media.path_of(relative));
        if let Some(path) = &attachment {
            tracing::info!("Queueing notification with attachment {} 📤", path.display());
        }
        self.queue.enqueue(NotificationJob::for_lead(&lead, attachment));

        Ok(lead)
    }
}
