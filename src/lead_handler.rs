use crate::db_storage::LeadStore;
use crate::errors::AppError;
use crate::intake::LeadIntake;
use crate::leads::{Lead, LeadForm, LeadKind};
use crate::uploads::UploadedFile;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// POST /api/contacts
///
/// Multipart form: `name`, `email`, `message`, `phone` required, `file`
/// optional. Responds 201 with the stored lead or 400 with field errors.
pub async fn create_contact<S: LeadStore + 'static>(
    State(intake): State<Arc<LeadIntake<S>>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    tracing::info!("📨 Received contact form");
    let form = read_lead_form(multipart).await?;
    let lead = intake.submit(LeadKind::Contact, form).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// POST /api/contact_vacancy
///
/// Multipart form: `name`, `email`, `link`, `phone` required, `file`
/// optional. Responds 201 with the stored lead or 400 with field errors.
pub async fn create_vacancy_application<S: LeadStore + 'static>(
    State(intake): State<Arc<LeadIntake<S>>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    tracing::info!("📨 Received vacancy application");
    let form = read_lead_form(multipart).await?;
    let lead = intake.submit(LeadKind::VacancyApplication, form).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// Collect the known form fields; unknown fields are ignored.
async fn read_lead_form(mut multipart: Multipart) -> Result<LeadForm, AppError> {
    let mut form = LeadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("upload")
                    .to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was chosen
                if bytes.is_empty() {
                    tracing::debug!("Skipping empty file part");
                    continue;
                }
                form.file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "name" => form.name = Some(field.text().await?),
            "email" => form.email = Some(field.text().await?),
            "phone" => form.phone = Some(field.text().await?),
            "message" => form.message = Some(field.text().await?),
            "link" => form.link = Some(field.text().await?),
            other => tracing::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(form)
}
