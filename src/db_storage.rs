use crate::errors::{AppError, ResultExt};
use crate::leads::{Lead, LeadDetails, NewLead};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::future::Future;

/// Persistence seam for leads.
///
/// Implementations insert exactly one row per call, atomically; a failed
/// insert leaves nothing behind.
pub trait LeadStore: Send + Sync {
    fn insert_lead(&self, lead: &NewLead) -> impl Future<Output = Result<Lead, AppError>> + Send;
}

/// Postgres storage for contact forms and vacancy applications.
#[derive(Debug, Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LeadStore for PgLeadStore {
    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let (id, created_at) = match &lead.details {
            LeadDetails::Contact { message } => sqlx::query_as::<_, (i64, DateTime<Utc>)>(
                r#"
                INSERT INTO contacts (name, email, message, phone, file)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, created_at
                "#,
            )
            .bind(&lead.name)
            .bind(&lead.email)
            .bind(message)
            .bind(&lead.phone)
            .bind(lead.file.as_deref())
            .fetch_one(&self.pool)
            .await
            .context("inserting contact")?,
            LeadDetails::VacancyApplication { link } => {
                sqlx::query_as::<_, (i64, DateTime<Utc>)>(
                    r#"
                    INSERT INTO contact_vacancies (name, email, phone, link, file)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, created_at
                    "#,
                )
                .bind(&lead.name)
                .bind(&lead.email)
                .bind(&lead.phone)
                .bind(link)
                .bind(lead.file.as_deref())
                .fetch_one(&self.pool)
                .await
                .context("inserting vacancy application")?
            }
        };

        tracing::debug!("Stored {:?} lead id={}", lead.details.kind(), id);

        Ok(Lead {
            id,
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            details: lead.details.clone(),
            file: lead.file.clone(),
            created_at,
        })
    }
}
