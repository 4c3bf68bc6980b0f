//! Helpers shared by the integration tests.
#![allow(dead_code)]

use navis_api::db_storage::LeadStore;
use navis_api::errors::AppError;
use navis_api::leads::{Lead, NewLead};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Lead store keeping rows in memory; optionally fails every insert.
#[derive(Default)]
pub struct MemoryLeadStore {
    rows: Mutex<Vec<NewLead>>,
    next_id: AtomicI64,
    fail: bool,
}

impl MemoryLeadStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<NewLead> {
        self.rows.lock().unwrap().clone()
    }
}

impl LeadStore for MemoryLeadStore {
    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        if self.fail {
            return Err(AppError::InternalError("database unavailable".to_string()));
        }

        self.rows.lock().unwrap().push(lead.clone());
        Ok(Lead {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            details: lead.details.clone(),
            file: lead.file.clone(),
            created_at: chrono::Utc::now(),
        })
    }
}

/// Count regular files anywhere under `dir`.
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
