//! Lead forms: the contact form and the vacancy application form.
//!
//! Both share one shape (name, email, phone, optional attachment) and differ
//! only in their free-text field: a message for contacts, a profile link for
//! vacancy applications. Validation here is pure so it can run before
//! anything touches the database or the media root.

use crate::errors::FieldErrors;
use crate::phone::canonicalize_kg_phone;
use crate::uploads::{validate_upload, UploadedFile};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const LINK_MAX_CHARS: usize = 200;

pub(crate) const REQUIRED: &str = "This field is required.";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email regex compiles")
});

/// Which form a lead came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Contact,
    VacancyApplication,
}

impl LeadKind {
    /// Media subdirectory attachments of this kind are stored under.
    pub fn upload_dir(self) -> &'static str {
        match self {
            LeadKind::Contact => "contacts",
            LeadKind::VacancyApplication => "contacts/vacancy",
        }
    }
}

/// The form-specific text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LeadDetails {
    Contact { message: String },
    VacancyApplication { link: String },
}

impl LeadDetails {
    pub fn kind(&self) -> LeadKind {
        match self {
            LeadDetails::Contact { .. } => LeadKind::Contact,
            LeadDetails::VacancyApplication { .. } => LeadKind::VacancyApplication,
        }
    }
}

/// Raw form fields as submitted, before any validation.
#[derive(Debug, Clone, Default)]
pub struct LeadForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub link: Option<String>,
    pub file: Option<UploadedFile>,
}

/// A lead whose every field passed validation; `phone` is canonical.
#[derive(Debug, Clone)]
pub struct ValidatedLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub details: LeadDetails,
    pub file: Option<UploadedFile>,
}

/// Row to insert. `file` is the media-relative path of the stored attachment.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub details: LeadDetails,
    pub file: Option<String>,
}

/// A persisted lead, as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(flatten)]
    pub details: LeadDetails,
    pub file: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn kind(&self) -> LeadKind {
        self.details.kind()
    }
}

/// Basic structural email check: `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= EMAIL_MAX_CHARS && EMAIL_REGEX.is_match(email)
}

/// Absolute http(s) URL with a host.
pub fn is_valid_link(link: &str) -> bool {
    match url::Url::parse(link) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

impl LeadForm {
    /// Validate every field for the given form kind, collecting all errors.
    ///
    /// Nothing is written anywhere; on success the returned lead carries the
    /// canonical phone number.
    pub fn validate(self, kind: LeadKind) -> Result<ValidatedLead, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required(&mut errors, "name", self.name).filter(|name| {
            if name.chars().count() > NAME_MAX_CHARS {
                errors.add(
                    "name",
                    format!("Ensure this field has no more than {} characters.", NAME_MAX_CHARS),
                );
                false
            } else {
                true
            }
        });

        let email = required(&mut errors, "email", self.email).filter(|email| {
            if is_valid_email(email) {
                true
            } else {
                errors.add("email", "Enter a valid email address.");
                false
            }
        });

        let phone = required(&mut errors, "phone", self.phone).and_then(|raw| {
            canonicalize_kg_phone(&raw)
                .map_err(|e| errors.add("phone", e.to_string()))
                .ok()
        });

        let details = match kind {
            LeadKind::Contact => required(&mut errors, "message", self.message)
                .map(|message| LeadDetails::Contact { message }),
            LeadKind::VacancyApplication => required(&mut errors, "link", self.link)
                .filter(|link| {
                    if link.chars().count() > LINK_MAX_CHARS {
                        errors.add(
                            "link",
                            format!(
                                "Ensure this field has no more than {} characters.",
                                LINK_MAX_CHARS
                            ),
                        );
                        false
                    } else if !is_valid_link(link) {
                        errors.add("link", "Enter a valid URL.");
                        false
                    } else {
                        true
                    }
                })
                .map(|link| LeadDetails::VacancyApplication { link }),
        };

        if let Some(file) = &self.file {
            if let Err(e) = validate_upload(file) {
                errors.add("file", e.to_string());
            }
        }

        match (name, email, phone, details) {
            (Some(name), Some(email), Some(phone), Some(details)) if errors.is_empty() => {
                Ok(ValidatedLead {
                    name,
                    email,
                    phone,
                    details,
                    file: self.file,
                })
            }
            _ => Err(errors),
        }
    }
}
