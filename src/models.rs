use crate::errors::FieldErrors;
use crate::leads::REQUIRED;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============ Content Models ============
//
// File columns (`image`, `avatar`, `thumbnail`) hold paths relative to the
// media root, served under `/media/`.

/// A company event shown on the events page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Rich-text (HTML) body.
    pub content: String,
    pub date: Option<NaiveDate>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Photo attached to an event.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventImage {
    pub id: i64,
    pub event_id: i64,
    pub content: String,
    pub image: String,
}

/// Event detail: the event plus its gallery.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub gallery: Vec<EventImage>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Vacancy {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub conditions: String,
    pub salary: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub image: Option<String>,
    pub link: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Client testimonial. Reviews are curated by staff, `author` is a display name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub author: Option<String>,
    pub avatar: Option<String>,
    pub text: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct YouTubeShort {
    pub id: i64,
    pub video_url: String,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct About {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Gallery photo, optionally tied to a service or a project.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: String,
    pub image: Option<String>,
    pub related_service_id: Option<i64>,
    pub related_project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A tool or direction the company works with; addressed by `slug`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub content: String,
    pub image: String,
    pub additional_content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ToolImage {
    pub id: i64,
    pub tool_id: i64,
    pub content: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDetail {
    #[serde(flatten)]
    pub tool: Tool,
    pub images: Vec<ToolImage>,
}

// ============ Query Filters ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VacancyFilter {
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSearch {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryFilter {
    pub related_service: Option<i64>,
    pub related_project: Option<i64>,
}

// ============ Review Submission ============

/// Anonymous review posted from the site. Only `text` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    pub text: Option<String>,
    pub content: Option<String>,
}

/// A review that passed validation, ready to insert with no author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub text: String,
    pub content: String,
}

impl ReviewForm {
    pub fn validate(self) -> Result<NewReview, FieldErrors> {
        let text = self.text.map(|t| t.trim().to_string()).unwrap_or_default();
        if text.is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("text", REQUIRED);
            return Err(errors);
        }

        Ok(NewReview {
            text,
            content: self.content.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_requires_text() {
        let errors = ReviewForm {
            text: Some("  ".to_string()),
            content: Some("<p>extra</p>".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["text"]);

        assert!(ReviewForm::default().validate().is_err());
    }

    #[test]
    fn test_review_content_defaults_to_empty() {
        let review = ReviewForm {
            text: Some(" Great team ".to_string()),
            content: None,
        }
        .validate()
        .unwrap();
        assert_eq!(
            review,
            NewReview {
                text: "Great team".to_string(),
                content: String::new(),
            }
        );
    }
}
