use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::pagination::{Page, PageRequest};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

const EVENT_COLUMNS: &str = "id, title, description, content, date, image, created_at";
const EVENT_IMAGE_COLUMNS: &str = "id, event_id, content, image";
const SERVICE_COLUMNS: &str = "id, title, content, image, created_at";
const VACANCY_COLUMNS: &str =
    "id, title, description, requirements, conditions, salary, content, is_active, created_at";
const PROJECT_COLUMNS: &str =
    "id, title, description, content, image, link, is_featured, created_at";
const REVIEW_COLUMNS: &str = "id, author, avatar, text, content, created_at";
const YOUTUBE_SHORT_COLUMNS: &str = "id, video_url, thumbnail, created_at";
const ABOUT_COLUMNS: &str = "id, title, description, content, image, created_at";
const GALLERY_COLUMNS: &str = "id, title, description, content, image, related_service_id, related_project_id, created_at";
const TOOL_COLUMNS: &str = "id, name, slug, content, image, additional_content, created_at";
const TOOL_IMAGE_COLUMNS: &str = "id, tool_id, content, image, created_at";

/// Read-only access to the site's content tables.
///
/// Lists are ordered by `created_at` (then `id` for a stable order) and
/// paginated; detail lookups return `NotFound` for unknown keys.
pub struct ContentService {
    db: PgPool,
}

impl ContentService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Count and fetch one page of an unfiltered table.
    async fn page_of<T>(
        &self,
        table: &str,
        columns: &str,
        path: &str,
        request: PageRequest,
    ) -> Result<Page<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let count: i64 = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.db)
            .await
            .with_context(|| format!("counting {}", table))?;

        let rows = sqlx::query_as::<_, T>(&format!(
            "SELECT {} FROM {} ORDER BY created_at, id LIMIT $1 OFFSET $2",
            columns, table
        ))
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.db)
        .await
        .with_context(|| format!("listing {}", table))?;

        Page::new(path, None, request, count, rows)
    }

    /// Fetch one row by primary key.
    async fn by_id<T>(&self, table: &str, columns: &str, id: i64, what: &str) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        sqlx::query_as::<_, T>(&format!("SELECT {} FROM {} WHERE id = $1", columns, table))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("loading {} {}", what, id))?
            .ok_or_else(|| AppError::NotFound(format!("{} with id {} not found", what, id)))
    }

    pub async fn list_events(&self, request: PageRequest) -> Result<Page<Event>, AppError> {
        self.page_of("events", EVENT_COLUMNS, "/api/events", request)
            .await
    }

    pub async fn get_event(&self, id: i64) -> Result<EventDetail, AppError> {
        let event: Event = self.by_id("events", EVENT_COLUMNS, id, "Event").await?;

        let gallery = sqlx::query_as::<_, EventImage>(&format!(
            "SELECT {} FROM event_images WHERE event_id = $1 ORDER BY id",
            EVENT_IMAGE_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.db)
        .await
        .context("loading event gallery")?;

        Ok(EventDetail { event, gallery })
    }

    pub async fn list_services(&self, request: PageRequest) -> Result<Page<Service>, AppError> {
        self.page_of("services", SERVICE_COLUMNS, "/api/services", request)
            .await
    }

    pub async fn get_service(&self, id: i64) -> Result<Service, AppError> {
        self.by_id("services", SERVICE_COLUMNS, id, "Service").await
    }

    pub async fn list_vacancies(
        &self,
        filter: &VacancyFilter,
        request: PageRequest,
    ) -> Result<Page<Vacancy>, AppError> {
        let count: i64 = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM vacancies WHERE ($1::BOOLEAN IS NULL OR is_active = $1)",
        )
        .bind(filter.is_active)
        .fetch_one(&self.db)
        .await
        .context("counting vacancies")?;

        let rows = sqlx::query_as::<_, Vacancy>(&format!(
            "SELECT {} FROM vacancies
             WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
             ORDER BY created_at, id LIMIT $2 OFFSET $3",
            VACANCY_COLUMNS
        ))
        .bind(filter.is_active)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.db)
        .await
        .context("listing vacancies")?;

        let extra = filter.is_active.map(|active| format!("is_active={}", active));
        Page::new("/api/vacancies", extra.as_deref(), request, count, rows)
    }

    pub async fn get_vacancy(&self, id: i64) -> Result<Vacancy, AppError> {
        self.by_id("vacancies", VACANCY_COLUMNS, id, "Vacancy").await
    }

    pub async fn list_projects(&self, request: PageRequest) -> Result<Page<Project>, AppError> {
        self.page_of("projects", PROJECT_COLUMNS, "/api/projects", request)
            .await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, AppError> {
        self.by_id("projects", PROJECT_COLUMNS, id, "Project").await
    }

    /// Projects filtered by `is_featured` (all projects when unset).
    pub async fn filter_projects(
        &self,
        filter: &ProjectFilter,
        request: PageRequest,
    ) -> Result<Page<Project>, AppError> {
        let count: i64 = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects WHERE ($1::BOOLEAN IS NULL OR is_featured = $1)",
        )
        .bind(filter.is_featured)
        .fetch_one(&self.db)
        .await
        .context("counting filtered projects")?;

        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects
             WHERE ($1::BOOLEAN IS NULL OR is_featured = $1)
             ORDER BY created_at, id LIMIT $2 OFFSET $3",
            PROJECT_COLUMNS
        ))
        .bind(filter.is_featured)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.db)
        .await
        .context("filtering projects")?;

        let extra = filter
            .is_featured
            .map(|featured| format!("is_featured={}", featured));
        Page::new("/api/projects/filter", extra.as_deref(), request, count, rows)
    }

    /// Case-insensitive substring search on project titles.
    pub async fn search_projects(
        &self,
        search: &ProjectSearch,
        request: PageRequest,
    ) -> Result<Page<Project>, AppError> {
        let pattern = format!("%{}%", escape_like(search.q.trim()));

        let count: i64 =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE title ILIKE $1 ESCAPE '\\'")
                .bind(&pattern)
                .fetch_one(&self.db)
                .await
                .context("counting project search results")?;

        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects
             WHERE title ILIKE $1 ESCAPE '\\'
             ORDER BY created_at, id LIMIT $2 OFFSET $3",
            PROJECT_COLUMNS
        ))
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.db)
        .await
        .context("searching projects")?;

        let extra = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &search.q)
            .finish();
        Page::new("/api/projects/search", Some(&extra), request, count, rows)
    }

    pub async fn list_reviews(&self, request: PageRequest) -> Result<Page<Review>, AppError> {
        self.page_of("reviews", REVIEW_COLUMNS, "/api/reviews", request)
            .await
    }

    /// Store an anonymous review.
    pub async fn create_review(&self, review: &NewReview) -> Result<Review, AppError> {
        let created = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (text, content) VALUES ($1, $2) RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(&review.text)
        .bind(&review.content)
        .fetch_one(&self.db)
        .await
        .context("inserting review")?;

        tracing::info!("Created review {} 🌟", created.id);
        Ok(created)
    }

    pub async fn list_youtube_shorts(
        &self,
        request: PageRequest,
    ) -> Result<Page<YouTubeShort>, AppError> {
        self.page_of(
            "youtube_shorts",
            YOUTUBE_SHORT_COLUMNS,
            "/api/youtube-shorts",
            request,
        )
        .await
    }

    pub async fn list_gallery(
        &self,
        filter: &GalleryFilter,
        request: PageRequest,
    ) -> Result<Page<GalleryItem>, AppError> {
        let count: i64 = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM gallery
             WHERE ($1::BIGINT IS NULL OR related_service_id = $1)
               AND ($2::BIGINT IS NULL OR related_project_id = $2)",
        )
        .bind(filter.related_service)
        .bind(filter.related_project)
        .fetch_one(&self.db)
        .await
        .context("counting gallery")?;

        let rows = sqlx::query_as::<_, GalleryItem>(&format!(
            "SELECT {} FROM gallery
             WHERE ($1::BIGINT IS NULL OR related_service_id = $1)
               AND ($2::BIGINT IS NULL OR related_project_id = $2)
             ORDER BY created_at, id LIMIT $3 OFFSET $4",
            GALLERY_COLUMNS
        ))
        .bind(filter.related_service)
        .bind(filter.related_project)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.db)
        .await
        .context("listing gallery")?;

        let mut extra = url::form_urlencoded::Serializer::new(String::new());
        if let Some(service) = filter.related_service {
            extra.append_pair("related_service", &service.to_string());
        }
        if let Some(project) = filter.related_project {
            extra.append_pair("related_project", &project.to_string());
        }
        let extra = extra.finish();
        Page::new("/api/gallery", Some(&extra), request, count, rows)
    }

    pub async fn list_tools(&self, request: PageRequest) -> Result<Page<Tool>, AppError> {
        self.page_of("tools", TOOL_COLUMNS, "/api/tools", request)
            .await
    }

    pub async fn get_tool(&self, slug: &str) -> Result<ToolDetail, AppError> {
        let tool = sqlx::query_as::<_, Tool>(&format!(
            "SELECT {} FROM tools WHERE slug = $1",
            TOOL_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.db)
        .await
        .context("loading tool")?
        .ok_or_else(|| AppError::NotFound(format!("Tool '{}' not found", slug)))?;

        let images = sqlx::query_as::<_, ToolImage>(&format!(
            "SELECT {} FROM tool_images WHERE tool_id = $1 ORDER BY created_at, id",
            TOOL_IMAGE_COLUMNS
        ))
        .bind(tool.id)
        .fetch_all(&self.db)
        .await
        .context("loading tool images")?;

        Ok(ToolDetail { tool, images })
    }

    /// The about section is short; it is returned whole.
    pub async fn list_about(&self) -> Result<Vec<About>, AppError> {
        let rows = sqlx::query_as::<_, About>(&format!(
            "SELECT {} FROM about ORDER BY created_at, id",
            ABOUT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await
        .context("listing about")?;

        Ok(rows)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
