use crate::errors::AppError;
use crate::models::*;
use crate::pagination::{Page, PageParams};
use crate::services::ContentService;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared state of the content handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "navis-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/events
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Event>>, AppError> {
    let request = page.resolve()?;
    let events = ContentService::new(state.db.clone())
        .list_events(request)
        .await?;
    Ok(Json(events))
}

/// GET /api/events/:id
///
/// The event together with its photo gallery.
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EventDetail>, AppError> {
    tracing::info!("GET /api/events/{}", id);
    let event = ContentService::new(state.db.clone()).get_event(id).await?;
    Ok(Json(event))
}

/// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Service>>, AppError> {
    let request = page.resolve()?;
    let services = ContentService::new(state.db.clone())
        .list_services(request)
        .await?;
    Ok(Json(services))
}

/// GET /api/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Service>, AppError> {
    tracing::info!("GET /api/services/{}", id);
    let service = ContentService::new(state.db.clone())
        .get_service(id)
        .await?;
    Ok(Json(service))
}

/// GET /api/vacancies
///
/// Optional `is_active=true|false` filter.
pub async fn list_vacancies(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
    Query(filter): Query<VacancyFilter>,
) -> Result<Json<Page<Vacancy>>, AppError> {
    let request = page.resolve()?;
    let vacancies = ContentService::new(state.db.clone())
        .list_vacancies(&filter, request)
        .await?;
    Ok(Json(vacancies))
}

/// GET /api/vacancies/:id
pub async fn get_vacancy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vacancy>, AppError> {
    tracing::info!("GET /api/vacancies/{}", id);
    let vacancy = ContentService::new(state.db.clone())
        .get_vacancy(id)
        .await?;
    Ok(Json(vacancy))
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Project>>, AppError> {
    let request = page.resolve()?;
    let projects = ContentService::new(state.db.clone())
        .list_projects(request)
        .await?;
    Ok(Json(projects))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, AppError> {
    let project = ContentService::new(state.db.clone())
        .get_project(id)
        .await?;
    Ok(Json(project))
}

/// GET /api/projects/filter?is_featured=
pub async fn filter_projects(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Page<Project>>, AppError> {
    let request = page.resolve()?;
    let projects = ContentService::new(state.db.clone())
        .filter_projects(&filter, request)
        .await?;
    Ok(Json(projects))
}

/// GET /api/projects/search?q=
///
/// An empty `q` matches every project.
pub async fn search_projects(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
    Query(search): Query<ProjectSearch>,
) -> Result<Json<Page<Project>>, AppError> {
    let request = page.resolve()?;
    let projects = ContentService::new(state.db.clone())
        .search_projects(&search, request)
        .await?;
    Ok(Json(projects))
}

/// GET /api/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Review>>, AppError> {
    let request = page.resolve()?;
    let reviews = ContentService::new(state.db.clone())
        .list_reviews(request)
        .await?;
    Ok(Json(reviews))
}

/// POST /api/reviews
///
/// JSON body `{"text": "...", "content": "..."}`; `text` is required and the
/// review is stored without an author.
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ReviewForm>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    tracing::info!("📨 Received review");
    let review = form.validate()?;
    let created = ContentService::new(state.db.clone())
        .create_review(&review)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/youtube-shorts
pub async fn list_youtube_shorts(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<YouTubeShort>>, AppError> {
    let request = page.resolve()?;
    let shorts = ContentService::new(state.db.clone())
        .list_youtube_shorts(request)
        .await?;
    Ok(Json(shorts))
}

/// GET /api/gallery
///
/// Optional `related_service` / `related_project` id filters.
pub async fn list_gallery(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
    Query(filter): Query<GalleryFilter>,
) -> Result<Json<Page<GalleryItem>>, AppError> {
    let request = page.resolve()?;
    let gallery = ContentService::new(state.db.clone())
        .list_gallery(&filter, request)
        .await?;
    Ok(Json(gallery))
}

/// GET /api/tools
pub async fn list_tools(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Tool>>, AppError> {
    let request = page.resolve()?;
    let tools = ContentService::new(state.db.clone())
        .list_tools(request)
        .await?;
    Ok(Json(tools))
}

/// GET /api/tools/:slug
pub async fn get_tool(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ToolDetail>, AppError> {
    tracing::info!("GET /api/tools/{}", slug);
    let tool = ContentService::new(state.db.clone())
        .get_tool(&slug)
        .await?;
    Ok(Json(tool))
}

/// GET /api/about
pub async fn list_about(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<About>>, AppError> {
    let about = ContentService::new(state.db.clone()).list_about().await?;
    Ok(Json(about))
}
