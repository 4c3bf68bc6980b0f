//! Route tables.
//!
//! Each table comes back with its state applied so the binary can wrap the
//! write routes in rate and body limits before merging them.

use crate::db_storage::LeadStore;
use crate::handlers::{self, AppState};
use crate::intake::LeadIntake;
use crate::lead_handler;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::normalize_path::NormalizePath;

/// Health check and the read-only content API.
pub fn content_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/events", get(handlers::list_events))
        .route("/api/events/:id", get(handlers::get_event))
        .route("/api/services", get(handlers::list_services))
        .route("/api/services/:id", get(handlers::get_service))
        .route("/api/vacancies", get(handlers::list_vacancies))
        .route("/api/vacancies/:id", get(handlers::get_vacancy))
        .route("/api/projects", get(handlers::list_projects))
        .route("/api/projects/filter", get(handlers::filter_projects))
        .route("/api/projects/search", get(handlers::search_projects))
        .route("/api/projects/:id", get(handlers::get_project))
        .route("/api/reviews", get(handlers::list_reviews))
        .route("/api/youtube-shorts", get(handlers::list_youtube_shorts))
        .route("/api/gallery", get(handlers::list_gallery))
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/tools/:slug", get(handlers::get_tool))
        .route("/api/about", get(handlers::list_about))
        .with_state(state)
}

/// Anonymous review submission.
pub fn review_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/reviews", post(handlers::create_review))
        .with_state(state)
}

/// The two lead forms, backed by any [`LeadStore`].
pub fn lead_routes<S: LeadStore + 'static>(intake: Arc<LeadIntake<S>>) -> Router {
    Router::new()
        .route("/api/contacts", post(lead_handler::create_contact::<S>))
        .route(
            "/api/contact_vacancy",
            post(lead_handler::create_vacancy_application::<S>),
        )
        .with_state(intake)
}

/// Serve `/api/contacts/` and friends like their slash-less routes.
///
/// Must wrap the whole router: path rewriting has to happen before routing.
pub fn trim_trailing_slash(router: Router) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(router)
}
