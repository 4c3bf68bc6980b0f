/// HTTP tests of the write routes
/// Drives real multipart and JSON requests through the router with an in-memory lead store
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{count_files, MemoryLeadStore};
use navis_api::handlers::AppState;
use navis_api::intake::LeadIntake;
use navis_api::notifications::{NotificationJob, NotificationQueue};
use navis_api::routes;
use navis_api::uploads::MediaStore;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

const BOUNDARY: &str = "navis-test-boundary";

struct Api {
    app: NormalizePath<Router>,
    intake: Arc<LeadIntake<MemoryLeadStore>>,
    jobs: mpsc::Receiver<NotificationJob>,
    media_dir: tempfile::TempDir,
}

fn lead_api() -> Api {
    let media_dir = tempfile::tempdir().unwrap();
    let (queue, jobs) = NotificationQueue::channel(16);
    let intake = Arc::new(LeadIntake::new(
        MemoryLeadStore::default(),
        MediaStore::new(media_dir.path()),
        queue,
    ));
    let app = routes::trim_trailing_slash(routes::lead_routes(Arc::clone(&intake)));
    Api {
        app,
        intake,
        jobs,
        media_dir,
    }
}

/// One multipart part: field name, optional file name, content.
type FormPart<'a> = (&'a str, Option<&'a str>, &'a [u8]);

fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                name, file_name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn post_form(uri: &str, parts: &[FormPart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(app: NormalizePath<Router>, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn contact_parts<'a>(phone: &'a str) -> Vec<FormPart<'a>> {
    vec![
        ("name", None, b"Aigerim".as_slice()),
        ("email", None, b"aigerim@example.kg".as_slice()),
        ("phone", None, phone.as_bytes()),
        ("message", None, b"Need a new site".as_slice()),
    ]
}

#[tokio::test]
async fn test_contact_form_returns_created_lead_with_canonical_phone() {
    let mut api = lead_api();

    let (status, body) = send(
        api.app.clone(),
        post_form("/api/contacts", &contact_parts("0 (700) 12-34-56")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phone"], "+996 700 123 456");
    assert_eq!(body["message"], "Need a new site");
    assert_eq!(body["file"], Value::Null);
    assert!(body["id"].as_i64().is_some());

    assert_eq!(api.intake.store().rows().len(), 1);
    assert!(api.jobs.try_recv().is_ok());
}

#[tokio::test]
async fn test_invalid_phone_returns_field_errors() {
    let mut api = lead_api();

    let (status, body) = send(
        api.app.clone(),
        post_form("/api/contacts", &contact_parts("+996 000 000 000")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let phone_errors = body["fields"]["phone"].as_array().unwrap();
    assert_eq!(phone_errors.len(), 1);
    assert!(phone_errors[0]
        .as_str()
        .unwrap()
        .contains("+996 XXX XXX XXX"));
    assert!(body["fields"].get("name").is_none());

    assert!(api.intake.store().rows().is_empty());
    assert!(api.jobs.try_recv().is_err());
}

#[tokio::test]
async fn test_missing_fields_are_all_reported() {
    let api = lead_api();

    let (status, body) = send(
        api.app.clone(),
        post_form("/api/contact_vacancy", &[("name", None, b"Bakyt".as_slice())]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["fields"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(fields, vec!["email", "link", "phone"]);
    assert_eq!(body["fields"]["link"][0], "This field is required.");
}

#[tokio::test]
async fn test_vacancy_application_stores_attachment() {
    let mut api = lead_api();

    let (status, body) = send(
        api.app.clone(),
        post_form(
            "/api/contact_vacancy",
            &[
                ("name", None, b"Bakyt".as_slice()),
                ("email", None, b"bakyt@example.kg".as_slice()),
                ("phone", None, b"996555123456".as_slice()),
                ("link", None, b"https://github.com/bakyt".as_slice()),
                ("file", Some("cv.pdf"), b"%PDF-1.4 resume".as_slice()),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phone"], "+996 555 123 456");
    assert_eq!(body["link"], "https://github.com/bakyt");
    let file = body["file"].as_str().unwrap();
    assert!(file.starts_with("contacts/vacancy/"));
    assert!(file.ends_with("_cv.pdf"));

    let stored = api.media_dir.path().join(file);
    assert_eq!(std::fs::read(&stored).unwrap(), b"%PDF-1.4 resume");
    assert_eq!(api.jobs.try_recv().unwrap().attachment, Some(stored));
}

#[tokio::test]
async fn test_empty_file_parts_are_ignored() {
    let api = lead_api();

    // Browser with no file chosen, then a bare `file=` field
    for file_part in [
        ("file", Some(""), b"".as_slice()),
        ("file", None, b"".as_slice()),
    ] {
        let mut parts = contact_parts("700123456");
        parts.push(file_part);

        let (status, body) = send(api.app.clone(), post_form("/api/contacts", &parts)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["file"], Value::Null);
    }

    assert_eq!(count_files(api.media_dir.path()), 0);
}

#[tokio::test]
async fn test_disallowed_attachment_is_a_file_error() {
    let api = lead_api();
    let mut parts = contact_parts("0700123456");
    parts.push(("file", Some("deploy.sh"), b"#!/bin/sh".as_slice()));

    let (status, body) = send(api.app.clone(), post_form("/api/contacts", &parts)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["file"][0]
        .as_str()
        .unwrap()
        .starts_with("Disallowed file type"));
    assert_eq!(count_files(api.media_dir.path()), 0);
}

#[tokio::test]
async fn test_trailing_slash_routes_reach_the_same_handler() {
    let api = lead_api();

    let (status, body) = send(
        api.app.clone(),
        post_form("/api/contacts/", &contact_parts("+996700123456")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phone"], "+996 700 123 456");
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let api = lead_api();
    let request = Request::builder()
        .method("POST")
        .uri("/api/contacts")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"x"}"#))
        .unwrap();

    let (status, _) = send(api.app.clone(), request).await;
    assert!(status.is_client_error());
    assert!(api.intake.store().rows().is_empty());
}

#[tokio::test]
async fn test_review_without_text_is_rejected_before_touching_the_database() {
    // Never connects: validation fails first
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://navis@localhost/unused")
        .unwrap();
    let app = routes::trim_trailing_slash(routes::review_routes(Arc::new(AppState { db: pool })));

    let request = Request::builder()
        .method("POST")
        .uri("/api/reviews/")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"text":"   ","content":"<p>hi</p>"}"#))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["text"][0], "This field is required.");
}
