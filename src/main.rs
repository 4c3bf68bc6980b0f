use axum::{extract::DefaultBodyLimit, extract::Request, Router, ServiceExt};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navis_api::config::Config;
use navis_api::db::Database;
use navis_api::db_storage::PgLeadStore;
use navis_api::handlers::AppState;
use navis_api::intake::LeadIntake;
use navis_api::notifications::{self, NotificationQueue};
use navis_api::routes;
use navis_api::telegram_client::TelegramClient;
use navis_api::uploads::MediaStore;

/// Request body cap for the lead forms. Larger than the attachment limit so
/// an oversized file reaches validation and gets a field error instead of 413.
const FORM_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// How long shutdown waits for queued notifications to go out.
const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Main entry point for the application.
///
/// Initializes logging, configuration, the database (with migrations), the
/// media store, the notification workers and the HTTP routes, then serves
/// until Ctrl-C / SIGTERM and drains pending notifications.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navis_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database connection pool established");

    tokio::fs::create_dir_all(&config.media_root).await?;
    let media_root = tokio::fs::canonicalize(&config.media_root).await?;
    let media = MediaStore::new(media_root.clone());
    tracing::info!("Media root: {}", media_root.display());

    let telegram = TelegramClient::new(
        config.telegram_api_base_url.clone(),
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    )?;
    let (queue, jobs) = NotificationQueue::channel(config.notification_queue_capacity);
    let workers = notifications::spawn_workers(jobs, telegram, config.notification_workers);
    tracing::info!(
        "✓ {} notification worker(s) started",
        config.notification_workers
    );

    let app_state = Arc::new(AppState {
        db: db.pool.clone(),
    });
    let intake = Arc::new(LeadIntake::new(
        PgLeadStore::new(db.pool.clone()),
        media,
        queue,
    ));

    let app = routes::trim_trailing_slash(build_router(app_state, intake, &config, media_root)?);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and with it every queue handle) is gone; workers finish what is queued
    tracing::info!("Draining notification queue");
    let drain = join_workers(workers);
    if tokio::time::timeout(NOTIFICATION_DRAIN_TIMEOUT, drain)
        .await
        .is_err()
    {
        tracing::warn!("Notification workers did not finish in time; pending jobs dropped");
    }

    db.pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(
    app_state: Arc<AppState>,
    intake: Arc<LeadIntake<PgLeadStore>>,
    config: &Config,
    media_root: PathBuf,
) -> anyhow::Result<Router> {
    // Form spam guard: burst of 5 submissions per IP, then one every 6 seconds
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(6)
            .burst_size(5)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    // Write routes share the body limit and rate limiter
    let write_guard = || {
        ServiceBuilder::new()
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(FORM_BODY_LIMIT))
            .layer(GovernorLayer {
                config: Arc::clone(&governor_conf),
            })
    };

    let mut app = routes::content_routes(Arc::clone(&app_state))
        .merge(routes::lead_routes(intake).layer(write_guard()))
        .merge(routes::review_routes(app_state).layer(write_guard()));

    if config.serve_media {
        app = app.nest_service("/media", ServeDir::new(media_root));
    }

    Ok(app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}

async fn join_workers(handles: Vec<tokio::task::JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Notification worker panicked: {}", e);
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
