//! Navis Site API Library
//!
//! Backend of the company marketing site: read-only JSON endpoints over the
//! site content, and the two lead forms (contact, vacancy application) whose
//! submissions are validated, stored, and forwarded to a Telegram channel.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection, pool and migrations.
//! - `db_storage`: Lead persistence.
//! - `errors`: Error handling types.
//! - `handlers`: Content state and HTTP handlers, including review submission.
//! - `intake`: Validate-then-commit pipeline for lead forms.
//! - `lead_handler`: Multipart lead form handlers.
//! - `leads`: Lead form types and validation.
//! - `models`: Content data models.
//! - `notifications`: Notification queue, message templates and workers.
//! - `pagination`: Page parameters and paginated responses.
//! - `phone`: Kyrgyz phone normalization and validation.
//! - `routes`: Route tables for content, reviews and lead forms.
//! - `services`: Content queries.
//! - `telegram_client`: Telegram Bot API client.
//! - `uploads`: Attachment checks and the media store.

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod intake;
pub mod lead_handler;
pub mod leads;
pub mod models;
pub mod notifications;
pub mod pagination;
pub mod phone;
pub mod routes;
pub mod services;
pub mod telegram_client;
pub mod uploads;
