//! Utility to inspect the database schema and print table structures.

use sqlx::postgres::PgPoolOptions;
use std::env;

/// Tables owned by the site backend, content first, then leads.
const SITE_TABLES: &[&str] = &[
    "events",
    "event_images",
    "services",
    "vacancies",
    "projects",
    "reviews",
    "youtube_shorts",
    "about",
    "gallery",
    "tools",
    "tool_images",
    "contacts",
    "contact_vacancies",
];

/// Main entry point for the schema inspection utility.
///
/// Connects to the database and lists columns and row counts for every site
/// table, flagging tables the migrations have not created yet.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("DB_URL"))
        .map_err(|_| anyhow::anyhow!("DATABASE_URL or DB_URL must be set"))?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    for table in SITE_TABLES {
        let columns: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&pool)
        .await?;

        if columns.is_empty() {
            println!("- {} (missing)", table);
            println!();
            continue;
        }

        // Table names come from the fixed list above
        let rows: i64 = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await?;

        println!("- {} ({} rows)", table, rows);
        for (column, data_type, nullable) in columns {
            let null_marker = if nullable == "YES" { " NULL" } else { "" };
            println!("  - {}: {}{}", column, data_type, null_marker);
        }
        println!();
    }

    Ok(())
}
