//! Startup DDL and the persisted sequence counters. Tables are created
//! idempotently at boot; there are no migration files.

use crate::error::AppError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Counter key for hall-ticket sequence numbers.
pub const HALL_TICKET_COUNTER: &str = "hall_ticket_number";

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS counters (
        name TEXT PRIMARY KEY,
        sequence_value BIGINT NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hall_tickets (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        father_name TEXT NOT NULL DEFAULT '',
        dob TEXT NOT NULL DEFAULT '',
        ssc_hall_ticket_no TEXT NOT NULL DEFAULT '',
        mobile TEXT NOT NULL,
        email TEXT NOT NULL,
        mother_name TEXT NOT NULL DEFAULT '',
        community TEXT NOT NULL DEFAULT '',
        aadhar_no TEXT NOT NULL DEFAULT '',
        parent_no TEXT NOT NULL DEFAULT '',
        gender TEXT NOT NULL DEFAULT '',
        district TEXT NOT NULL,
        hall_ticket_number TEXT NOT NULL UNIQUE,
        issued_at TIMESTAMPTZ NOT NULL,
        expires_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS exam_centre_states (
        state_name TEXT PRIMARY KEY,
        districts JSONB NOT NULL DEFAULT '[]'::jsonb,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contact_forms (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        mobile TEXT NOT NULL,
        email TEXT NOT NULL,
        course TEXT NOT NULL,
        city TEXT NOT NULL,
        message TEXT NOT NULL,
        submitted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS faqs (
        id UUID PRIMARY KEY,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS page_banners (
        id UUID PRIMARY KEY,
        page_name TEXT NOT NULL UNIQUE,
        image_url TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id UUID PRIMARY KEY,
        course_name TEXT NOT NULL,
        medium TEXT NOT NULL,
        mode TEXT NOT NULL,
        category TEXT NOT NULL,
        banner_img TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS question_papers (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        pdf_url TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chairman_messages (
        id UUID PRIMARY KEY,
        about_chairman TEXT NOT NULL,
        chairman_message TEXT NOT NULL,
        chairman_photo TEXT,
        chairman_photo_redirect TEXT,
        chairman_message_photo TEXT,
        chairman_message_banner TEXT,
        chairman_message_redirect TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mission_vision (
        id INT PRIMARY KEY CHECK (id = 1),
        mission TEXT NOT NULL,
        mission_image TEXT,
        vision TEXT NOT NULL,
        vision_image TEXT,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        date TEXT NOT NULL,
        link TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS scrolling_texts (
        id UUID PRIMARY KEY,
        text TEXT NOT NULL,
        link TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Create every table the service uses if it does not exist yet.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Atomic increment-and-read of a named counter; the row is created on first
/// use. A single upsert statement serializes concurrent callers on the row
/// lock, so each caller observes a distinct value and none are skipped.
pub async fn next_sequence(pool: &PgPool, name: &str) -> Result<i64, AppError> {
    let (value,): (i64,) = sqlx::query_as(
        "INSERT INTO counters (name, sequence_value) VALUES ($1, 1) \
         ON CONFLICT (name) DO UPDATE SET sequence_value = counters.sequence_value + 1 \
         RETURNING sequence_value",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    tracing::debug!(name, value, "counter incremented");
    Ok(value)
}

/// Read a counter without incrementing it. Absent counters read as 0.
pub async fn current_sequence(pool: &PgPool, name: &str) -> Result<i64, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT sequence_value FROM counters WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Ensure the database in `database_url` exists; create it if not. Connects to
/// the server's `postgres` maintenance database to run CREATE DATABASE. Call
/// before creating the main pool.
pub async fn ensure_database(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url);
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Config(format!("invalid DATABASE_URL: {e}")))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists {
        sqlx::query(&format!(
            "CREATE DATABASE \"{}\"",
            db_name.replace('"', "\"\"")
        ))
        .execute(&mut conn)
        .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

/// Split a connection URL into an admin URL pointing at `postgres` and the
/// database name. A URL without a database path yields an empty name.
fn split_database_url(url: &str) -> (String, String) {
    let host_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[host_start..].find('/').map(|i| host_start + i) {
        None => (format!("{url}/postgres"), String::new()),
        Some(slash) => {
            let db_name = url[slash + 1..].split('?').next().unwrap_or("").trim();
            (
                format!("{}postgres", &url[..slash + 1]),
                db_name.to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name_from_url() {
        let (admin, name) = split_database_url("postgres://user:pw@db.host:5432/institute");
        assert_eq!(admin, "postgres://user:pw@db.host:5432/postgres");
        assert_eq!(name, "institute");
    }

    #[test]
    fn splits_url_with_query_params() {
        let (admin, name) = split_database_url("postgres://localhost/institute?sslmode=require");
        assert_eq!(admin, "postgres://localhost/postgres");
        assert_eq!(name, "institute");
    }

    #[test]
    fn url_without_database_path_yields_empty_name() {
        let (admin, name) = split_database_url("postgres://localhost");
        assert_eq!(admin, "postgres://localhost/postgres");
        assert_eq!(name, "");
    }
}
