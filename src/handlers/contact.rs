//! Contact-form endpoints: public submit, admin listing, CSV export.

use crate::error::AppError;
use crate::response::{success_many, success_one};
use crate::service::validation;
use crate::state::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CONTACT_COLUMNS: &str = "id, name, mobile, email, course, city, message, submitted_at";

const EXPORT_HEADERS: [&str; 7] = [
    "Name",
    "Mobile Number",
    "Email ID",
    "Interested Course",
    "City",
    "Message",
    "Submission Time",
];

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ContactForm {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub course: String,
    pub city: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ContactFormBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub message: String,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<ContactFormBody>,
) -> Result<impl IntoResponse, AppError> {
    validation::require("name", &body.name)?;
    validation::require_mobile("mobile", &body.mobile)?;
    validation::require_email("email", &body.email)?;
    validation::require("course", &body.course)?;
    validation::require("city", &body.city)?;
    validation::require("message", &body.message)?;
    let sql = format!(
        "INSERT INTO contact_forms (id, name, mobile, email, course, city, message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {CONTACT_COLUMNS}"
    );
    let entry: ContactForm = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(&body.name)
        .bind(&body.mobile)
        .bind(&body.email)
        .bind(&body.course)
        .bind(&body.city)
        .bind(&body.message)
        .fetch_one(&state.pool)
        .await?;
    Ok(success_one(entry))
}

pub async fn entries(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = fetch_all(&state.pool).await?;
    Ok(success_many(entries))
}

/// All submissions as a CSV attachment, newest first.
pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = fetch_all(&state.pool).await?;
    let mut csv = csv_line(&EXPORT_HEADERS.map(String::from));
    for entry in &entries {
        csv.push_str(&csv_line(&[
            entry.name.clone(),
            entry.mobile.clone(),
            entry.email.clone(),
            entry.course.clone(),
            entry.city.clone(),
            entry.message.clone(),
            entry.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]));
    }
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=form_data.csv".to_string(),
            ),
        ],
        csv,
    ))
}

async fn fetch_all(pool: &sqlx::PgPool) -> Result<Vec<ContactForm>, AppError> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contact_forms ORDER BY submitted_at DESC");
    Ok(sqlx::query_as(&sql).fetch_all(pool).await?)
}

fn csv_line(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

/// Quote a field when it contains a delimiter, quote, or newline; embedded
/// quotes are doubled.
fn csv_escape(field: &str) -> String {
    if field
        .chars()
        .any(|c| matches!(c, ',' | '"' | '\n' | '\r'))
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(csv_escape("Asha Rao"), "Asha Rao");
    }

    #[test]
    fn delimiters_and_quotes_are_escaped() {
        assert_eq!(csv_escape("Rao, Asha"), "\"Rao, Asha\"");
        assert_eq!(csv_escape("said \"hi\""), "\"said \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn lines_join_fields_with_commas_and_crlf() {
        let line = csv_line(&["a".into(), "b,c".into(), "d".into()]);
        assert_eq!(line, "a,\"b,c\",d\r\n");
    }
}
