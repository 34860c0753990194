//! Question-paper CRUD. PDFs are stored under `question-papers/` with the
//! title worked into the object name.

use crate::error::AppError;
use crate::handlers::multipart::MultipartForm;
use crate::handlers::parse_uuid;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::validation;
use crate::state::AppState;
use crate::storage::titled_object_name;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

const PAPER_COLUMNS: &str = "id, title, pdf_url, created_at";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct QuestionPaper {
    pub id: Uuid,
    pub title: String,
    pub pdf_url: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let title = form.text("title").unwrap_or_default().trim().to_string();
    validation::require("title", &title)?;
    let file = form
        .take_file("pdf")
        .ok_or_else(|| AppError::Validation("pdf file is required".into()))?;

    let key = format!("question-papers/{}", titled_object_name(&title, &file.file_name));
    let pdf_url = state.storage.put(&key, file.bytes, &file.content_type).await?;
    let sql = format!(
        "INSERT INTO question_papers (id, title, pdf_url) VALUES ($1, $2, $3) \
         RETURNING {PAPER_COLUMNS}"
    );
    let paper: QuestionPaper = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(&title)
        .bind(&pdf_url)
        .fetch_one(&state.pool)
        .await?;
    Ok(success_one(paper))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {PAPER_COLUMNS} FROM question_papers ORDER BY created_at DESC");
    let papers: Vec<QuestionPaper> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(success_many(papers))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let mut form = MultipartForm::read(multipart).await?;
    let sql = format!("SELECT {PAPER_COLUMNS} FROM question_papers WHERE id = $1");
    let current: Option<QuestionPaper> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let current = current.ok_or_else(|| AppError::NotFound(format!("question paper {id}")))?;

    let title = form.text_non_empty("title");
    let mut pdf_url = None;
    let mut replaced = None;
    if let Some(file) = form.take_file("pdf") {
        let name = title.as_deref().unwrap_or(&current.title);
        let key = format!("question-papers/{}", titled_object_name(name, &file.file_name));
        pdf_url = Some(state.storage.put(&key, file.bytes, &file.content_type).await?);
        replaced = Some(current.pdf_url.clone());
    }

    let sql = format!(
        "UPDATE question_papers SET title = COALESCE($2, title), \
         pdf_url = COALESCE($3, pdf_url) WHERE id = $1 RETURNING {PAPER_COLUMNS}"
    );
    let paper: Option<QuestionPaper> = sqlx::query_as(&sql)
        .bind(id)
        .bind(&title)
        .bind(&pdf_url)
        .fetch_optional(&state.pool)
        .await?;
    let paper = paper.ok_or_else(|| AppError::NotFound(format!("question paper {id}")))?;

    if let Some(old) = replaced {
        state.storage.delete_url_logged(&old).await;
    }
    Ok(success_one_ok(paper))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let sql = format!("SELECT {PAPER_COLUMNS} FROM question_papers WHERE id = $1");
    let paper: Option<QuestionPaper> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let paper = paper.ok_or_else(|| AppError::NotFound(format!("question paper {id}")))?;
    state.storage.delete_url(&paper.pdf_url).await?;
    sqlx::query("DELETE FROM question_papers WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
