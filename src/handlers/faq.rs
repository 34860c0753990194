//! FAQ CRUD.

use crate::error::AppError;
use crate::handlers::parse_uuid;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::validation;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const FAQ_COLUMNS: &str = "id, question, answer, created_at, updated_at";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct FaqBody {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Deserialize)]
pub struct FaqPatch {
    pub question: Option<String>,
    pub answer: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<FaqBody>,
) -> Result<impl IntoResponse, AppError> {
    validation::require("question", &body.question)?;
    validation::require("answer", &body.answer)?;
    let sql = format!(
        "INSERT INTO faqs (id, question, answer) VALUES ($1, $2, $3) RETURNING {FAQ_COLUMNS}"
    );
    let faq: Faq = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(&body.question)
        .bind(&body.answer)
        .fetch_one(&state.pool)
        .await?;
    Ok(success_one(faq))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {FAQ_COLUMNS} FROM faqs ORDER BY created_at ASC");
    let faqs: Vec<Faq> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(success_many(faqs))
}

pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let sql = format!("SELECT {FAQ_COLUMNS} FROM faqs WHERE id = $1");
    let faq: Option<Faq> = sqlx::query_as(&sql).bind(id).fetch_optional(&state.pool).await?;
    let faq = faq.ok_or_else(|| AppError::NotFound(format!("faq {id}")))?;
    Ok(success_one_ok(faq))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<FaqPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    if let Some(question) = &body.question {
        validation::require("question", question)?;
    }
    if let Some(answer) = &body.answer {
        validation::require("answer", answer)?;
    }
    let sql = format!(
        "UPDATE faqs SET question = COALESCE($2, question), answer = COALESCE($3, answer), \
         updated_at = NOW() WHERE id = $1 RETURNING {FAQ_COLUMNS}"
    );
    let faq: Option<Faq> = sqlx::query_as(&sql)
        .bind(id)
        .bind(&body.question)
        .bind(&body.answer)
        .fetch_optional(&state.pool)
        .await?;
    let faq = faq.ok_or_else(|| AppError::NotFound(format!("faq {id}")))?;
    Ok(success_one_ok(faq))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("faq {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM faqs").execute(&state.pool).await?;
    Ok(StatusCode::NO_CONTENT)
}
