//! Notification strips and scrolling ticker texts for the public site.

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

const NOTIFICATION_COLUMNS: &str = "id, name, date, link, created_at, updated_at";
const SCROLLING_COLUMNS: &str = "id, text, link, created_at, updated_at";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub name: String,
    pub date: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewNotification {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NotificationPatch {
    pub name: Option<String>,
    pub date: Option<String>,
    pub link: Option<String>,
}

pub async fn create_notification(
    State(state): State<AppState>,
    Json(body): Json<NewNotification>,
) -> Result<impl IntoResponse, AppError> {
    validation::require("name", &body.name)?;
    validation::require("date", &body.date)?;
    let sql = format!(
        "INSERT INTO notifications (id, name, date, link) VALUES ($1, $2, $3, $4) \
         RETURNING {NOTIFICATION_COLUMNS}"
    );
    let notification: Notification = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(body.name.trim())
        .bind(body.date.trim())
        .bind(&body.link)
        .fetch_one(&state.pool)
        .await?;
    Ok(success_one(notification))
}

pub async fn list_notifications(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications ORDER BY created_at DESC");
    let notifications: Vec<Notification> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(success_many(notifications))
}

pub async fn update_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<NotificationPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    if let Some(name) = &body.name {
        validation::require("name", name)?;
    }
    if let Some(date) = &body.date {
        validation::require("date", date)?;
    }
    let sql = format!(
        "UPDATE notifications SET name = COALESCE($2, name), date = COALESCE($3, date), \
         link = COALESCE($4, link), updated_at = NOW() WHERE id = $1 \
         RETURNING {NOTIFICATION_COLUMNS}"
    );
    let notification: Option<Notification> = sqlx::query_as(&sql)
        .bind(id)
        .bind(&body.name)
        .bind(&body.date)
        .bind(&body.link)
        .fetch_optional(&state.pool)
        .await?;
    let notification =
        notification.ok_or_else(|| AppError::NotFound(format!("notification {id}")))?;
    Ok(success_one_ok(notification))
}

pub async fn remove_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("notification {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ScrollingText {
    pub id: Uuid,
    pub text: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewScrollingText {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScrollingTextPatch {
    pub text: Option<String>,
    pub link: Option<String>,
}

pub async fn create_scrolling_text(
    State(state): State<AppState>,
    Json(body): Json<NewScrollingText>,
) -> Result<impl IntoResponse, AppError> {
    validation::require("text", &body.text)?;
    let sql = format!(
        "INSERT INTO scrolling_texts (id, text, link) VALUES ($1, $2, $3) \
         RETURNING {SCROLLING_COLUMNS}"
    );
    let scrolling: ScrollingText = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(body.text.trim())
        .bind(body.link.unwrap_or_default())
        .fetch_one(&state.pool)
        .await?;
    Ok(success_one(scrolling))
}

pub async fn list_scrolling_texts(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {SCROLLING_COLUMNS} FROM scrolling_texts ORDER BY created_at DESC");
    let texts: Vec<ScrollingText> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(success_many(texts))
}

pub async fn update_scrolling_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ScrollingTextPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    if let Some(text) = &body.text {
        validation::require("text", text)?;
    }
    let sql = format!(
        "UPDATE scrolling_texts SET text = COALESCE($2, text), link = COALESCE($3, link), \
         updated_at = NOW() WHERE id = $1 RETURNING {SCROLLING_COLUMNS}"
    );
    let scrolling: Option<ScrollingText> = sqlx::query_as(&sql)
        .bind(id)
        .bind(&body.text)
        .bind(&body.link)
        .fetch_optional(&state.pool)
        .await?;
    let scrolling = scrolling.ok_or_else(|| AppError::NotFound(format!("scrolling text {id}")))?;
    Ok(success_one_ok(scrolling))
}

pub async fn remove_scrolling_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let result = sqlx::query("DELETE FROM scrolling_texts WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("scrolling text {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
