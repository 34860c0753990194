//! Chairman message CRUD: two text blocks plus up to three images, each under
//! its own storage prefix.

use crate::error::AppError;
use crate::handlers::multipart::{MultipartForm, UploadedFile};
use crate::handlers::parse_uuid;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::validation;
use crate::state::AppState;
use crate::storage::unique_object_name;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

const CHAIRMAN_COLUMNS: &str = "id, about_chairman, chairman_message, chairman_photo, \
     chairman_photo_redirect, chairman_message_photo, chairman_message_banner, \
     chairman_message_redirect, created_at, updated_at";

const PHOTO_PREFIX: &str = "chairman_photos";
const MESSAGE_PHOTO_PREFIX: &str = "chairman_message_photos";
const BANNER_PREFIX: &str = "chairman_banners";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ChairmanMessage {
    pub id: Uuid,
    pub about_chairman: String,
    pub chairman_message: String,
    pub chairman_photo: Option<String>,
    pub chairman_photo_redirect: Option<String>,
    pub chairman_message_photo: Option<String>,
    pub chairman_message_banner: Option<String>,
    pub chairman_message_redirect: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

async fn upload(state: &AppState, prefix: &str, file: UploadedFile) -> Result<String, AppError> {
    let key = format!("{prefix}/{}", unique_object_name(&file.file_name));
    state.storage.put(&key, file.bytes, &file.content_type).await
}

pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let about_chairman = form.text("about_chairman").unwrap_or_default().trim().to_string();
    let chairman_message = form.text("chairman_message").unwrap_or_default().trim().to_string();
    validation::require("about_chairman", &about_chairman)?;
    validation::require("chairman_message", &chairman_message)?;
    let photo_redirect = form.text_non_empty("chairman_photo_redirect");
    let message_redirect = form.text_non_empty("chairman_message_redirect");

    let chairman_photo = match form.take_file("chairman_photo") {
        Some(file) => Some(upload(&state, PHOTO_PREFIX, file).await?),
        None => None,
    };
    let chairman_message_photo = match form.take_file("chairman_message_photo") {
        Some(file) => Some(upload(&state, MESSAGE_PHOTO_PREFIX, file).await?),
        None => None,
    };
    let chairman_message_banner = match form.take_file("chairman_message_banner") {
        Some(file) => Some(upload(&state, BANNER_PREFIX, file).await?),
        None => None,
    };

    let sql = format!(
        "INSERT INTO chairman_messages (id, about_chairman, chairman_message, chairman_photo, \
         chairman_photo_redirect, chairman_message_photo, chairman_message_banner, \
         chairman_message_redirect) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {CHAIRMAN_COLUMNS}"
    );
    let message: ChairmanMessage = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(&about_chairman)
        .bind(&chairman_message)
        .bind(&chairman_photo)
        .bind(&photo_redirect)
        .bind(&chairman_message_photo)
        .bind(&chairman_message_banner)
        .bind(&message_redirect)
        .fetch_one(&state.pool)
        .await?;
    Ok(success_one(message))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {CHAIRMAN_COLUMNS} FROM chairman_messages ORDER BY created_at DESC");
    let messages: Vec<ChairmanMessage> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(success_many(messages))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let mut form = MultipartForm::read(multipart).await?;
    let sql = format!("SELECT {CHAIRMAN_COLUMNS} FROM chairman_messages WHERE id = $1");
    let current: Option<ChairmanMessage> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let current = current.ok_or_else(|| AppError::NotFound(format!("chairman message {id}")))?;

    let about_chairman = form.text_non_empty("about_chairman");
    let chairman_message = form.text_non_empty("chairman_message");
    let photo_redirect = form.text_non_empty("chairman_photo_redirect");
    let message_redirect = form.text_non_empty("chairman_message_redirect");

    let mut replaced = Vec::new();
    let chairman_photo = match form.take_file("chairman_photo") {
        Some(file) => {
            replaced.extend(current.chairman_photo.clone());
            Some(upload(&state, PHOTO_PREFIX, file).await?)
        }
        None => None,
    };
    let chairman_message_photo = match form.take_file("chairman_message_photo") {
        Some(file) => {
            replaced.extend(current.chairman_message_photo.clone());
            Some(upload(&state, MESSAGE_PHOTO_PREFIX, file).await?)
        }
        None => None,
    };
    let chairman_message_banner = match form.take_file("chairman_message_banner") {
        Some(file) => {
            replaced.extend(current.chairman_message_banner.clone());
            Some(upload(&state, BANNER_PREFIX, file).await?)
        }
        None => None,
    };

    let sql = format!(
        "UPDATE chairman_messages SET about_chairman = COALESCE($2, about_chairman), \
         chairman_message = COALESCE($3, chairman_message), \
         chairman_photo = COALESCE($4, chairman_photo), \
         chairman_photo_redirect = COALESCE($5, chairman_photo_redirect), \
         chairman_message_photo = COALESCE($6, chairman_message_photo), \
         chairman_message_banner = COALESCE($7, chairman_message_banner), \
         chairman_message_redirect = COALESCE($8, chairman_message_redirect), \
         updated_at = NOW() WHERE id = $1 RETURNING {CHAIRMAN_COLUMNS}"
    );
    let message: Option<ChairmanMessage> = sqlx::query_as(&sql)
        .bind(id)
        .bind(&about_chairman)
        .bind(&chairman_message)
        .bind(&chairman_photo)
        .bind(&photo_redirect)
        .bind(&chairman_message_photo)
        .bind(&chairman_message_banner)
        .bind(&message_redirect)
        .fetch_optional(&state.pool)
        .await?;
    let message = message.ok_or_else(|| AppError::NotFound(format!("chairman message {id}")))?;

    for old in replaced {
        state.storage.delete_url_logged(&old).await;
    }
    Ok(success_one_ok(message))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let sql = format!("SELECT {CHAIRMAN_COLUMNS} FROM chairman_messages WHERE id = $1");
    let message: Option<ChairmanMessage> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let message = message.ok_or_else(|| AppError::NotFound(format!("chairman message {id}")))?;
    for url in [
        &message.chairman_photo,
        &message.chairman_message_photo,
        &message.chairman_message_banner,
    ]
    .into_iter()
    .flatten()
    {
        state.storage.delete_url(url).await?;
    }
    sqlx::query("DELETE FROM chairman_messages WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
