//! Page banner CRUD. One banner per page name; images live in object storage
//! under the `banners/` prefix.

use crate::error::AppError;
use crate::handlers::multipart::MultipartForm;
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

const BANNER_COLUMNS: &str = "id, page_name, image_url, created_at";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct PageBanner {
    pub id: Uuid,
    pub page_name: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let page_name = form.text("page_name").unwrap_or_default().trim().to_string();
    validation::require("page_name", &page_name)?;
    let file = form
        .take_file("banner_image")
        .ok_or_else(|| AppError::Validation("banner_image file is required".into()))?;

    let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM page_banners WHERE page_name = $1")
        .bind(&page_name)
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict(format!(
            "banner for page '{page_name}' already exists"
        )));
    }

    let key = format!("banners/{}", unique_object_name(&file.file_name));
    let image_url = state.storage.put(&key, file.bytes, &file.content_type).await?;
    let sql = format!(
        "INSERT INTO page_banners (id, page_name, image_url) VALUES ($1, $2, $3) \
         RETURNING {BANNER_COLUMNS}"
    );
    let banner: PageBanner = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(&page_name)
        .bind(&image_url)
        .fetch_one(&state.pool)
        .await?;
    Ok(success_one(banner))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {BANNER_COLUMNS} FROM page_banners ORDER BY page_name ASC");
    let banners: Vec<PageBanner> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(success_many(banners))
}

pub async fn by_page(
    State(state): State<AppState>,
    Path(page_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {BANNER_COLUMNS} FROM page_banners WHERE page_name = $1");
    let banner: Option<PageBanner> = sqlx::query_as(&sql)
        .bind(&page_name)
        .fetch_optional(&state.pool)
        .await?;
    let banner = banner.ok_or_else(|| AppError::NotFound(format!("banner for page {page_name}")))?;
    Ok(success_one_ok(banner))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let mut form = MultipartForm::read(multipart).await?;
    let sql = format!("SELECT {BANNER_COLUMNS} FROM page_banners WHERE id = $1");
    let current: Option<PageBanner> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let current = current.ok_or_else(|| AppError::NotFound(format!("banner {id}")))?;

    let page_name = form.text_non_empty("page_name");
    let mut image_url = None;
    let mut replaced = None;
    if let Some(file) = form.take_file("banner_image") {
        let key = format!("banners/{}", unique_object_name(&file.file_name));
        image_url = Some(state.storage.put(&key, file.bytes, &file.content_type).await?);
        replaced = Some(current.image_url.clone());
    }

    let sql = format!(
        "UPDATE page_banners SET page_name = COALESCE($2, page_name), \
         image_url = COALESCE($3, image_url) WHERE id = $1 RETURNING {BANNER_COLUMNS}"
    );
    let banner: Option<PageBanner> = sqlx::query_as(&sql)
        .bind(id)
        .bind(&page_name)
        .bind(&image_url)
        .fetch_optional(&state.pool)
        .await?;
    let banner = banner.ok_or_else(|| AppError::NotFound(format!("banner {id}")))?;

    if let Some(old) = replaced {
        state.storage.delete_url_logged(&old).await;
    }
    Ok(success_one_ok(banner))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let sql = format!("SELECT {BANNER_COLUMNS} FROM page_banners WHERE id = $1");
    let banner: Option<PageBanner> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let banner = banner.ok_or_else(|| AppError::NotFound(format!("banner {id}")))?;
    state.storage.delete_url(&banner.image_url).await?;
    sqlx::query("DELETE FROM page_banners WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
