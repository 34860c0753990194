//! Course CRUD. Medium, mode, and category are closed enumerations; the
//! optional banner image is stored under `courses/banner/`.

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

const COURSE_COLUMNS: &str =
    "id, course_name, medium, mode, category, banner_img, created_at, updated_at";

const MEDIUMS: &[&str] = &["ENGLISH", "TELUGU", "ENGLISH/TELUGU"];
const MODES: &[&str] = &["online", "offline", "online/offline"];
const CATEGORIES: &[&str] = &["GOVERNMENT JOBS", "STATE PSC EXAMS"];

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Course {
    pub id: Uuid,
    pub course_name: String,
    pub medium: String,
    pub mode: String,
    pub category: String,
    pub banner_img: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let course_name = form.text("course_name").unwrap_or_default().trim().to_string();
    let medium = form.text("medium").unwrap_or_default().trim().to_string();
    let mode = form.text("mode").unwrap_or_default().trim().to_string();
    let category = form.text("category").unwrap_or_default().trim().to_string();
    validation::require("course_name", &course_name)?;
    validation::require("medium", &medium)?;
    validation::require("mode", &mode)?;
    validation::require("category", &category)?;
    validation::require_one_of("medium", &medium, MEDIUMS)?;
    validation::require_one_of("mode", &mode, MODES)?;
    validation::require_one_of("category", &category, CATEGORIES)?;

    let banner_img = match form.take_file("banner_img") {
        Some(file) => {
            let key = format!(
                "courses/banner/{}",
                titled_object_name(&course_name, &file.file_name)
            );
            Some(state.storage.put(&key, file.bytes, &file.content_type).await?)
        }
        None => None,
    };

    let sql = format!(
        "INSERT INTO courses (id, course_name, medium, mode, category, banner_img) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COURSE_COLUMNS}"
    );
    let course: Course = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(&course_name)
        .bind(&medium)
        .bind(&mode)
        .bind(&category)
        .bind(&banner_img)
        .fetch_one(&state.pool)
        .await?;
    Ok(success_one(course))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC");
    let courses: Vec<Course> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(success_many(courses))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let mut form = MultipartForm::read(multipart).await?;
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
    let current: Option<Course> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let current = current.ok_or_else(|| AppError::NotFound(format!("course {id}")))?;

    let course_name = form.text_non_empty("course_name");
    let medium = form.text_non_empty("medium");
    let mode = form.text_non_empty("mode");
    let category = form.text_non_empty("category");
    if let Some(medium) = &medium {
        validation::require_one_of("medium", medium, MEDIUMS)?;
    }
    if let Some(mode) = &mode {
        validation::require_one_of("mode", mode, MODES)?;
    }
    if let Some(category) = &category {
        validation::require_one_of("category", category, CATEGORIES)?;
    }

    let mut banner_img = None;
    let mut replaced = None;
    if let Some(file) = form.take_file("banner_img") {
        let title = course_name.as_deref().unwrap_or(&current.course_name);
        let key = format!("courses/banner/{}", titled_object_name(title, &file.file_name));
        banner_img = Some(state.storage.put(&key, file.bytes, &file.content_type).await?);
        replaced = current.banner_img.clone();
    }

    let sql = format!(
        "UPDATE courses SET course_name = COALESCE($2, course_name), \
         medium = COALESCE($3, medium), mode = COALESCE($4, mode), \
         category = COALESCE($5, category), banner_img = COALESCE($6, banner_img), \
         updated_at = NOW() WHERE id = $1 RETURNING {COURSE_COLUMNS}"
    );
    let course: Option<Course> = sqlx::query_as(&sql)
        .bind(id)
        .bind(&course_name)
        .bind(&medium)
        .bind(&mode)
        .bind(&category)
        .bind(&banner_img)
        .fetch_optional(&state.pool)
        .await?;
    let course = course.ok_or_else(|| AppError::NotFound(format!("course {id}")))?;

    if let Some(old) = replaced {
        state.storage.delete_url_logged(&old).await;
    }
    Ok(success_one_ok(course))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_uuid(&id)?;
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
    let course: Option<Course> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let course = course.ok_or_else(|| AppError::NotFound(format!("course {id}")))?;
    if let Some(url) = &course.banner_img {
        state.storage.delete_url(url).await?;
    }
    sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
