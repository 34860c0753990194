//! Mission and vision statements. A single row (id = 1) that PUT creates or
//! replaces; images survive an update that does not resend them.

use crate::error::AppError;
use crate::handlers::multipart::MultipartForm;
use crate::response::success_one_ok;
use crate::service::validation;
use crate::state::AppState;
use crate::storage::titled_object_name;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

const MISSION_VISION_COLUMNS: &str = "mission, mission_image, vision, vision_image, updated_at";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct MissionVision {
    pub mission: String,
    pub mission_image: Option<String>,
    pub vision: String,
    pub vision_image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub async fn upsert(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let mission = form.text("mission").unwrap_or_default().trim().to_string();
    let vision = form.text("vision").unwrap_or_default().trim().to_string();
    validation::require("mission", &mission)?;
    validation::require("vision", &vision)?;

    let mission_image = match form.take_file("mission_image") {
        Some(file) => {
            let key = format!(
                "mission-and-vision/{}",
                titled_object_name("mission", &file.file_name)
            );
            Some(state.storage.put(&key, file.bytes, &file.content_type).await?)
        }
        None => None,
    };
    let vision_image = match form.take_file("vision_image") {
        Some(file) => {
            let key = format!(
                "mission-and-vision/{}",
                titled_object_name("vision", &file.file_name)
            );
            Some(state.storage.put(&key, file.bytes, &file.content_type).await?)
        }
        None => None,
    };

    let mut tx = state.pool.begin().await?;
    let previous: Option<(Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT mission_image, vision_image FROM mission_vision WHERE id = 1 FOR UPDATE",
    )
    .fetch_optional(&mut *tx)
    .await?;
    let sql = format!(
        "INSERT INTO mission_vision (id, mission, vision, mission_image, vision_image) \
         VALUES (1, $1, $2, $3, $4) \
         ON CONFLICT (id) DO UPDATE SET mission = EXCLUDED.mission, vision = EXCLUDED.vision, \
         mission_image = COALESCE(EXCLUDED.mission_image, mission_vision.mission_image), \
         vision_image = COALESCE(EXCLUDED.vision_image, mission_vision.vision_image), \
         updated_at = NOW() RETURNING {MISSION_VISION_COLUMNS}"
    );
    let stored: MissionVision = sqlx::query_as(&sql)
        .bind(&mission)
        .bind(&vision)
        .bind(&mission_image)
        .bind(&vision_image)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Some((old_mission, old_vision)) = previous {
        if mission_image.is_some() {
            if let Some(old) = old_mission {
                state.storage.delete_url_logged(&old).await;
            }
        }
        if vision_image.is_some() {
            if let Some(old) = old_vision {
                state.storage.delete_url_logged(&old).await;
            }
        }
    }
    Ok(success_one_ok(stored))
}

pub async fn fetch(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {MISSION_VISION_COLUMNS} FROM mission_vision WHERE id = 1");
    let stored: Option<MissionVision> = sqlx::query_as(&sql).fetch_optional(&state.pool).await?;
    let stored = stored.ok_or_else(|| AppError::NotFound("mission and vision not set".into()))?;
    Ok(success_one_ok(stored))
}
