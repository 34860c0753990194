//! Exam-centre endpoints over the per-state district tree.

use crate::error::AppError;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::centres::{self, Centre, StateCentres};
use crate::service::validation;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct AddCentresBody {
    #[serde(default)]
    pub state_name: String,
    #[serde(default)]
    pub district_name: String,
    #[serde(default)]
    pub city_name: String,
    #[serde(default)]
    pub centres: Vec<Centre>,
}

#[derive(Serialize)]
struct CentresAdded {
    created: &'static str,
    state: StateCentres,
}

pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<AddCentresBody>,
) -> Result<impl IntoResponse, AppError> {
    validation::require("state_name", &body.state_name)?;
    validation::require("district_name", &body.district_name)?;
    validation::require("city_name", &body.city_name)?;
    if body.centres.is_empty() {
        return Err(AppError::Validation("centres must not be empty".into()));
    }
    for centre in &body.centres {
        validation::require("centre name", &centre.name)?;
    }
    let (created, tree) = centres::add_for_state(
        &state.pool,
        &body.state_name,
        &body.district_name,
        &body.city_name,
        body.centres,
    )
    .await?;
    Ok(success_one(CentresAdded {
        created: created.as_str(),
        state: tree,
    }))
}

#[derive(Deserialize)]
pub struct RemoveCentreBody {
    #[serde(default)]
    pub state_name: String,
    #[serde(default)]
    pub district_name: String,
    #[serde(default)]
    pub city_name: String,
    #[serde(default)]
    pub name: String,
}

pub async fn remove(
    State(state): State<AppState>,
    Json(body): Json<RemoveCentreBody>,
) -> Result<impl IntoResponse, AppError> {
    validation::require("state_name", &body.state_name)?;
    validation::require("district_name", &body.district_name)?;
    validation::require("city_name", &body.city_name)?;
    validation::require("name", &body.name)?;
    let tree = centres::remove_for_state(
        &state.pool,
        &body.state_name,
        &body.district_name,
        &body.city_name,
        &body.name,
    )
    .await?;
    Ok(success_one_ok(tree))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let states = centres::list_states(&state.pool).await?;
    Ok(success_many(states))
}
