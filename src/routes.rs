//! Route table for the whole service, plus the health/readiness probes.

use crate::handlers::{
    banner, centres, chairman, contact, course, faq, hallticket, mission_vision, notices,
    question_paper,
};
use crate::state::AppState;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

// Uploads carry banner images and question paper PDFs.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    match sqlx::query("SELECT 1").fetch_optional(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyBody {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!("readiness probe lost the database: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyBody {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/hallticket/generate", post(hallticket::generate))
        .route("/hallticket/check-expiry", post(hallticket::check_expiry))
        .route(
            "/hallticket/download/:hall_ticket_number",
            get(hallticket::download),
        )
        .route("/hallticket/:hall_ticket_number", get(hallticket::fetch))
        .route(
            "/centres",
            get(centres::list).post(centres::add).delete(centres::remove),
        )
        .route("/contact", post(contact::submit))
        .route("/contact/entries", get(contact::entries))
        .route("/contact/export", get(contact::export))
        .route(
            "/faqs",
            post(faq::create).get(faq::list).delete(faq::remove_all),
        )
        .route(
            "/faqs/:id",
            get(faq::fetch).patch(faq::update).delete(faq::remove),
        )
        .route("/banners", post(banner::create).get(banner::list))
        .route("/banners/page/:page_name", get(banner::by_page))
        .route(
            "/banners/:id",
            patch(banner::update).delete(banner::remove),
        )
        .route("/courses", post(course::create).get(course::list))
        .route(
            "/courses/:id",
            patch(course::update).delete(course::remove),
        )
        .route(
            "/question-papers",
            post(question_paper::create).get(question_paper::list),
        )
        .route(
            "/question-papers/:id",
            patch(question_paper::update).delete(question_paper::remove),
        )
        .route(
            "/chairman-message",
            post(chairman::create).get(chairman::list),
        )
        .route(
            "/chairman-message/:id",
            patch(chairman::update).delete(chairman::remove),
        )
        .route(
            "/mission-vision",
            put(mission_vision::upsert).get(mission_vision::fetch),
        )
        .route(
            "/notifications",
            post(notices::create_notification).get(notices::list_notifications),
        )
        .route(
            "/notifications/:id",
            patch(notices::update_notification).delete(notices::remove_notification),
        )
        .route(
            "/scrolling-texts",
            post(notices::create_scrolling_text).get(notices::list_scrolling_texts),
        )
        .route(
            "/scrolling-texts/:id",
            patch(notices::update_scrolling_text).delete(notices::remove_scrolling_text),
        )
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
