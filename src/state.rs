//! Shared application state for all routes.

use crate::mailer::Mailer;
use crate::storage::ObjectStorage;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub storage: ObjectStorage,
    pub mailer: Arc<dyn Mailer>,
}
