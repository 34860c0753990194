//! Service entrypoint: load settings, prepare the database and storage
//! clients, then serve the router.

use institute_backend::{ensure_database, ensure_tables, mailer, routes, AppState, ObjectStorage, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("institute_backend=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;
    ensure_tables(&pool).await?;

    let storage = ObjectStorage::connect(&settings).await;
    let mailer = mailer::from_settings(&settings);
    let state = AppState {
        pool,
        storage,
        mailer,
    };

    let app = routes::app(state);
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
