use std::sync::Arc;

use staff_registry::{
    AppState, Config, build_app, db, index_analysis,
    photo::{DiskPhotoStore, UPLOADS_PREFIX},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("staff_registry=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let db = db::connect(&config.database_url, config.db_max_connections).await?;
    db::migrate(&db).await?;
    index_analysis::audit_indexes(&db).await;

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let photos = Arc::new(DiskPhotoStore::new(&config.upload_dir));
    let app = build_app(AppState::new(db, photos), &config.upload_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        addr = %config.bind_addr(),
        docs = "/docs",
        uploads = UPLOADS_PREFIX,
        "staff registry listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
