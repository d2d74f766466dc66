//! Connection pool and schema setup.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::migrator::Migrator;

/// Opens a pooled connection. Every query checks a connection out of the
/// pool and returns it when done.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    tracing::info!(backend = ?db.get_database_backend(), max_connections, "database connected");
    Ok(db)
}

/// Applies all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await?;
    tracing::info!("migrations applied");
    Ok(())
}
