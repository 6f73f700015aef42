use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;

use super::providers::DbProviders;

/// Connects using the provider matching the URL scheme, then syncs the schema
/// from the entities under `db::entities`.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let provider = DbProviders::with_defaults()?.provider_for_url(&cfg.url)?;
    info!(provider = provider.id().as_str(), "connecting to database");

    let db = provider.connect(cfg).await?;
    provider.post_connect(&db, cfg).await?;

    info!("syncing database schema from entities");
    db.get_schema_registry("breeze::db::entities::*")
        .sync(&db)
        .await?;
    Ok(db)
}
