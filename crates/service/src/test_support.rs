use std::sync::Arc;

use configs::DatabaseConfig;
use models::db::DbGateway;

/// Gateway connected to a private in-memory SQLite database with the
/// song migrations applied. One pooled connection keeps the data alive.
pub async fn connected_gateway() -> Result<Arc<DbGateway>, anyhow::Error> {
    let cfg = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let gateway = Arc::new(DbGateway::new());
    gateway.connect(&cfg).await?;
    Ok(gateway)
}
