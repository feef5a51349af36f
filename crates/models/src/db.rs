//! Persistence gateway: owns the process-wide database connection.
//!
//! The gateway is constructed explicitly and shared through `Arc`; callers
//! obtain the connection with [`DbGateway::handle`], which yields `None`
//! until [`DbGateway::connect`] has succeeded and again after
//! [`DbGateway::disconnect`].

use std::{sync::Arc, time::Duration};

use arc_swap::ArcSwapOption;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::{info, instrument};

use crate::errors::ModelError;

#[derive(Default)]
pub struct DbGateway {
    conn: ArcSwapOption<DatabaseConnection>,
}

impl DbGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect, apply migrations (song table + unique name index) and
    /// publish the handle. Replaces any previously published handle.
    #[instrument(skip_all)]
    pub async fn connect(&self, cfg: &DatabaseConfig) -> Result<(), ModelError> {
        let mut opts = ConnectOptions::new(cfg.url.clone());
        opts.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
            .sqlx_logging(cfg.sqlx_logging);

        let db = Database::connect(opts)
            .await
            .map_err(|e| ModelError::Db(e.to_string()))?;
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| ModelError::Db(format!("migration failed: {e}")))?;

        info!(backend = ?db.get_database_backend(), "database connected");
        self.conn.store(Some(Arc::new(db)));
        Ok(())
    }

    pub fn handle(&self) -> Option<Arc<DatabaseConnection>> {
        self.conn.load_full()
    }

    pub fn is_connected(&self) -> bool {
        self.conn.load().is_some()
    }

    /// Close the pool. Calling this while disconnected is a no-op.
    pub async fn disconnect(&self) -> Result<(), ModelError> {
        let Some(db) = self.conn.swap(None) else {
            return Ok(());
        };
        let db = Arc::try_unwrap(db).unwrap_or_else(|shared| (*shared).clone());
        db.close().await.map_err(|e| ModelError::Db(e.to_string()))?;
        info!("database disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, EntityTrait};

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn handle_is_unavailable_until_connected() -> anyhow::Result<()> {
        let gw = DbGateway::new();
        assert!(gw.handle().is_none());
        assert!(!gw.is_connected());

        gw.connect(&memory_config()).await?;
        assert!(gw.is_connected());
        let db = gw.handle().expect("connected handle");
        let songs = crate::song::Entity::find().all(db.as_ref()).await?;
        assert!(songs.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn connect_creates_unique_name_index() -> anyhow::Result<()> {
        let gw = DbGateway::new();
        gw.connect(&memory_config()).await?;
        let db = gw.handle().expect("connected handle");
        let now = chrono::Utc::now().to_rfc3339();
        let insert = |id: &str| {
            format!(
                "INSERT INTO song (id, name, path, plays, created_at, updated_at) VALUES ('{id}', 'Waltz', '/a.mp3', 0, '{now}', '{now}')"
            )
        };
        db.execute_unprepared(&insert("a")).await?;
        assert!(db.execute_unprepared(&insert("b")).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() -> anyhow::Result<()> {
        let gw = DbGateway::new();
        gw.disconnect().await?;

        gw.connect(&memory_config()).await?;
        gw.disconnect().await?;
        assert!(gw.handle().is_none());
        gw.disconnect().await?;
        Ok(())
    }

    #[tokio::test]
    async fn connect_fails_for_unreachable_store() {
        let gw = DbGateway::new();
        let cfg = DatabaseConfig {
            url: "sqlite:///nonexistent-dir/for/songs.db".into(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 1,
            acquire_timeout_secs: 1,
            ..Default::default()
        };
        assert!(gw.connect(&cfg).await.is_err());
        assert!(!gw.is_connected());
    }
}
