use crate::config::AppConfig;
use crate::users::{PgUserStore, UserStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared handles, built once at startup and cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;

        Ok(Self { db, config, users })
    }

    /// State backed by an in-memory store and a lazy pool that is never dialled.
    #[cfg(test)]
    pub fn fake(users: Arc<dyn UserStore>) -> Self {
        let config = Arc::new(AppConfig::fake());
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool ok");
        Self { db, config, users }
    }
}
