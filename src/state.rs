use std::sync::Arc;

use anyhow::Context;
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;

use crate::{
    config::AppConfig,
    users::{MySqlUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects the pool and creates the users table if needed. Any failure
    /// here is fatal to startup.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = MySqlPoolOptions::new()
            .max_connections(config.database.pool_size)
            .connect_with(config.database.connect_options()?)
            .await
            .context("connect to database")?;

        let users = MySqlUserStore::new(db);
        users.ensure_schema().await.context("create users table")?;
        info!(pool_size = config.database.pool_size, "database ready");

        Ok(Self::from_parts(Arc::new(users), Arc::new(config)))
    }

    pub fn from_parts(users: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{DatabaseConfig, JwtConfig};
        use crate::users::memory::InMemoryUserStore;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database: DatabaseConfig {
                url: None,
                host: "localhost".into(),
                port: 3306,
                user: "test".into(),
                password: "test".into(),
                name: "test".into(),
                pool_size: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 120,
            },
            hash_cost: 1,
        });

        Self::from_parts(Arc::new(InMemoryUserStore::default()), config)
    }
}
