use anyhow::Context;
use sqlx::mysql::MySqlConnectOptions;

pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";
pub const DEFAULT_DB_PASSWORD: &str = "password";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    /// Argon2 time cost used when hashing new passwords.
    pub hash_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            host: string("DB_HOST", "localhost"),
            port: parse(&lookup, "DB_PORT", 3306)?,
            user: string("DB_USER", "root"),
            password: string("DB_PASSWORD", DEFAULT_DB_PASSWORD),
            name: string("DB_NAME", "auth_db"),
            pool_size: parse(&lookup, "DB_POOL_SIZE", 10)?,
        };
        let jwt = JwtConfig {
            secret: string("JWT_SECRET", DEFAULT_JWT_SECRET),
            issuer: string("JWT_ISSUER", "auth-backend"),
            audience: string("JWT_AUDIENCE", "auth-backend-users"),
            ttl_minutes: parse(&lookup, "JWT_TTL_MINUTES", 120)?,
        };
        if jwt.ttl_minutes < 1 {
            anyhow::bail!("JWT_TTL_MINUTES must be at least 1");
        }
        let hash_cost: u32 = parse(&lookup, "HASH_COST", 3)?;
        if hash_cost == 0 {
            anyhow::bail!("HASH_COST must be at least 1");
        }

        Ok(Self {
            host: string("APP_HOST", "0.0.0.0"),
            port: parse(&lookup, "APP_PORT", 5000)?,
            database,
            jwt,
            hash_cost,
        })
    }

    /// Names of settings still running on their shipped defaults that must not reach production.
    pub fn insecure_defaults(&self) -> Vec<&'static str> {
        let mut found = Vec::new();
        if self.jwt.secret == DEFAULT_JWT_SECRET {
            found.push("JWT_SECRET");
        }
        if self.database.url.is_none() && self.database.password == DEFAULT_DB_PASSWORD {
            found.push("DB_PASSWORD");
        }
        found
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<MySqlConnectOptions> {
        if let Some(url) = &self.url {
            return url
                .parse::<MySqlConnectOptions>()
                .context("parse DATABASE_URL");
        }
        Ok(MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
