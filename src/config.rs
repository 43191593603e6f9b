use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout_secs: u64,
    pub run_migrations: bool,

    // Redis
    pub redis_url: String,

    // CORS
    pub cors_allowed_origins: String,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| {
            let normalized = v.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,
            database_acquire_timeout_secs: env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            run_migrations: env_flag("RUN_MIGRATIONS", true),

            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.database_max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be > 0");
        }
        if self.database_acquire_timeout_secs == 0 {
            anyhow::bail!("DATABASE_ACQUIRE_TIMEOUT_SECS must be > 0");
        }
        if self.redis_url.trim().is_empty() {
            tracing::warn!("REDIS_URL is empty; cache reads will always miss");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }
        if !self.is_development() && self.cors_allowed_origins.trim() == "*" {
            tracing::warn!("Permissive CORS in {} environment", self.environment);
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development" || self.environment == "test"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            database_url: "postgres://localhost/goal_vault".to_string(),
            database_max_connections: 5,
            database_acquire_timeout_secs: 5,
            run_migrations: true,
            redis_url: "redis://localhost:6379".to_string(),
            cors_allowed_origins: "*".to_string(),
        }
    }

    #[test]
    fn validate_rejects_empty_database_url() {
        let mut config = sample();
        config.database_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_pool_size() {
        let mut config = sample();
        config.database_max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_acquire_timeout() {
        let mut config = sample();
        config.database_acquire_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(sample().validate().is_ok());
        assert!(sample().is_development());
    }
}
