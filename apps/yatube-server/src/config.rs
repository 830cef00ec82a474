//! Application configuration loaded from environment variables.

use std::env;

use uuid::Uuid;

use yatube_infra::auth::JwtConfig;
use yatube_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config.sqlx_logging = parse_var("DB_LOG_STATEMENTS").unwrap_or(false);
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            jwt: jwt_config(
                env::var("JWT_SECRET").ok(),
                parse_var("JWT_EXPIRATION_HOURS"),
                env::var("JWT_ISSUER").ok(),
            ),
        }
    }
}

/// Without `JWT_SECRET` tokens are signed with a random per-process secret,
/// so no externally issued token validates.
fn jwt_config(
    secret: Option<String>,
    expiration_hours: Option<i64>,
    issuer: Option<String>,
) -> JwtConfig {
    let secret = secret.filter(|s| !s.is_empty()).unwrap_or_else(|| {
        tracing::warn!("JWT_SECRET not set; using a random secret for this process");
        Uuid::new_v4().simple().to_string()
    });

    let mut config = JwtConfig::new(secret);
    if let Some(hours) = expiration_hours {
        config.expiration_hours = hours;
    }
    if let Some(issuer) = issuer {
        config.issuer = issuer;
    }
    config
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
