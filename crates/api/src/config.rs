use userhub_auth::TokenLifetimes;

/// Runtime configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// When absent the service runs against an in-memory store with a
    /// seeded development admin. Never leave this unset in production.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    /// Accounts returned per listing page.
    pub page_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("JWT_SECRET not set, falling back to an insecure development secret");
                "dev-secret".to_string()
            }
        };

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() {
            tracing::warn!("DATABASE_URL not set, using an in-memory store with a seeded dev admin");
        }

        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
            database_url,
            jwt_secret,
            access_ttl_minutes: env_parse("ACCESS_TOKEN_TTL_MINUTES", 30),
            refresh_ttl_days: env_parse("REFRESH_TOKEN_TTL_DAYS", 7),
            page_size: env_parse("DB_PAGE_SIZE", 1000),
        }
    }

    pub fn token_lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            access: chrono::Duration::minutes(self.access_ttl_minutes),
            refresh: chrono::Duration::days(self.refresh_ttl_days),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: None,
            jwt_secret: "dev-secret".to_string(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
            page_size: 1000,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|s| !s.is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}
