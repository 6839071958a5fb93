use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | database, uploads and logs live here |
/// | HTTP_PORT | 3000 | HTTP port |
/// | DATABASE_URL | sqlite:<WORK_DIR>/cafe.db | SQLite database |
/// | ENVIRONMENT | development | development / staging / production |
/// | TIMEZONE | Asia/Jakarta | business timezone (IANA name) |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | MAX_UPLOAD_BYTES | 5242880 | payment proof size limit |
/// | CORS_ALLOWED_ORIGINS | (any) | comma separated origin list |
/// | BOOTSTRAP_OWNER_USERNAME | owner | first owner account |
/// | BOOTSTRAP_OWNER_PASSWORD | (unset) | created only when set |
///
/// JWT settings are read by [`JwtConfig`] (`JWT_SECRET`,
/// `JWT_EXPIRATION_MINUTES`, `JWT_ISSUER`, `JWT_AUDIENCE`).
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/cafe HTTP_PORT=8080 TIMEZONE=Asia/Makassar cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory (database, uploads)
    pub work_dir: String,
    pub http_port: u16,
    pub database_url: String,
    pub jwt: JwtConfig,
    /// development | staging | production
    pub environment: String,
    /// Business timezone used for work dates and daily reports
    pub timezone: Tz,
    pub request_timeout_ms: u64,
    pub max_upload_bytes: usize,
    /// Empty = allow any origin
    pub cors_allowed_origins: Vec<String>,
    pub bootstrap_owner_username: String,
    pub bootstrap_owner_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{}/cafe.db", work_dir.trim_end_matches('/')));

        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|tz| {
                tz.parse::<Tz>()
                    .map_err(|e| tracing::warn!("Invalid TIMEZONE '{}': {}, using Asia/Jakarta", tz, e))
                    .ok()
            })
            .unwrap_or(chrono_tz::Asia::Jakarta);

        Self {
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url,
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone,
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5 * 1024 * 1024),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            bootstrap_owner_username: std::env::var("BOOTSTRAP_OWNER_USERNAME")
                .unwrap_or_else(|_| "owner".into()),
            bootstrap_owner_password: std::env::var("BOOTSTRAP_OWNER_PASSWORD").ok(),
        }
    }

    /// Configuration for tests: in-memory database, uploads under `work_dir`
    pub fn for_tests(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_url = "sqlite::memory:".into();
        config.environment = "test".into();
        config.timezone = chrono_tz::Asia::Jakarta;
        config.bootstrap_owner_username = "owner".into();
        config.bootstrap_owner_password = Some("owner-password".into());
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn work_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
    }

    /// Directory holding uploaded payment proofs
    pub fn proofs_dir(&self) -> PathBuf {
        self.work_dir_path().join("uploads").join("proofs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
