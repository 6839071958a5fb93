//! Database Module
//!
//! SQLite connection pool, migrations and the first-run owner account

pub mod repository;

use crate::auth::password;
use crate::utils::AppError;
use repository::{RepoError, RepoResult, employee};
use shared::models::{EmployeeCreate, EmployeeRole};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

/// Database service, owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database at `url` and apply migrations
    ///
    /// `sqlite::memory:` is routed to [`DbService::in_memory`].
    pub async fn new(url: &str) -> Result<Self, AppError> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .busy_timeout(std::time::Duration::from_secs(5))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database
    ///
    /// A single connection that never expires: every new connection to
    /// `:memory:` would be a fresh, empty database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

/// Create the first owner account
///
/// Does nothing when an owner already exists or no password is configured.
pub async fn bootstrap_owner(
    pool: &SqlitePool,
    username: &str,
    password: Option<&str>,
) -> RepoResult<()> {
    if employee::count_active_owners(pool).await? > 0 {
        return Ok(());
    }

    let Some(password) = password else {
        tracing::warn!(
            "No owner account exists and BOOTSTRAP_OWNER_PASSWORD is not set; nobody can log in"
        );
        return Ok(());
    };

    let hash = password::hash_password(password)
        .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

    let data = EmployeeCreate {
        username: username.to_string(),
        password: String::new(),
        full_name: "Owner".to_string(),
        role: EmployeeRole::Owner,
        phone: None,
        basic_salary: 0.0,
        overtime_rate: 0.0,
        shift_template_id: None,
    };
    let owner = employee::create(pool, &data, &hash).await?;
    tracing::info!(username = %owner.username, "Bootstrapped owner account");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_owner_once() {
        let db = DbService::in_memory().await.unwrap();
        bootstrap_owner(&db.pool, "owner", Some("secret-pass"))
            .await
            .unwrap();
        bootstrap_owner(&db.pool, "owner2", Some("secret-pass"))
            .await
            .unwrap();

        assert_eq!(employee::count_active_owners(&db.pool).await.unwrap(), 1);
        let owner = employee::find_by_username(&db.pool, "owner")
            .await
            .unwrap()
            .unwrap();
        assert!(password::verify_password("secret-pass", &owner.password_hash).unwrap());
        assert!(
            employee::find_by_username(&db.pool, "owner2")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_settings_row_seeded() {
        let db = DbService::in_memory().await.unwrap();
        let settings = repository::system_settings::get(&db.pool).await.unwrap();
        assert_eq!(settings.geofence_radius_m, 100.0);
        assert!(settings.overtime_requires_approval);
        assert!(settings.cafe_location().is_none());
    }
}
