use std::sync::Arc;

use dashmap::DashMap;
use shared::message::SyncPayload;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::{Config, ServerError};
use crate::db::DbService;
use crate::events::EventBus;
use crate::services::ProofStorage;

/// Per-resource version counters
///
/// Every [`ServerState::broadcast_sync`] bumps the counter of its resource so
/// clients can detect missed notifications.
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment the version of `resource` and return the new value (first call returns 1)
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version of `resource` (0 if never published)
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// Server state - cheap to clone, shared by every handler
///
/// | Field | Description |
/// |-------|-------------|
/// | config | immutable configuration |
/// | pool | SQLite connection pool |
/// | jwt_service | token signing / validation |
/// | events | in-process change feed |
/// | resource_versions | version counters for the change feed |
/// | proofs | payment proof image storage |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub events: EventBus,
    pub resource_versions: Arc<ResourceVersions>,
    pub proofs: ProofStorage,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool, jwt_service: Arc<JwtService>) -> Self {
        let proofs = ProofStorage::new(config.proofs_dir(), config.max_upload_bytes);
        Self {
            config,
            pool,
            jwt_service,
            events: EventBus::new(),
            resource_versions: Arc::new(ResourceVersions::new()),
            proofs,
        }
    }

    /// Initialize server state
    ///
    /// 1. Work directory (uploads)
    /// 2. Database pool + migrations
    /// 3. Bootstrap owner account (when configured and no owner exists)
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        std::fs::create_dir_all(config.proofs_dir())?;

        let db = DbService::new(&config.database_url)
            .await
            .map_err(|e| ServerError::Database(e.message))?;

        crate::db::bootstrap_owner(
            &db.pool,
            &config.bootstrap_owner_username,
            config.bootstrap_owner_password.as_deref(),
        )
        .await
        .map_err(|e| ServerError::Database(e.to_string()))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Ok(Self::new(config.clone(), db.pool, jwt_service))
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Publish a change notification on the event feed
    ///
    /// Nobody listening is not an error.
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        self.events.publish(payload);
    }
}
