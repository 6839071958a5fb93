//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::models::Employee;

use crate::auth::permissions::get_default_permissions;
use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::employee as employee_repo;
use crate::security_log;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Employee plus the permissions carried by their token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(flatten)]
    pub employee: Employee,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserInfo,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let username = req.username.trim().to_string();
    let employee = employee_repo::find_by_username(&state.pool, &username).await?;

    // Fixed delay before looking at the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let employee = match employee {
        Some(e) => {
            let password_valid = password::verify_password(&req.password, &e.password_hash)
                .map_err(|err| AppError::internal(format!("Password verification failed: {err}")))?;
            if !password_valid {
                security_log!("WARN", "login_failed", username = username.clone(), reason = "invalid_password");
                return Err(AppError::invalid_credentials());
            }
            if !e.is_active {
                security_log!("WARN", "login_failed", username = username.clone(), reason = "account_disabled");
                return Err(AppError::new(ErrorCode::AccountDisabled));
            }
            e
        }
        None => {
            security_log!("WARN", "login_failed", username = username.clone(), reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    let permissions = get_default_permissions(employee.role);
    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(employee.id, &employee.username, employee.role, &permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = employee.id,
        username = %employee.username,
        role = employee.role.as_str(),
        "User logged in"
    );

    Ok(ok(LoginResponse {
        token,
        expires_in: jwt_service.expires_in_seconds(),
        user: UserInfo {
            employee,
            permissions,
        },
    }))
}

/// GET /api/auth/me
///
/// Reads the employee fresh from the database; a token outliving a
/// deactivation is refused.
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let employee = employee_repo::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    if !employee.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(ok(UserInfo {
        employee,
        permissions: user.permissions,
    }))
}
