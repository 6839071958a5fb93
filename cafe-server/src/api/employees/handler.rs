//! Employee Handlers
//!
//! Employees are never removed: delete deactivates the account so attendance
//! and payroll history stay intact.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::message::{action, resource};
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate};

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::{RepoError, employee as employee_repo, shift_template as shift_repo};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_money, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

fn employee_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {id} not found"))
        .with_detail("employee_id", id)
}

fn map_repo_error(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::EmployeeUsernameExists, msg),
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::EmployeeNotFound, msg),
        other => other.into(),
    }
}

fn hash(password: &str) -> AppResult<String> {
    password::hash_password(password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

async fn ensure_shift_template(state: &ServerState, id: Option<i64>) -> AppResult<()> {
    if let Some(id) = id
        && shift_repo::find_by_id(&state.pool, id).await?.is_none()
    {
        return Err(AppError::new(ErrorCode::ShiftTemplateNotFound).with_detail("shift_template_id", id));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/employees
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EmployeeListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Employee>>>> {
    let employees = employee_repo::find_all(&state.pool, query.include_inactive).await?;
    Ok(ok(employees))
}

/// GET /api/employees/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let employee = employee_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| employee_not_found(id))?;
    Ok(ok(employee))
}

/// POST /api/employees
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    validate_required_text(&payload.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.full_name, "full_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_password(&payload.password)?;
    validate_money(payload.basic_salary, "basic_salary")?;
    validate_money(payload.overtime_rate, "overtime_rate")?;
    ensure_shift_template(&state, payload.shift_template_id).await?;

    let password_hash = hash(&payload.password)?;
    let employee = employee_repo::create(&state.pool, &payload, &password_hash)
        .await
        .map_err(map_repo_error)?;

    tracing::info!(employee_id = employee.id, username = %employee.username, role = employee.role.as_str(), "Employee created");
    state.broadcast_sync(resource::EMPLOYEE, action::CREATED, &employee.id.to_string(), Some(&employee));
    Ok(ok(employee))
}

/// PUT /api/employees/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    if id == user.id && payload.is_active == Some(false) {
        return Err(AppError::new(ErrorCode::EmployeeCannotDeleteSelf));
    }
    if let Some(name) = &payload.full_name {
        validate_required_text(name, "full_name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    if let Some(salary) = payload.basic_salary {
        validate_money(salary, "basic_salary")?;
    }
    if let Some(rate) = payload.overtime_rate {
        validate_money(rate, "overtime_rate")?;
    }
    ensure_shift_template(&state, payload.shift_template_id).await?;

    let password_hash = match &payload.password {
        Some(p) => {
            validate_password(p)?;
            Some(hash(p)?)
        }
        None => None,
    };

    let employee = employee_repo::update(&state.pool, id, &payload, password_hash.as_deref())
        .await
        .map_err(map_repo_error)?;

    tracing::info!(employee_id = id, by = %user.username, "Employee updated");
    state.broadcast_sync(resource::EMPLOYEE, action::UPDATED, &id.to_string(), Some(&employee));
    Ok(ok(employee))
}

/// DELETE /api/employees/{id} - deactivate
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<bool>>> {
    if id == user.id {
        return Err(AppError::new(ErrorCode::EmployeeCannotDeleteSelf));
    }
    if !employee_repo::deactivate(&state.pool, id).await? {
        return Err(employee_not_found(id));
    }

    tracing::info!(employee_id = id, by = %user.username, "Employee deactivated");
    state.broadcast_sync::<()>(resource::EMPLOYEE, action::DELETED, &id.to_string(), None);
    Ok(ok(true))
}
