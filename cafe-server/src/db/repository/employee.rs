//! Employee Repository

use super::{RepoError, RepoResult};
use shared::models::{Employee, EmployeeCreate, EmployeeRole, EmployeeUpdate};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, username, password_hash, full_name, role, phone, basic_salary, overtime_rate, shift_template_id, is_active, created_at, updated_at FROM employees";

pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Employee>> {
    let sql = if include_inactive {
        format!("{SELECT} ORDER BY full_name")
    } else {
        format!("{SELECT} WHERE is_active = 1 ORDER BY full_name")
    };
    let employees = sqlx::query_as::<_, Employee>(&sql).fetch_all(pool).await?;
    Ok(employees)
}

pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Employee>> {
    find_all(pool, false).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(employee)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(&format!("{SELECT} WHERE username = ? LIMIT 1"))
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(employee)
}

pub async fn count_active_owners(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE role = ? AND is_active = 1")
            .bind(EmployeeRole::Owner)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Insert an employee; `password_hash` is produced by the caller
pub async fn create(
    pool: &SqlitePool,
    data: &EmployeeCreate,
    password_hash: &str,
) -> RepoResult<Employee> {
    if find_by_username(pool, &data.username).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Username '{}' already exists",
            data.username
        )));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO employees (id, username, password_hash, full_name, role, phone, basic_salary, overtime_rate, shift_template_id, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)",
    )
    .bind(id)
    .bind(&data.username)
    .bind(password_hash)
    .bind(&data.full_name)
    .bind(data.role)
    .bind(&data.phone)
    .bind(data.basic_salary)
    .bind(data.overtime_rate)
    .bind(data.shift_template_id)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

/// Update an employee; `password_hash` replaces the stored hash when given
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &EmployeeUpdate,
    password_hash: Option<&str>,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE employees SET password_hash = COALESCE(?1, password_hash), full_name = COALESCE(?2, full_name), role = COALESCE(?3, role), phone = COALESCE(?4, phone), basic_salary = COALESCE(?5, basic_salary), overtime_rate = COALESCE(?6, overtime_rate), shift_template_id = COALESCE(?7, shift_template_id), is_active = COALESCE(?8, is_active), updated_at = ?9 WHERE id = ?10",
    )
    .bind(password_hash)
    .bind(&data.full_name)
    .bind(data.role)
    .bind(&data.phone)
    .bind(data.basic_salary)
    .bind(data.overtime_rate)
    .bind(data.shift_template_id)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

/// Soft delete: employees keep their attendance and payroll history
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE employees SET is_active = 0, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
