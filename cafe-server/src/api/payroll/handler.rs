//! Payroll Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Payroll, PayrollGenerate};

use crate::core::ServerState;
use crate::db::repository::payroll as payroll_repo;
use crate::payroll::{self, PayrollRun};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok, time};

/// POST /api/payroll/generate
pub async fn generate(
    State(state): State<ServerState>,
    Json(req): Json<PayrollGenerate>,
) -> AppResult<Json<ApiResponse<PayrollRun>>> {
    let run = payroll::generate(&state, req.period.trim()).await?;
    Ok(ok(run))
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// `YYYY-MM`, current month when absent
    pub period: Option<String>,
}

/// GET /api/payroll?period=YYYY-MM
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<ApiResponse<Vec<Payroll>>>> {
    let period = match query.period {
        Some(p) => {
            time::parse_month(&p)?;
            p
        }
        None => time::today(state.config.timezone).format("%Y-%m").to_string(),
    };
    let rows = payroll_repo::find_by_period(&state.pool, &period).await?;
    Ok(ok(rows))
}

/// GET /api/payroll/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Payroll>>> {
    let row = payroll_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PayrollNotFound).with_detail("payroll_id", id))?;
    Ok(ok(row))
}

/// POST /api/payroll/{id}/pay
pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Payroll>>> {
    let row = payroll::pay(&state, id).await?;
    Ok(ok(row))
}
