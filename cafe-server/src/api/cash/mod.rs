//! Cash drawer reconciliation API (owner or cashier)

use axum::{Json, Router, extract::State, middleware, routing::post};

use crate::auth::permissions::CASH_RECONCILE;
use crate::auth::require_permission;
use crate::cash::{CashReconcileRequest, CashReconciliation, reconcile_day};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/cash/reconcile",
        post(reconcile).layer(middleware::from_fn(require_permission(CASH_RECONCILE))),
    )
}

/// POST /api/cash/reconcile
pub async fn reconcile(
    State(state): State<ServerState>,
    Json(req): Json<CashReconcileRequest>,
) -> AppResult<Json<ApiResponse<CashReconciliation>>> {
    let result = reconcile_day(&state.pool, state.config.timezone, &req).await?;
    Ok(ok(result))
}
