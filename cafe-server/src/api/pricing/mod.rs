//! Price suggestion API (owner)

use axum::{Json, Router, middleware, routing::post};

use crate::auth::permissions::PRICING_SUGGEST;
use crate::auth::require_permission;
use crate::core::ServerState;
use crate::pricing::{PriceSuggestion, PriceSuggestionRequest, suggest_price};
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/pricing/suggest",
        post(suggest).layer(middleware::from_fn(require_permission(PRICING_SUGGEST))),
    )
}

/// POST /api/pricing/suggest
pub async fn suggest(
    Json(req): Json<PriceSuggestionRequest>,
) -> AppResult<Json<ApiResponse<PriceSuggestion>>> {
    let suggestion = suggest_price(&req)?;
    tracing::debug!(
        category = suggestion.category.as_str(),
        suggested = suggestion.suggested_price,
        "Price suggested"
    );
    Ok(ok(suggestion))
}
