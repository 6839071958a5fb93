//! Stats Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Days, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::stats::{self, DailySales, MethodBreakdown, TopItem};
use crate::utils::{ApiResponse, AppError, AppResult, ok, time};

/// Window used when `from` is omitted
const DEFAULT_RANGE_DAYS: u64 = 29;
/// Longest window a single query may span
const MAX_RANGE_DAYS: i64 = 366;
const DEFAULT_TOP_LIMIT: i64 = 10;
const MAX_TOP_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
}

/// Resolve the query into `[start, end)` Unix millis
fn resolve_range(query: &RangeQuery, tz: Tz) -> AppResult<(i64, i64)> {
    let to = match &query.to {
        Some(d) => time::parse_date(d)?,
        None => time::today(tz),
    };
    let from = match &query.from {
        Some(d) => time::parse_date(d)?,
        None => to.checked_sub_days(Days::new(DEFAULT_RANGE_DAYS)).unwrap_or(to),
    };
    check_span(from, to)?;
    Ok((time::day_start_millis(from, tz), time::day_end_millis(to, tz)))
}

fn check_span(from: NaiveDate, to: NaiveDate) -> AppResult<()> {
    if from > to {
        return Err(AppError::validation("from must not be after to"));
    }
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(AppError::validation(format!(
            "Date range may span at most {MAX_RANGE_DAYS} days"
        )));
    }
    Ok(())
}

/// Current UTC offset of the business timezone in seconds
fn utc_offset_secs(tz: Tz) -> i32 {
    tz.offset_from_utc_datetime(&Utc::now().naive_utc())
        .fix()
        .local_minus_utc()
}

/// GET /api/stats/sales
pub async fn sales(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<ApiResponse<Vec<DailySales>>>> {
    let tz = state.config.timezone;
    let (from, to) = resolve_range(&query, tz)?;
    let rows = stats::daily_sales(&state.pool, from, to, utc_offset_secs(tz)).await?;
    Ok(ok(rows))
}

/// GET /api/stats/top-items
pub async fn top_items(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<ApiResponse<Vec<TopItem>>>> {
    let (from, to) = resolve_range(&query, state.config.timezone)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TOP_LIMIT)
        .clamp(1, MAX_TOP_LIMIT);
    let rows = stats::top_items(&state.pool, from, to, limit).await?;
    Ok(ok(rows))
}

/// GET /api/stats/payment-methods
pub async fn payment_methods(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<ApiResponse<Vec<MethodBreakdown>>>> {
    let (from, to) = resolve_range(&query, state.config.timezone)?;
    let rows = stats::payment_methods(&state.pool, from, to).await?;
    Ok(ok(rows))
}
