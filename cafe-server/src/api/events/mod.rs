//! Staff change feed
//!
//! `GET /api/events` streams [`SyncPayload`]s as Server-Sent Events named
//! `<resource>.<action>`. The owner sees everything. Other staff never see
//! payroll or employee changes, and only see attendance and overtime rows
//! that belong to them.

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use shared::message::{SyncPayload, resource};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::events::sse_response;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(stream))
}

const OWNER_ONLY_RESOURCES: &[&str] = &[resource::PAYROLL, resource::EMPLOYEE];

/// Rows carrying an `employee_id`, shown to their employee only
const PERSONAL_RESOURCES: &[&str] = &[resource::ATTENDANCE, resource::OVERTIME];

fn visible_to(user_id: i64, is_owner: bool, payload: &SyncPayload) -> bool {
    if is_owner {
        return true;
    }
    let kind = payload.resource.as_str();
    if OWNER_ONLY_RESOURCES.contains(&kind) {
        return false;
    }
    if PERSONAL_RESOURCES.contains(&kind) {
        return payload
            .data
            .as_ref()
            .and_then(|d| d.get("employee_id"))
            .and_then(|v| v.as_i64())
            == Some(user_id);
    }
    true
}

pub async fn stream(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(user_id = user.id, "Staff event stream opened");
    let (user_id, is_owner) = (user.id, user.is_owner());
    sse_response(state.events.subscribe(), move |p| visible_to(user_id, is_owner, p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(kind: &str, data: Option<serde_json::Value>) -> SyncPayload {
        SyncPayload {
            resource: kind.to_string(),
            version: 1,
            action: "created".to_string(),
            id: "9".to_string(),
            data,
        }
    }

    #[test]
    fn test_owner_sees_everything() {
        assert!(visible_to(1, true, &payload(resource::PAYROLL, None)));
        assert!(visible_to(1, true, &payload(resource::ATTENDANCE, Some(json!({ "employee_id": 5 })))));
    }

    #[test]
    fn test_staff_only_see_their_own_rows() {
        let own = payload(resource::ATTENDANCE, Some(json!({ "employee_id": 5, "clock_in_lat": -6.1 })));
        let other = payload(resource::OVERTIME, Some(json!({ "employee_id": 6 })));
        assert!(visible_to(5, false, &own));
        assert!(!visible_to(5, false, &other));
        assert!(!visible_to(5, false, &payload(resource::ATTENDANCE, None)));
        assert!(!visible_to(5, false, &payload(resource::EMPLOYEE, None)));
        assert!(visible_to(5, false, &payload(resource::ORDER, None)));
    }
}
