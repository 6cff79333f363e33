//! Subscription status for end users.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    domain::entities::subscription::{
        ActivationSource, BillingCycle, SubscriptionRecord, SubscriptionStatus,
    },
};

/// Users without a stored record are reported inactive rather than missing,
/// so the plan fields stay absent instead of null.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionStatusResponse {
    user_id: String,
    status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    billing_cycle: Option<BillingCycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activated_by: Option<ActivationSource>,
}

impl SubscriptionStatusResponse {
    fn from_record(record: SubscriptionRecord) -> Self {
        Self {
            user_id: record.user_id,
            status: record.status,
            plan_name: Some(record.plan_name),
            billing_cycle: Some(record.billing_cycle),
            activated_at: Some(record.activated_at),
            expires_at: Some(record.expires_at),
            activated_by: Some(record.activated_by),
        }
    }

    fn inactive(user_id: String) -> Self {
        Self {
            user_id,
            status: SubscriptionStatus::Inactive,
            plan_name: None,
            billing_cycle: None,
            activated_at: None,
            expires_at: None,
            activated_by: None,
        }
    }
}

/// GET /api/subscriptions/{user_id}
/// Always 200; unknown users read as inactive.
async fn subscription_status(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let response = match app_state.subscription_use_cases.status(&user_id).await? {
        Some(record) => SubscriptionStatusResponse::from_record(record),
        None => SubscriptionStatusResponse::inactive(user_id),
    };
    Ok(Json(response))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{user_id}", get(subscription_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    use crate::test_utils::{TestAppStateBuilder, create_test_subscription};

    fn test_server(app_state: AppState) -> TestServer {
        TestServer::new(router().with_state(app_state)).unwrap()
    }

    #[tokio::test]
    async fn unknown_user_reads_inactive_not_404() {
        let server = test_server(TestAppStateBuilder::new().build());

        let response = server.get("/ghost").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["userId"], "ghost");
        assert_eq!(body["status"], "inactive");
        assert!(body.get("planName").is_none());
        assert!(body.get("expiresAt").is_none());
    }

    #[tokio::test]
    async fn stored_record_is_returned_in_full() {
        let subscription = create_test_subscription(|s| {
            s.user_id = "u1".to_string();
            s.plan_name = "premium".to_string();
            s.billing_cycle = BillingCycle::Annual;
        });
        let server = test_server(
            TestAppStateBuilder::new()
                .with_subscription(subscription)
                .build(),
        );

        let response = server.get("/u1").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["userId"], "u1");
        assert_eq!(body["status"], "active");
        assert_eq!(body["planName"], "premium");
        assert_eq!(body["billingCycle"], "annual");
        assert_eq!(body["activatedBy"], "webhook");
        assert!(body["expiresAt"].is_string());
    }
}
