//! Admin subscription management. Every route requires the admin bearer token.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, middleware::require_admin},
    app_error::AppResult,
    domain::entities::subscription::{BillingCycle, SubscriptionRecord},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivateRequest {
    plan_name: Option<String>,
    billing_cycle: Option<BillingCycle>,
}

#[derive(Serialize)]
struct ActivateResponse {
    success: bool,
    subscription: SubscriptionRecord,
}

#[derive(Serialize)]
struct SubscriptionListResponse {
    subscriptions: Vec<SubscriptionRecord>,
    count: usize,
}

/// POST /api/admin/subscriptions/{user_id}/activate
/// Activates regardless of payment history; replaces any existing record.
async fn activate_subscription(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ActivateRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&app_state, &headers)?;

    let subscription = app_state
        .subscription_use_cases
        .admin_activate(&user_id, body.plan_name, body.billing_cycle)
        .await?;

    Ok(Json(ActivateResponse {
        success: true,
        subscription,
    }))
}

/// GET /api/admin/subscriptions
async fn list_subscriptions(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    require_admin(&app_state, &headers)?;

    let subscriptions = app_state.subscription_use_cases.list_all().await?;
    let count = subscriptions.len();

    Ok(Json(SubscriptionListResponse {
        subscriptions,
        count,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get(list_subscriptions))
        .route("/subscriptions/{user_id}/activate", post(activate_subscription))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
    use axum_test::TestServer;
    use serde_json::json;

    use super::*;
    use crate::test_utils::{TEST_ADMIN_TOKEN, TestAppStateBuilder, create_test_subscription};

    fn test_server(app_state: AppState) -> TestServer {
        TestServer::new(router().with_state(app_state)).unwrap()
    }

    fn bearer() -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {TEST_ADMIN_TOKEN}")).unwrap()
    }

    // =========================================================================
    // POST /subscriptions/{user_id}/activate
    // =========================================================================

    #[tokio::test]
    async fn activate_without_token_returns_401() {
        let server = test_server(TestAppStateBuilder::new().build());

        let response = server
            .post("/subscriptions/u1/activate")
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn activate_with_wrong_token_returns_401() {
        let server = test_server(TestAppStateBuilder::new().build());

        let response = server
            .post("/subscriptions/u1/activate")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer wrong"))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn activate_defaults_plan_and_cycle() {
        let server = test_server(TestAppStateBuilder::new().build());

        let response = server
            .post("/subscriptions/u1/activate")
            .add_header(AUTHORIZATION, bearer())
            .json(&json!({}))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["subscription"]["userId"], "u1");
        assert_eq!(body["subscription"]["planName"], "premium");
        assert_eq!(body["subscription"]["billingCycle"], "monthly");
        assert_eq!(body["subscription"]["status"], "active");
        assert_eq!(body["subscription"]["activatedBy"], "admin");
    }

    #[tokio::test]
    async fn activate_overrides_existing_subscription() {
        let existing = create_test_subscription(|s| {
            s.user_id = "u1".to_string();
            s.plan_name = "basic".to_string();
        });
        let server = test_server(
            TestAppStateBuilder::new()
                .with_subscription(existing)
                .build(),
        );

        let response = server
            .post("/subscriptions/u1/activate")
            .add_header(AUTHORIZATION, bearer())
            .json(&json!({ "planName": "premium", "billingCycle": "annual" }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["subscription"]["planName"], "premium");
        assert_eq!(body["subscription"]["billingCycle"], "annual");
    }

    // =========================================================================
    // GET /subscriptions
    // =========================================================================

    #[tokio::test]
    async fn list_without_token_returns_401() {
        let server = test_server(TestAppStateBuilder::new().build());

        let response = server.get("/subscriptions").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_returns_all_records_with_count() {
        let server = test_server(
            TestAppStateBuilder::new()
                .with_subscription(create_test_subscription(|s| s.user_id = "u1".to_string()))
                .with_subscription(create_test_subscription(|s| s.user_id = "u2".to_string()))
                .build(),
        );

        let response = server
            .get("/subscriptions")
            .add_header(AUTHORIZATION, bearer())
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["subscriptions"].as_array().unwrap().len(), 2);
    }
}
