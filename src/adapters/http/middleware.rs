use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    infra::{checksum::constant_time_compare, rate_limit::RateScope},
};

pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Only trust forwarded headers if explicitly configured (when behind a reverse proxy)
    let ip = if app_state.config.trust_proxy {
        forwarded_ip(&request).unwrap_or_else(|| addr.ip().to_string())
    } else {
        addr.ip().to_string()
    };

    app_state
        .rate_limiter
        .check(RateScope::Global, &ip)
        .await?;

    // Tighter caps on the endpoints that create orders or touch admin state.
    let path = request.uri().path();
    if path.starts_with("/api/payment/create") {
        app_state
            .rate_limiter
            .check(RateScope::OrderCreate, &ip)
            .await?;
    } else if path.starts_with("/api/admin") {
        app_state.rate_limiter.check(RateScope::Admin, &ip).await?;
    }

    Ok(next.run(request).await)
}

fn forwarded_ip(req: &Request) -> Option<String> {
    // Extract IP from X-Forwarded-For or X-Real-IP headers
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(real) = req.headers().get("x-real-ip")
        && let Ok(val) = real.to_str()
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }
    None
}

/// Bearer-token gate for admin routes. Per-operator identity and ACLs are the
/// deployment's concern; this enforces the shared-token precondition.
pub fn require_admin(app_state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if !constant_time_compare(token, app_state.config.admin_api_token.expose_secret()) {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    use crate::test_utils::{TEST_ADMIN_TOKEN, TestAppStateBuilder};

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn require_admin_accepts_the_configured_token() {
        let app_state = TestAppStateBuilder::new().build();
        let headers = headers_with_auth(&format!("Bearer {TEST_ADMIN_TOKEN}"));
        assert!(require_admin(&app_state, &headers).is_ok());
    }

    #[test]
    fn require_admin_rejects_missing_header() {
        let app_state = TestAppStateBuilder::new().build();
        let err = require_admin(&app_state, &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn require_admin_rejects_wrong_token() {
        let app_state = TestAppStateBuilder::new().build();
        let headers = headers_with_auth("Bearer not-the-token");
        let err = require_admin(&app_state, &headers).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn require_admin_rejects_non_bearer_scheme() {
        let app_state = TestAppStateBuilder::new().build();
        let headers = headers_with_auth(&format!("Basic {TEST_ADMIN_TOKEN}"));
        let err = require_admin(&app_state, &headers).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
