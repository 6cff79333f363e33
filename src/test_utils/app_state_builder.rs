//! Builder for constructing a complete AppState on top of seeded in-memory
//! stores, for route and middleware tests.

use std::sync::Arc;

use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::{
        http::app_state::AppState,
        persistence::{payment::InMemoryPaymentRepo, subscription::InMemorySubscriptionRepo},
    },
    domain::entities::{payment::PaymentRecord, subscription::SubscriptionRecord},
    infra::{
        config::AppConfig,
        rate_limit::{FixedWindowRateLimiter, RateLimiterTrait},
    },
    use_cases::{
        payment::{PaymentRepoTrait, PaymentUseCases},
        subscription::{SubscriptionRepoTrait, SubscriptionUseCases},
    },
};

pub const TEST_MERCHANT_ID: &str = "M_TEST";
pub const TEST_SALT_KEY: &str = "test-salt-key";
pub const TEST_SALT_INDEX: &str = "1";
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

/// AppConfig with fixed test values, no environment involved.
pub fn test_config() -> AppConfig {
    AppConfig {
        merchant_id: TEST_MERCHANT_ID.to_string(),
        salt_key: SecretString::new(TEST_SALT_KEY.to_string().into()),
        salt_index: TEST_SALT_INDEX.to_string(),
        gateway_base_url: Url::parse("https://gateway.test/hermes").unwrap(),
        app_origin: Url::parse("https://app.test").unwrap(),
        admin_api_token: SecretString::new(TEST_ADMIN_TOKEN.to_string().into()),
        cors_origin: "http://localhost:3000".parse().unwrap(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        environment: "test".to_string(),
        trust_proxy: false,
        rate_limit_window_secs: 60,
        rate_limit_per_ip: 1_000_000,
        rate_limit_create: 1_000_000,
        rate_limit_admin: 1_000_000,
    }
}

#[derive(Default)]
pub struct TestAppStateBuilder {
    payments: Vec<PaymentRecord>,
    subscriptions: Vec<SubscriptionRecord>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payment(mut self, record: PaymentRecord) -> Self {
        self.payments.push(record);
        self
    }

    pub fn with_subscription(mut self, record: SubscriptionRecord) -> Self {
        self.subscriptions.push(record);
        self
    }

    pub fn build(self) -> AppState {
        let config = Arc::new(test_config());

        let payments =
            Arc::new(InMemoryPaymentRepo::with_records(self.payments)) as Arc<dyn PaymentRepoTrait>;
        let subscriptions = Arc::new(InMemorySubscriptionRepo::with_records(self.subscriptions))
            as Arc<dyn SubscriptionRepoTrait>;

        // Caps high enough to stay out of the way of functional tests.
        let rate_limiter: Arc<dyn RateLimiterTrait> = Arc::new(FixedWindowRateLimiter::new(
            config.rate_limit_window_secs,
            config.rate_limit_per_ip,
            config.rate_limit_create,
            config.rate_limit_admin,
        ));

        let payment_use_cases =
            PaymentUseCases::new(payments, subscriptions.clone(), config.clone());
        let subscription_use_cases = SubscriptionUseCases::new(subscriptions);

        AppState {
            config,
            payment_use_cases: Arc::new(payment_use_cases),
            subscription_use_cases: Arc::new(subscription_use_cases),
            rate_limiter,
        }
    }
}
