use std::sync::Arc;

use crate::{
    application::use_cases::{payment::PaymentUseCases, subscription::SubscriptionUseCases},
    infra::config::AppConfig,
    infra::rate_limit::RateLimiterTrait,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub payment_use_cases: Arc<PaymentUseCases>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
