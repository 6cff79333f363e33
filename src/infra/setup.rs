use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        http::app_state::AppState,
        persistence::{payment::InMemoryPaymentRepo, subscription::InMemorySubscriptionRepo},
    },
    infra::{
        config::AppConfig,
        rate_limit::{FixedWindowRateLimiter, RateLimiterTrait},
    },
    use_cases::{
        payment::{PaymentRepoTrait, PaymentUseCases},
        subscription::{SubscriptionRepoTrait, SubscriptionUseCases},
    },
};

pub fn init_app_state() -> AppState {
    let config = Arc::new(AppConfig::from_env());

    let payments = Arc::new(InMemoryPaymentRepo::new()) as Arc<dyn PaymentRepoTrait>;
    let subscriptions =
        Arc::new(InMemorySubscriptionRepo::new()) as Arc<dyn SubscriptionRepoTrait>;

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

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "payrelay=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
