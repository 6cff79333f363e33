use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    /// Merchant id assigned by the payment gateway.
    pub merchant_id: String,
    /// Shared salt key used to sign and verify gateway payloads.
    pub salt_key: SecretString,
    /// Salt index the gateway expects alongside each checksum.
    pub salt_index: String,
    pub gateway_base_url: Url,
    /// Public origin of this deployment. Redirect and callback URLs embedded in
    /// order payloads are built from it.
    pub app_origin: Url,
    /// Bearer token required on every /api/admin route.
    pub admin_api_token: SecretString,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub environment: String,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy (Caddy, nginx).
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    pub rate_limit_create: u64,
    pub rate_limit_admin: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let merchant_id: String = get_env("MERCHANT_ID");
        let salt_key: SecretString = SecretString::new(get_env::<String>("SALT_KEY").into());
        let salt_index: String = get_env_default("SALT_INDEX", "1".to_string());
        let gateway_base_url: Url = get_env_default(
            "GATEWAY_BASE_URL",
            "https://api.phonepe.com/apis/hermes".parse().unwrap(),
        );
        let app_origin: Url = get_env("APP_ORIGIN");
        let admin_api_token: SecretString =
            SecretString::new(get_env::<String>("ADMIN_API_TOKEN").into());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let environment: String = get_env_default("APP_ENV", "development".to_string());
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 100);
        let rate_limit_create: u64 = get_env_default("RATE_LIMIT_CREATE", 10);
        let rate_limit_admin: u64 = get_env_default("RATE_LIMIT_ADMIN", 20);

        Self {
            merchant_id,
            salt_key,
            salt_index,
            gateway_base_url,
            app_origin,
            admin_api_token,
            cors_origin,
            bind_addr,
            environment,
            trust_proxy,
            rate_limit_window_secs,
            rate_limit_per_ip,
            rate_limit_create,
            rate_limit_admin,
        }
    }
}
