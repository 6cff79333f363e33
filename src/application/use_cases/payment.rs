//! Payment orders and gateway callback processing.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use rand::distributions::{Alphanumeric, DistString};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{DEFAULT_PLAN_NAME, SubscriptionRepoTrait},
    domain::entities::{
        payment::{PaymentRecord, PaymentStatus},
        subscription::{ActivationSource, BillingCycle, SubscriptionRecord},
    },
    infra::checksum::{VerifyHeader, sign_payload, verify_checksum},
    infra::config::AppConfig,
};

/// Payments settle in Indian rupees; amounts are stored in paise.
const CURRENCY: &str = "INR";

/// Random alphanumeric tail appended to the epoch-millis transaction id prefix.
const TXN_SUFFIX_LEN: usize = 8;

// ============================================================================
// Repository port
// ============================================================================

/// Outcome of an attempted settlement.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentTransition {
    /// The record was pending and has been settled with the given status.
    Applied(PaymentRecord),
    /// The record had already settled; nothing changed.
    AlreadySettled(PaymentRecord),
    /// No record exists under that merchant transaction id.
    Unknown,
}

#[async_trait]
pub trait PaymentRepoTrait: Send + Sync {
    /// Inserts a new record. Fails on a duplicate merchant transaction id.
    async fn insert(&self, record: PaymentRecord) -> AppResult<()>;

    async fn get(&self, merchant_transaction_id: &str) -> AppResult<Option<PaymentRecord>>;

    /// Looks up and settles in one atomic step so concurrent callback
    /// deliveries cannot interleave between read and write. Only pending
    /// records transition; settled ones are reported back untouched.
    async fn settle(
        &self,
        merchant_transaction_id: &str,
        status: PaymentStatus,
        gateway_transaction_id: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<PaymentTransition>;
}

// ============================================================================
// Inputs and outputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    /// Amount in major currency units (rupees).
    pub amount: Option<f64>,
    pub user_id: Option<String>,
    pub plan_name: Option<String>,
    pub billing_cycle: Option<BillingCycle>,
}

/// Success envelope for a created order. `redirect_url` points at the
/// gateway's hosted pay page; `payload`/`checksum` carry the signed order
/// descriptor for the gateway call, which an external collaborator performs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEnvelope {
    pub success: bool,
    pub merchant_transaction_id: String,
    pub redirect_url: String,
    pub payload: String,
    pub checksum: String,
    pub amount: i64,
    pub currency: String,
    pub plan_name: String,
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    pub response: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: &'static str,
}

impl WebhookAck {
    fn processed() -> Self {
        Self {
            success: true,
            message: "callback processed",
        }
    }
}

/// Order descriptor sent to the gateway, base64-encoded, per its contract.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderDescriptor<'a> {
    merchant_id: &'a str,
    merchant_transaction_id: &'a str,
    merchant_user_id: &'a str,
    amount: i64,
    redirect_url: String,
    redirect_mode: &'static str,
    callback_url: String,
    payment_instrument: PaymentInstrument,
}

#[derive(Serialize)]
struct PaymentInstrument {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Decoded gateway callback body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayCallback {
    #[serde(default)]
    merchant_id: Option<String>,
    merchant_transaction_id: String,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ============================================================================
// Use cases
// ============================================================================

pub struct PaymentUseCases {
    payments: Arc<dyn PaymentRepoTrait>,
    subscriptions: Arc<dyn SubscriptionRepoTrait>,
    config: Arc<AppConfig>,
}

impl PaymentUseCases {
    pub fn new(
        payments: Arc<dyn PaymentRepoTrait>,
        subscriptions: Arc<dyn SubscriptionRepoTrait>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            payments,
            subscriptions,
            config,
        }
    }

    /// Creates a pending payment order and returns the signed envelope the
    /// caller forwards to the gateway's hosted checkout.
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<OrderEnvelope> {
        let amount = input
            .amount
            .filter(|a| *a > 0.0)
            .ok_or_else(|| AppError::InvalidInput("amount must be a positive number".into()))?;
        let user_id = input
            .user_id
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::InvalidInput("userId is required".into()))?;
        let plan_name = input
            .plan_name
            .unwrap_or_else(|| DEFAULT_PLAN_NAME.to_string());
        let billing_cycle = input.billing_cycle.unwrap_or_default();

        // Major to minor units: multiply by 100 and truncate.
        let amount_minor = (amount * 100.0).trunc() as i64;
        let now = Utc::now();
        let merchant_transaction_id = new_merchant_transaction_id(now);

        let payload = self.encode_order_descriptor(&merchant_transaction_id, &user_id, amount_minor)?;
        let checksum = sign_payload(&payload, self.config.salt_key.expose_secret(), &self.config.salt_index);
        let redirect_url = self.pay_page_url(&merchant_transaction_id)?;

        let record = PaymentRecord {
            merchant_transaction_id: merchant_transaction_id.clone(),
            merchant_id: self.config.merchant_id.clone(),
            user_id,
            amount: amount_minor,
            currency: CURRENCY.to_string(),
            plan_name: plan_name.clone(),
            billing_cycle,
            status: PaymentStatus::Pending,
            gateway_transaction_id: None,
            created_at: now,
            updated_at: now,
        };
        self.payments.insert(record).await?;

        tracing::info!(
            merchant_transaction_id = %merchant_transaction_id,
            amount = amount_minor,
            plan_name = %plan_name,
            billing_cycle = billing_cycle.as_str(),
            "Created payment order"
        );

        Ok(OrderEnvelope {
            success: true,
            merchant_transaction_id,
            redirect_url,
            payload,
            checksum,
            amount: amount_minor,
            currency: CURRENCY.to_string(),
            plan_name,
            billing_cycle,
        })
    }

    /// Processes a gateway confirmation callback. Signature verification is
    /// mandatory; unsigned or badly signed callbacks are rejected before any
    /// state is touched. Unknown and already-settled transactions are
    /// acknowledged without changes, matching the gateway's retry contract.
    pub async fn process_webhook(
        &self,
        body: WebhookRequest,
        verify_header: Option<&str>,
    ) -> AppResult<WebhookAck> {
        let encoded = body
            .response
            .ok_or_else(|| AppError::InvalidInput("response field is required".into()))?;

        let decoded = general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|_| AppError::InvalidInput("response is not valid base64".into()))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| AppError::InvalidInput("response is not valid UTF-8".into()))?;
        let callback: GatewayCallback = serde_json::from_str(&decoded)
            .map_err(|_| AppError::InvalidInput("malformed callback payload".into()))?;

        self.verify_signature(&encoded, verify_header)?;

        let status =
            PaymentStatus::from_gateway_state(callback.state.as_deref().unwrap_or_default());
        let now = Utc::now();
        let merchant_transaction_id = callback.merchant_transaction_id.as_str();

        match self
            .payments
            .settle(
                merchant_transaction_id,
                status,
                callback.transaction_id.clone(),
                now,
            )
            .await?
        {
            PaymentTransition::Unknown => {
                tracing::info!(
                    merchant_transaction_id,
                    "Callback for unknown transaction, acknowledging"
                );
                Ok(WebhookAck::processed())
            }
            PaymentTransition::AlreadySettled(record) => {
                tracing::info!(
                    merchant_transaction_id,
                    status = record.status.as_str(),
                    "Callback replay for settled transaction, acknowledging"
                );
                Ok(WebhookAck::processed())
            }
            PaymentTransition::Applied(record) => {
                if let Some(amount) = callback.amount
                    && amount != record.amount
                {
                    tracing::warn!(
                        merchant_transaction_id,
                        stored = record.amount,
                        reported = amount,
                        "Callback amount differs from stored order amount"
                    );
                }
                if let Some(merchant_id) = callback.merchant_id.as_deref()
                    && merchant_id != self.config.merchant_id
                {
                    tracing::warn!(
                        merchant_transaction_id,
                        merchant_id,
                        "Callback carries a foreign merchant id"
                    );
                }

                tracing::info!(
                    merchant_transaction_id,
                    status = record.status.as_str(),
                    code = callback.code.as_deref().unwrap_or(""),
                    "Settled payment from gateway callback"
                );

                if record.status == PaymentStatus::Completed {
                    let subscription = SubscriptionRecord::activate(
                        record.user_id.clone(),
                        record.plan_name.clone(),
                        record.billing_cycle,
                        ActivationSource::Webhook,
                        now,
                    );
                    self.subscriptions.upsert(subscription).await?;
                }
                Ok(WebhookAck::processed())
            }
        }
    }

    pub async fn payment_status(&self, merchant_transaction_id: &str) -> AppResult<PaymentRecord> {
        self.payments
            .get(merchant_transaction_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    fn verify_signature(&self, encoded: &str, header: Option<&str>) -> AppResult<()> {
        let raw = header.ok_or(AppError::SignatureInvalid)?;
        let parsed = VerifyHeader::parse(raw).ok_or(AppError::SignatureInvalid)?;
        if parsed.salt_index != self.config.salt_index {
            tracing::warn!(
                salt_index = %parsed.salt_index,
                "Callback signed with unknown salt index"
            );
            return Err(AppError::SignatureInvalid);
        }
        if !verify_checksum(encoded, &parsed.checksum, self.config.salt_key.expose_secret()) {
            return Err(AppError::SignatureInvalid);
        }
        Ok(())
    }

    fn encode_order_descriptor(
        &self,
        merchant_transaction_id: &str,
        user_id: &str,
        amount_minor: i64,
    ) -> AppResult<String> {
        let mut redirect_url = self.config.app_origin.clone();
        redirect_url.set_path("/payment/success");
        redirect_url
            .query_pairs_mut()
            .append_pair("orderId", merchant_transaction_id);

        let mut callback_url = self.config.app_origin.clone();
        callback_url.set_path("/api/payment/webhook");

        let descriptor = OrderDescriptor {
            merchant_id: &self.config.merchant_id,
            merchant_transaction_id,
            merchant_user_id: user_id,
            amount: amount_minor,
            redirect_url: redirect_url.to_string(),
            redirect_mode: "REDIRECT",
            callback_url: callback_url.to_string(),
            payment_instrument: PaymentInstrument { kind: "PAY_PAGE" },
        };

        let bytes = serde_json::to_vec(&descriptor)
            .map_err(|e| AppError::Internal(format!("order payload encoding failed: {e}")))?;
        Ok(general_purpose::STANDARD.encode(bytes))
    }

    fn pay_page_url(&self, merchant_transaction_id: &str) -> AppResult<String> {
        let mut url = self.config.gateway_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("gateway base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["pay", "page"]);
        url.query_pairs_mut()
            .append_pair("merchantId", &self.config.merchant_id)
            .append_pair("transactionId", merchant_transaction_id);
        Ok(url.to_string())
    }
}

fn new_merchant_transaction_id(now: DateTime<Utc>) -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), TXN_SUFFIX_LEN);
    format!("MT{}{}", now.timestamp_millis(), suffix)
}
