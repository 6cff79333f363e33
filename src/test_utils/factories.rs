//! Test data factories for creating valid test fixtures.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::entities::{
        payment::{PaymentRecord, PaymentStatus},
        subscription::{ActivationSource, BillingCycle, SubscriptionRecord},
    },
    infra::checksum::sign_payload,
};

use super::{TEST_MERCHANT_ID, TEST_SALT_INDEX, TEST_SALT_KEY};

/// Create a pending test payment with sensible defaults.
pub fn create_test_payment(overrides: impl FnOnce(&mut PaymentRecord)) -> PaymentRecord {
    let now = Utc::now();
    let mut record = PaymentRecord {
        merchant_transaction_id: format!("MT{}", Uuid::new_v4().simple()),
        merchant_id: TEST_MERCHANT_ID.to_string(),
        user_id: "u1".to_string(),
        amount: 10_000,
        currency: "INR".to_string(),
        plan_name: "premium".to_string(),
        billing_cycle: BillingCycle::Monthly,
        status: PaymentStatus::Pending,
        gateway_transaction_id: None,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut record);
    record
}

/// Create an active webhook-activated test subscription.
pub fn create_test_subscription(
    overrides: impl FnOnce(&mut SubscriptionRecord),
) -> SubscriptionRecord {
    let mut record = SubscriptionRecord::activate(
        "u1",
        "premium",
        BillingCycle::Monthly,
        ActivationSource::Webhook,
        Utc::now(),
    );
    overrides(&mut record);
    record
}

/// Base64 gateway callback body for the given transaction, plus the matching
/// X-VERIFY value signed with the test salt key.
pub fn signed_gateway_callback(merchant_transaction_id: &str, state: &str) -> (String, String) {
    let body = serde_json::json!({
        "merchantId": TEST_MERCHANT_ID,
        "merchantTransactionId": merchant_transaction_id,
        "transactionId": "T_GATEWAY_1",
        "state": state,
        "code": if state == "COMPLETED" { "PAYMENT_SUCCESS" } else { "PAYMENT_ERROR" },
    });
    let encoded = general_purpose::STANDARD.encode(body.to_string());
    let header = sign_payload(&encoded, TEST_SALT_KEY, TEST_SALT_INDEX);
    (encoded, header)
}
